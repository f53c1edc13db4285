// Copyright (c) 2020-present, UMD Database Group.
//
// This program is free software: you can use, redistribute, and/or modify
// it under the terms of the GNU Affero General Public License, version 3
// or later ("AGPL"), as published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

mod args;
mod dataset_volume;
mod expand;
mod merge_logs;
mod plan;
mod prepare_database;
mod prepare_dataset;
mod space_entry;

use anyhow::Result;
use clap::{crate_version, App, AppSettings};

pub fn main() -> Result<()> {
    // Command line arg parsing and configuration.
    let matches = App::new("Quadbench")
        .version(crate_version!())
        .about("Command line helpers of the Quadbench workflow steps")
        .author("UD-Evolution Team")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .args(args::get_logging_args())
        .subcommand(expand::command_args())
        .subcommand(prepare_dataset::command_args())
        .subcommand(dataset_volume::command_args())
        .subcommand(prepare_database::command_args())
        .subcommand(plan::command_args())
        .subcommand(space_entry::command_args())
        .subcommand(merge_logs::command_args())
        .get_matches();

    let (name, sub_matches) = match matches.subcommand() {
        Some(subcommand) => subcommand,
        None => unreachable!("a subcommand is required"),
    };
    args::get_logging(sub_matches)?.init();

    match name {
        "expand" => expand::command(sub_matches),
        "prepare-dataset" => prepare_dataset::command(sub_matches),
        "dataset-volume" => dataset_volume::command(sub_matches),
        "prepare-database" => prepare_database::command(sub_matches),
        "plan" => plan::command(sub_matches),
        "space-entry" => space_entry::command(sub_matches),
        "merge-logs" => merge_logs::command(sub_matches),
        _ => unreachable!("unknown subcommand {}", name),
    }
}
