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

//! Expands the experiment parameters into dataset and database
//! configurations.

use crate::args::{get_list, get_parameter_args};
use anyhow::Result;
use clap::{App, AppSettings, Arg, ArgMatches};
use log::info;
use quadbench::prelude::*;
use std::io::{self, Write};

pub fn command(matches: &ArgMatches) -> Result<()> {
    let expansion = if matches.is_present("fixed") {
        fixed_configurations()
    } else {
        let order = if matches.is_present("sort-versions") {
            VersionOrder::Ascending
        } else {
            VersionOrder::AsGiven
        };
        expand_with(
            &get_list(matches, "versions")?,
            &get_list(matches, "products")?,
            &get_list(matches, "steps")?,
            order,
        )?
    };
    info!(
        "{} dataset configurations, {} database configurations",
        expansion.len(),
        expansion.databases().count()
    );
    let mut stdout = io::stdout();
    stdout.write_all(expansion.to_wire_json()?.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

pub fn command_args() -> App<'static> {
    App::new("expand")
        .about("Expands the parameters into dataset and database configurations")
        .setting(AppSettings::DisableVersionFlag)
        .args(
            get_parameter_args()
                .into_iter()
                .map(|arg| arg.required(false).required_unless_present("fixed")),
        )
        .arg(
            Arg::new("sort-versions")
                .long("sort-versions")
                .help("Lists the databases of a group by ascending version"),
        )
        .arg(
            Arg::new("fixed")
                .long("fixed")
                .help("Prints the fixed set of configurations instead")
                .conflicts_with_all(&["versions", "products", "steps"]),
        )
}
