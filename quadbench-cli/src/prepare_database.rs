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

//! Writes the parameters of a database import.

use crate::args::{get_config_arg, get_configuration, get_out_arg, get_parameter_files};
use anyhow::Result;
use clap::{App, AppSettings, ArgMatches};
use log::info;
use quadbench::prelude::*;

pub fn command(matches: &ArgMatches) -> Result<()> {
    let db = DatabaseConfiguration::new(get_configuration(matches)?);
    info!(
        "Preparing database {} ({} MiB)",
        db.db_key(),
        estimate_dataset_volume_size_mib(&db)
    );
    get_parameter_files(matches)?.write_database(&db)?;
    Ok(())
}

pub fn command_args() -> App<'static> {
    App::new("prepare-database")
        .about("Writes the configuration and the volume size request of a database")
        .setting(AppSettings::DisableVersionFlag)
        .arg(get_config_arg())
        .arg(get_out_arg())
}
