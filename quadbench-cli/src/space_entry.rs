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

//! Prints the storage measurement of a store.

use crate::args::{get_config_arg, get_configuration};
use anyhow::{anyhow, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches};
use quadbench::prelude::*;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn command(matches: &ArgMatches) -> Result<()> {
    let component = matches
        .value_of("component")
        .ok_or_else(|| anyhow!("missing --component"))?;
    let space = matches
        .value_of("space")
        .ok_or_else(|| anyhow!("missing --space"))?
        .trim()
        .parse::<u64>()
        .context("--space must be a number of bytes")?;
    let time = match matches.value_of("time") {
        Some(time) => time.parse::<u64>().context("--time must be a unix time")?,
        None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs(),
    };
    let config = get_configuration(matches)?;

    println!(
        "{}",
        SpaceLogRecord::new(component, space, &config, time).to_line()?
    );
    Ok(())
}

pub fn command_args() -> App<'static> {
    App::new("space-entry")
        .about("Prints the storage log line of a measured store")
        .setting(AppSettings::DisableVersionFlag)
        .arg(
            Arg::new("component")
                .long("component")
                .value_name("NAME")
                .help("The measured store")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("space")
                .long("space")
                .value_name("BYTES")
                .help("The measured size in bytes")
                .takes_value(true)
                .required(true),
        )
        .arg(get_config_arg())
        .arg(
            Arg::new("time")
                .long("time")
                .value_name("SECONDS")
                .help("Unix time of the measurement [default: now]")
                .takes_value(true),
        )
}
