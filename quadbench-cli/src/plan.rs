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

//! Prints the task graph of an experiment.

use crate::args::{get_list, get_parameter_args};
use anyhow::Result;
use clap::{App, AppSettings, Arg, ArgMatches};
use log::info;
use quadbench::prelude::*;

pub fn command(matches: &ArgMatches) -> Result<()> {
    let expansion = expand(
        &get_list(matches, "versions")?,
        &get_list(matches, "products")?,
        &get_list(matches, "steps")?,
    )?;
    let backends = match matches.values_of("backends") {
        Some(names) => names
            .map(|name| name.parse::<Backend>())
            .collect::<quadbench::error::Result<Vec<_>>>()?,
        None => Backend::DEFAULT.to_vec(),
    };

    let env = ExperimentEnv::from_env()?;
    let dag = ExperimentDag::build(&expansion, &backends, &env)?;
    info!("{} tasks in the experiment", dag.node_count());
    println!("{}", serde_json::to_string_pretty(&dag.summary()?)?);
    Ok(())
}

pub fn command_args() -> App<'static> {
    App::new("plan")
        .about("Prints the tasks of an experiment in topological order")
        .setting(AppSettings::DisableVersionFlag)
        .args(get_parameter_args())
        .arg(
            Arg::new("backends")
                .short('b')
                .long("backends")
                .value_name("BACKEND")
                .help("Stores to benchmark [default: blazegraph converg-condensed converg-flat]")
                .takes_value(true)
                .multiple_values(true)
                .possible_values(["blazegraph", "jena", "converg-condensed", "converg-flat"]),
        )
}
