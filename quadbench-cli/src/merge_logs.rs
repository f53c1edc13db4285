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

//! Merges the collected logs of a workflow run.

use anyhow::{anyhow, bail, Result};
use clap::{App, AppSettings, Arg, ArgMatches};
use quadbench::prelude::*;

pub fn command(matches: &ArgMatches) -> Result<()> {
    let dir = matches
        .value_of("dir")
        .ok_or_else(|| anyhow!("missing --dir"))?;
    let merged = merge_all_logs(dir)?;
    if merged.is_empty() {
        bail!("no querier or space logs under {}", dir);
    }
    for (thematic, path, count) in merged {
        println!("{}: {} logs -> {}", thematic, count, path.display());
    }
    Ok(())
}

pub fn command_args() -> App<'static> {
    App::new("merge-logs")
        .about("Concatenates the querier and space logs of a workflow run")
        .setting(AppSettings::DisableVersionFlag)
        .arg(
            Arg::new("dir")
                .short('d')
                .long("dir")
                .value_name("DIR")
                .help("The workflow log directory, holding querier/ and space/")
                .takes_value(true)
                .required(true),
        )
}
