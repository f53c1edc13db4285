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

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches};
use quadbench::prelude::*;
use std::io::Write;

pub fn get_logging_args() -> Vec<Arg<'static>> {
    [
        Arg::new("log-level")
            .short('L')
            .long("log-level")
            .possible_values(["error", "warn", "info", "debug", "trace", "off"])
            .help("Log level [default: info]")
            .global(true)
            .takes_value(true),
        Arg::new("trace")
            .long("trace")
            .help("Log ultra-verbose (trace level) information")
            .global(true)
            .takes_value(false),
        Arg::new("silent")
            .long("silent")
            .help("Suppress all output")
            .global(true)
            .takes_value(false),
    ]
    .to_vec()
}

pub fn get_logging(matches: &ArgMatches) -> Result<env_logger::Builder> {
    let mut builder = env_logger::Builder::new();

    let level = if matches.is_present("trace") {
        log::LevelFilter::Trace
    } else if matches.is_present("silent") {
        log::LevelFilter::Off
    } else {
        match matches.value_of("log-level") {
            Some("error") => log::LevelFilter::Error,
            Some("warn") => log::LevelFilter::Warn,
            Some("debug") => log::LevelFilter::Debug,
            Some("trace") => log::LevelFilter::Trace,
            Some("off") => log::LevelFilter::Off,
            _ => log::LevelFilter::Info,
        }
    };
    builder.filter(None, level);

    if level == log::LevelFilter::Trace {
        builder.format_timestamp_secs();
    } else {
        builder.format(|f, record| {
            writeln!(
                f,
                "[{}] {}",
                record.level().to_string().to_lowercase(),
                record.args()
            )
        });
    }

    Ok(builder)
}

/// `--versions`, `--products` and `--steps`.
pub fn get_parameter_args() -> Vec<Arg<'static>> {
    [
        Arg::new("versions")
            .short('v')
            .long("versions")
            .value_name("N")
            .help("Numbers of versions imported by each database")
            .takes_value(true)
            .multiple_values(true)
            .required(true),
        Arg::new("products")
            .short('p')
            .long("products")
            .value_name("N")
            .help("Numbers of products of the generated datasets")
            .takes_value(true)
            .multiple_values(true)
            .required(true),
        Arg::new("steps")
            .short('s')
            .long("steps")
            .value_name("N")
            .help("Numbers of steps between two versions")
            .takes_value(true)
            .multiple_values(true)
            .required(true),
    ]
    .to_vec()
}

pub fn get_config_arg() -> Arg<'static> {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("JSON")
        .help("The configuration, as JSON or as a single-quoted literal")
        .takes_value(true)
        .required(true)
}

pub fn get_out_arg() -> Arg<'static> {
    Arg::new("out")
        .short('o')
        .long("out")
        .value_name("DIR")
        .help("Directory of the output parameter files [default: from settings]")
        .takes_value(true)
}

/// Reads a list of non negative integers. Values may be separated by spaces
/// or commas.
pub fn get_list(matches: &ArgMatches, name: &str) -> Result<Vec<u32>> {
    let values = matches
        .values_of(name)
        .ok_or_else(|| anyhow!("missing --{}", name))?;
    let mut list = vec![];
    for value in values {
        for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            list.push(
                item.parse::<u32>()
                    .with_context(|| format!("--{}: {} is not a non negative integer", name, item))?,
            );
        }
    }
    Ok(list)
}

pub fn get_configuration(matches: &ArgMatches) -> Result<Configuration> {
    let text = matches
        .value_of("config")
        .ok_or_else(|| anyhow!("missing --config"))?;
    Ok(Configuration::parse(text)?)
}

pub fn get_parameter_files(matches: &ArgMatches) -> Result<ParameterFiles> {
    Ok(match matches.value_of("out") {
        Some(dir) => ParameterFiles::new(dir),
        None => ParameterFiles::from_settings()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::App;

    fn app() -> App<'static> {
        App::new("test")
            .args(get_logging_args())
            .args(get_parameter_args())
            .arg(get_out_arg())
    }

    #[test]
    fn lists_accept_spaces_and_commas() -> Result<()> {
        let matches = app().try_get_matches_from(vec![
            "test",
            "--versions",
            "1,2",
            "5",
            "--products",
            "1",
            "--steps",
            "0",
            "10",
        ])?;
        assert_eq!(vec![1, 2, 5], get_list(&matches, "versions")?);
        assert_eq!(vec![1], get_list(&matches, "products")?);
        assert_eq!(vec![0, 10], get_list(&matches, "steps")?);
        Ok(())
    }

    #[test]
    fn negative_values_fail() -> Result<()> {
        let matches = app().try_get_matches_from(vec![
            "test",
            "--versions",
            "1,-2",
            "--products",
            "1",
            "--steps",
            "0",
        ])?;
        assert!(get_list(&matches, "versions").is_err());
        Ok(())
    }

    #[test]
    fn output_directory() -> Result<()> {
        let matches = app().try_get_matches_from(vec![
            "test",
            "--versions",
            "1",
            "--products",
            "1",
            "--steps",
            "0",
            "--out",
            "/tmp/params",
        ])?;
        let files = get_parameter_files(&matches)?;
        assert_eq!(std::path::Path::new("/tmp/params"), files.dir());
        Ok(())
    }
}
