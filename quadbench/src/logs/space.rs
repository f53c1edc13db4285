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

//! Storage logs: the size of a store after its import, one JSON object per
//! measurement. Every value is a string and the object has no whitespace:
//!
//! ```text
//! {"component":"blazegraph","space":"209715200","version":"1","product":"1","step":"0","time":"1718000000"}
//! ```

use super::{number, open, parse_lines};
use crate::configuration::Configuration;
use crate::error::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::io::BufRead;
use std::path::Path;

lazy_static! {
    static ref SPACE_LOG: Regex = Regex::new(concat!(
        r#"\{"component":"(?P<component>[^"]+)","space":"(?P<space>[^"]+)","#,
        r#""version":"(?P<version>[^"]+)","product":"(?P<product>[^"]+)","#,
        r#""step":"(?P<step>[^"]+)","time":"(?P<time>[^"]+)"\}"#
    ))
    .unwrap();
}

/// The printed form of a storage measurement.
#[derive(Serialize)]
struct SpaceLogLine<'a> {
    component: &'a str,
    space:     String,
    version:   String,
    product:   String,
    step:      String,
    time:      String,
}

/// One storage measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpaceLogRecord {
    /// The measured store, e.g. `blazegraph` or a postgres host name.
    pub component: String,
    /// Size in bytes.
    pub space:     u64,
    /// Number of versions imported.
    pub version:   u32,
    /// Products of the database configuration.
    pub product:   u32,
    /// Step of the database configuration.
    pub step:      u32,
    /// Unix time of the measurement, in seconds.
    pub time:      u64,
}

impl SpaceLogRecord {
    /// A measurement of `component` for a database configuration.
    pub fn new(component: &str, space: u64, config: &Configuration, time: u64) -> Self {
        SpaceLogRecord {
            component: component.to_string(),
            space,
            version: config.version(),
            product: config.product(),
            step: config.step(),
            time,
        }
    }

    /// Parses a line. Lines without a storage object yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let caps = match SPACE_LOG.captures(line) {
            Some(caps) => caps,
            None => return Ok(None),
        };
        Ok(Some(SpaceLogRecord {
            component: caps["component"].to_string(),
            space:     number("space", &caps["space"])?,
            version:   number("version", &caps["version"])?,
            product:   number("product", &caps["product"])?,
            step:      number("step", &caps["step"])?,
            time:      number("time", &caps["time"])?,
        }))
    }

    /// Renders the line printed by the storage probes.
    pub fn to_line(&self) -> Result<String> {
        let line = SpaceLogLine {
            component: &self.component,
            space:     self.space.to_string(),
            version:   self.version.to_string(),
            product:   self.product.to_string(),
            step:      self.step.to_string(),
            time:      self.time.to_string(),
        };
        Ok(serde_json::to_string(&line)?)
    }

    /// The database configuration that was measured.
    pub fn configuration(&self) -> Configuration {
        Configuration::new(self.version, self.product, self.step)
    }
}

/// Parses every storage line of `reader`.
pub fn parse_space_logs<R: BufRead>(reader: R) -> Result<Vec<SpaceLogRecord>> {
    parse_lines(reader, SpaceLogRecord::parse_line)
}

/// Parses every storage line of the file at `path`.
pub fn read_space_logs<P: AsRef<Path>>(path: P) -> Result<Vec<SpaceLogRecord>> {
    parse_space_logs(open(path)?)
}
