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

//! Timing logs printed by the queriers, one JSON object per query run:
//!
//! ```text
//! {"component":"…","query":"./converg/converg-9.rq","try":"1","duration":"178ms","version":"1","product":"10","step":"15","time":"1718000000"}
//! ```

use super::{number, open, parse_lines};
use crate::configuration::Configuration;
use crate::error::{QuadbenchError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

lazy_static! {
    static ref TIME_LOG: Regex = Regex::new(concat!(
        r#"\{"component":"(?P<component>[^"]+)","query":"(?P<query>[^"]+)","#,
        r#""try":"(?P<try>[^"]+)","duration":"(?P<duration>[^"]+)","#,
        r#""version":"(?P<version>[^"]+)","product":"(?P<product>[^"]+)","#,
        r#""step":"(?P<step>[^"]+)","time":"(?P<time>[^"]+)"\}"#
    ))
    .unwrap();
}

/// One timed query run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeLogRecord {
    /// Number of versions imported by the database.
    #[serde(rename = "VERSION")]
    pub version:        u32,
    /// Products of the database configuration.
    #[serde(rename = "PRODUCT")]
    pub product:        u32,
    /// Step of the database configuration.
    #[serde(rename = "STEP")]
    pub step:           u32,
    /// The querier service that ran the query.
    #[serde(rename = "COMPONENT")]
    pub component:      String,
    /// Query duration in milliseconds.
    #[serde(rename = "DURATION (ms)")]
    pub duration_ms:    u64,
    /// Normalized query name, `query-N`.
    #[serde(rename = "QUERY")]
    pub query:          String,
    /// Repetition number, starting at 1.
    #[serde(rename = "TRY")]
    pub try_number:     u32,
    /// Unix time of the run, in seconds.
    #[serde(rename = "TIME")]
    pub time:           u64,
    /// The kind of store, derived from the component.
    #[serde(rename = "COMPONENT_NAME")]
    pub component_name: String,
    /// Whether the query aggregates, when a query catalog is known.
    #[serde(rename = "AGGREGATIVE")]
    pub aggregative:    Option<bool>,
}

impl TimeLogRecord {
    /// Parses a line. Lines without a timing object yield `None`.
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let caps = match TIME_LOG.captures(line) {
            Some(caps) => caps,
            None => return Ok(None),
        };
        let duration = &caps["duration"];
        let component = caps["component"].to_string();
        Ok(Some(TimeLogRecord {
            version: number("version", &caps["version"])?,
            product: number("product", &caps["product"])?,
            step: number("step", &caps["step"])?,
            component_name: component_name(&component),
            component,
            duration_ms: number("duration", &duration.replace("ms", ""))?,
            query: normalize_query(&caps["query"]),
            try_number: number("try", &caps["try"])?,
            time: number("time", &caps["time"])?,
            aggregative: None,
        }))
    }

    /// The database configuration the query ran against.
    pub fn configuration(&self) -> Configuration {
        Configuration::new(self.version, self.product, self.step)
    }
}

/// Reduces a query file path to `query-N`, N being the text between the last
/// dash and the following dot: `./converg/converg-9.rq` becomes `query-9`.
pub fn normalize_query(path: &str) -> String {
    let tail = path.rsplit('-').next().unwrap_or(path);
    let stem = tail.split('.').next().unwrap_or(tail);
    format!("query-{}", stem)
}

/// Derives the kind of store from a querier component name.
///
/// Jena components are all `jena`. Other components are named
/// `{workflow}-{a}-{b}-{kind…}-{version}-…`: the kind is every dash
/// separated part after the first three, up to the first numeric one.
pub fn component_name(component: &str) -> String {
    if component.starts_with("jena") {
        return "jena".to_string();
    }
    component
        .split('-')
        .skip(3)
        .take_while(|part| part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join("-")
}

/// Parses every timing line of `reader`.
pub fn parse_time_logs<R: BufRead>(reader: R) -> Result<Vec<TimeLogRecord>> {
    parse_lines(reader, TimeLogRecord::parse_line)
}

/// Parses every timing line of the file at `path`.
pub fn read_time_logs<P: AsRef<Path>>(path: P) -> Result<Vec<TimeLogRecord>> {
    parse_time_logs(open(path)?)
}

/// What is known about a benchmark query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryInfo {
    /// Whether the query aggregates its results.
    pub aggregative: bool,
}

/// Query metadata keyed by normalized query name, read from a JSON object
/// such as `{"query-1": {"aggregative": false}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct QueryCatalog {
    queries: HashMap<String, QueryInfo>,
}

impl QueryCatalog {
    /// Decodes a catalog.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| QuadbenchError::InvalidInput(format!("cannot decode query catalog: {}", e)))
    }

    /// Loads a catalog file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Whether `query` aggregates, if the catalog knows it.
    pub fn aggregative(&self, query: &str) -> Option<bool> {
        self.queries.get(query).map(|q| q.aggregative)
    }

    /// Tags records with the aggregative flag of their query.
    pub fn tag(&self, records: &mut [TimeLogRecord]) {
        for record in records {
            record.aggregative = self.aggregative(&record.query);
        }
    }
}
