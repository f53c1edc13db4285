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

//! Measure lines printed by the quads querier:
//! `[Measure] (PARAM): 1234 ns for query: QUERY;`

use super::{number, open, parse_lines};
use crate::error::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

lazy_static! {
    static ref MEASURE_LOG: Regex =
        Regex::new(r"\[Measure\]\s*\((.*?)\):\s*(\d+)\s*ns for query:\s*(.*);").unwrap();
}

/// One measured query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasureRecord {
    /// The measured parameter.
    #[serde(rename = "PARAM")]
    pub param:   String,
    /// Duration in nanoseconds.
    #[serde(rename = "TIME (ns)")]
    pub time_ns: u64,
    /// The query.
    #[serde(rename = "QUERY")]
    pub query:   String,
    /// How many times this parameter and query were seen so far, this
    /// record included.
    #[serde(rename = "COUNT")]
    pub count:   usize,
}

/// Parses every measure line of `reader`, numbering the repetitions of each
/// parameter and query pair.
pub fn parse_measure_logs<R: BufRead>(reader: R) -> Result<Vec<MeasureRecord>> {
    let mut seen: HashMap<(String, String), usize> = HashMap::new();
    parse_lines(reader, |line| {
        let caps = match MEASURE_LOG.captures(line) {
            Some(caps) => caps,
            None => return Ok(None),
        };
        let param = caps[1].to_string();
        let query = caps[3].to_string();
        let count = seen.entry((param.clone(), query.clone())).or_insert(0);
        *count += 1;
        Ok(Some(MeasureRecord {
            param,
            time_ns: number("time", &caps[2])?,
            query,
            count: *count,
        }))
    })
}

/// Parses every measure line of the file at `path`.
pub fn read_measure_logs<P: AsRef<Path>>(path: P) -> Result<Vec<MeasureRecord>> {
    parse_measure_logs(open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_repetitions() -> Result<()> {
        let text = concat!(
            "[Measure] (v1): 1200 ns for query: SELECT * WHERE { ?s ?p ?o };\n",
            "noise\n",
            "[Measure] (v1): 1100 ns for query: SELECT * WHERE { ?s ?p ?o };\n",
            "[Measure](v2):900 ns for query: ASK {};\n",
        );
        let records = parse_measure_logs(text.as_bytes())?;
        assert_eq!(3, records.len());
        assert_eq!("v1", records[0].param);
        assert_eq!(1200, records[0].time_ns);
        assert_eq!("SELECT * WHERE { ?s ?p ?o }", records[0].query);
        assert_eq!(1, records[0].count);
        assert_eq!(2, records[1].count);
        assert_eq!("v2", records[2].param);
        assert_eq!("ASK {}", records[2].query);
        assert_eq!(1, records[2].count);
        Ok(())
    }
}
