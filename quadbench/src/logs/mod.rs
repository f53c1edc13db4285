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

//! Benchmark logs: parsing of the timing, storage and measure lines printed
//! by the benchmark containers, completeness filters over timing records and
//! merging of the per-task log files of a run.
//!
//! The line formats are fixed by the containers printing them and by the
//! plotting tools reading the merged files.

pub mod filter;
pub mod measure;
pub mod merge;
pub mod space;
pub mod time;

pub use filter::{apply_filters, Thresholds};
pub use measure::MeasureRecord;
pub use merge::{merge_all_logs, merge_logs, Thematic};
pub use space::SpaceLogRecord;
pub use time::{QueryCatalog, TimeLogRecord};

use crate::error::{QuadbenchError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parses every line of `reader` with `parse`, skipping lines it does not
/// recognize.
pub(crate) fn parse_lines<R, T, F>(reader: R, mut parse: F) -> Result<Vec<T>>
where
    R: BufRead,
    F: FnMut(&str) -> Result<Option<T>>,
{
    let mut records = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        match parse(&line) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(QuadbenchError::LogFormat(desc)) => {
                return Err(QuadbenchError::LogFormat(format!(
                    "line {}: {}",
                    number + 1,
                    desc
                )))
            }
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}

/// Opens a log file for line by line reading.
pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<BufReader<File>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        QuadbenchError::LogFormat(format!("cannot open {}: {}", path.display(), e))
    })?;
    Ok(BufReader::new(file))
}

/// Parses a decimal field of a log line.
pub(crate) fn number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        QuadbenchError::LogFormat(format!("{} is not a number: {:?}", field, value))
    })
}
