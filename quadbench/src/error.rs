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

//! Quadbench error types

use std::error;
use std::fmt::{Display, Formatter};
use std::io;
use std::result;

/// Result type for operations that could result in an [QuadbenchError]
pub type Result<T> = result::Result<T, QuadbenchError>;

/// Quadbench error
#[derive(Debug)]
pub enum QuadbenchError {
    /// Error returned when the experiment parameters are empty or out of
    /// range, or when a configuration cannot be decoded.
    InvalidInput(String),
    /// Error returned when a database configuration has no dataset
    /// configuration with the same product and step.
    InconsistentGrouping(String),
    /// Error returned when a log line or log file does not follow the
    /// expected format.
    LogFormat(String),
    /// Error returned when a built-in setting is missing or malformed.
    Config(String),
    /// Error returned when the experiment DAG cannot be composed.
    Dag(String),
    /// Error associated to I/O operations and associated traits.
    IoError(io::Error),
    /// Error returned when serde_json failed to serialize or deserialize data.
    SerdeJson(serde_json::Error),
    /// Error returned as a consequence of an error in Quadbench.
    /// This error should not happen in normal usage of Quadbench.
    Internal(String),
}

impl From<io::Error> for QuadbenchError {
    fn from(e: io::Error) -> Self {
        QuadbenchError::IoError(e)
    }
}

impl From<serde_json::Error> for QuadbenchError {
    fn from(e: serde_json::Error) -> Self {
        QuadbenchError::SerdeJson(e)
    }
}

impl From<regex::Error> for QuadbenchError {
    fn from(e: regex::Error) -> Self {
        QuadbenchError::Internal(e.to_string())
    }
}

impl From<glob::PatternError> for QuadbenchError {
    fn from(e: glob::PatternError) -> Self {
        QuadbenchError::InvalidInput(e.to_string())
    }
}

impl From<glob::GlobError> for QuadbenchError {
    fn from(e: glob::GlobError) -> Self {
        QuadbenchError::IoError(e.into())
    }
}

impl From<&str> for QuadbenchError {
    fn from(e: &str) -> Self {
        QuadbenchError::Internal(e.to_string())
    }
}

impl Display for QuadbenchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            QuadbenchError::InvalidInput(ref desc) => write!(f, "Invalid input: {}", desc),
            QuadbenchError::InconsistentGrouping(ref desc) => {
                write!(f, "Inconsistent grouping: {}", desc)
            }
            QuadbenchError::LogFormat(ref desc) => write!(f, "Log format error: {}", desc),
            QuadbenchError::Config(ref desc) => write!(f, "Configuration error: {}", desc),
            QuadbenchError::Dag(ref desc) => write!(f, "Error during DAG composition: {}", desc),
            QuadbenchError::IoError(ref desc) => write!(f, "IO error: {}", desc),
            QuadbenchError::SerdeJson(ref desc) => write!(f, "serde_json error: {:?}", desc),
            QuadbenchError::Internal(ref desc) => write!(
                f,
                "Internal error: {}. This was likely caused by a bug in Quadbench's \
                    code and we would welcome that you file an bug report in our issue tracker",
                desc
            ),
        }
    }
}

impl error::Error for QuadbenchError {}
