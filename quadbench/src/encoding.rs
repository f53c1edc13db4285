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

//! Text encodings shared with the orchestration layer.
//!
//! Workflow steps exchange parameters as JSON on stdout and as small text
//! files. The consumers were written against Python's default `json.dumps`
//! output and `str(float)`, so both are reproduced here byte for byte.

use crate::error::{QuadbenchError, Result};
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

/// A JSON formatter using `", "` between items and `": "` between keys and
/// values, on a single line.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Serializes `value` the way the orchestration layer expects to read it.
///
/// Only ASCII strings are expected; non-ASCII characters are written as is
/// instead of being escaped.
pub fn to_wire_json<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut buf = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| QuadbenchError::Internal(e.to_string()))
}

/// Renders a float like Python's `str(float)` for the magnitudes used in
/// volume sizes: integral values keep a trailing `.0`.
pub fn float_text(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Renders a volume size request in mebibytes, e.g. `1007.5Mi`.
pub fn mebibytes(value: f64) -> String {
    format!("{}Mi", float_text(value))
}
