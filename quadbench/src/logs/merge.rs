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

//! Gathering of the per-pod logs of a workflow into one file per theme.

use crate::error::{QuadbenchError, Result};
use glob::Pattern;
use log::{info, warn};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the merged file written in each theme directory.
pub const MERGED_LOGS: &str = "merged_logs.log";

/// The families of logs collected from a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Thematic {
    /// Query timings printed by the queriers.
    Querier,
    /// Storage measurements.
    Space,
}

impl Thematic {
    /// Every theme.
    pub const ALL: [Thematic; 2] = [Thematic::Querier, Thematic::Space];

    /// Directory holding the logs of this theme.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Thematic::Querier => "querier",
            Thematic::Space => "space",
        }
    }

    /// Whether a pod log belongs to this theme, judging by its name.
    pub fn matches(&self, name: &str) -> bool {
        name.contains(self.dir_name())
    }

    /// Every theme a pod log belongs to. A log may belong to several.
    pub fn of(name: &str) -> Vec<Thematic> {
        Thematic::ALL
            .iter()
            .copied()
            .filter(|t| t.matches(name))
            .collect()
    }
}

impl fmt::Display for Thematic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Sorted `.log` files under `root`, merged files excluded.
fn log_files(root: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/**/*.log",
        Pattern::escape(&root.display().to_string())
    );
    let mut files = vec![];
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        if path.file_name().map_or(false, |name| name == MERGED_LOGS) {
            continue;
        }
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Concatenates every log of `thematic` found under `dir/{thematic}` into
/// `dir/{thematic}/merged_logs.log`, each followed by a newline.
///
/// Files that are not valid UTF-8 are skipped with a warning. Returns the
/// merged file and the number of logs it holds.
pub fn merge_logs<P: AsRef<Path>>(dir: P, thematic: Thematic) -> Result<(PathBuf, usize)> {
    let root = dir.as_ref().join(thematic.dir_name());
    if !root.is_dir() {
        return Err(QuadbenchError::InvalidInput(format!(
            "no {} logs under {}",
            thematic,
            dir.as_ref().display()
        )));
    }

    let files = log_files(&root)?;
    let target = root.join(MERGED_LOGS);
    let mut merged = fs::File::create(&target)?;
    let mut count = 0;
    for file in files {
        let bytes = fs::read(&file)?;
        match String::from_utf8(bytes) {
            Ok(text) => {
                merged.write_all(text.as_bytes())?;
                merged.write_all(b"\n")?;
                count += 1;
            }
            Err(_) => warn!("Skipping {}: not valid UTF-8", file.display()),
        }
    }
    info!("Merged {} {} logs into {}", count, thematic, target.display());
    Ok((target, count))
}

/// Merges every theme present under `dir`.
pub fn merge_all_logs<P: AsRef<Path>>(dir: P) -> Result<Vec<(Thematic, PathBuf, usize)>> {
    let dir = dir.as_ref();
    let mut merged = vec![];
    for thematic in Thematic::ALL {
        if dir.join(thematic.dir_name()).is_dir() {
            let (path, count) = merge_logs(dir, thematic)?;
            merged.push((thematic, path, count));
        }
    }
    Ok(merged)
}

/// Files the pod logs found directly in `source` under
/// `workflow_dir/{thematic}/` of every theme they belong to, keeping their
/// names. Logs of no theme are left in place. Returns how many copies were
/// filed.
pub fn classify_logs<P: AsRef<Path>, Q: AsRef<Path>>(source: P, workflow_dir: Q) -> Result<usize> {
    let mut entries = fs::read_dir(source.as_ref())?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    let mut count = 0;
    for path in entries.into_iter().filter(|p| p.is_file()) {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        for thematic in Thematic::of(&name) {
            let dir = workflow_dir.as_ref().join(thematic.dir_name());
            fs::create_dir_all(&dir)?;
            fs::copy(&path, dir.join(&name))?;
            count += 1;
        }
    }
    Ok(count)
}
