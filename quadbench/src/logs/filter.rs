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

//! Completeness filters over timing records.
//!
//! A comparison is only meaningful when every store ran every query the
//! full number of times, on enough versions. Incomplete groups are dropped
//! as a whole.

use super::time::TimeLogRecord;
use crate::config::setting_as;
use crate::error::Result;
use log::info;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Thresholds of the completeness filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Minimum highest try of a (version, step, query) group.
    pub repeat:         u32,
    /// Minimum number of distinct versions of each store for a
    /// (step, query) pair.
    pub min_versions:   usize,
    /// Minimum number of distinct stores of a (step, query, version) group.
    pub min_components: usize,
}

impl Thresholds {
    /// Loads the thresholds from the `[filter]` settings.
    pub fn from_settings() -> Result<Self> {
        Ok(Thresholds {
            repeat:         setting_as("filter", "min_repeat")?,
            min_versions:   setting_as("filter", "min_count_version")?,
            min_components: setting_as("filter", "min_count_component")?,
        })
    }
}

/// Drops every (version, step, query) group whose highest try is below
/// `repeat`.
pub fn retain_complete_repeats(records: Vec<TimeLogRecord>, repeat: u32) -> Vec<TimeLogRecord> {
    let mut max_try: HashMap<(u32, u32, &str), u32> = HashMap::new();
    for r in &records {
        let entry = max_try
            .entry((r.version, r.step, r.query.as_str()))
            .or_insert(0);
        *entry = (*entry).max(r.try_number);
    }
    let incomplete: HashSet<(u32, u32, String)> = max_try
        .into_iter()
        .filter(|(_, max)| *max < repeat)
        .map(|((version, step, query), _)| (version, step, query.to_string()))
        .collect();

    records
        .into_iter()
        .filter(|r| !incomplete.contains(&(r.version, r.step, r.query.clone())))
        .collect()
}

/// Counts the distinct `value`s of each `key`.
fn distinct_counts<'a, K, V, FK, FV>(
    records: &'a [TimeLogRecord],
    key: FK,
    value: FV,
) -> HashMap<K, usize>
where
    K: Eq + Hash,
    V: Eq + Hash,
    FK: Fn(&'a TimeLogRecord) -> K,
    FV: Fn(&'a TimeLogRecord) -> V,
{
    let mut values: HashMap<K, HashSet<V>> = HashMap::new();
    for r in records {
        values.entry(key(r)).or_default().insert(value(r));
    }
    values.into_iter().map(|(k, v)| (k, v.len())).collect()
}

/// Drops every (step, query) pair for which some store ran on fewer than
/// `count` distinct versions.
pub fn retain_min_versions(records: Vec<TimeLogRecord>, count: usize) -> Vec<TimeLogRecord> {
    let dropped: HashSet<(u32, String)> = distinct_counts(
        &records,
        |r| (r.step, r.query.as_str(), r.component_name.as_str()),
        |r| r.version,
    )
    .into_iter()
    .filter(|(_, n)| *n < count)
    .map(|((step, query, _), _)| (step, query.to_string()))
    .collect();

    records
        .into_iter()
        .filter(|r| !dropped.contains(&(r.step, r.query.clone())))
        .collect()
}

/// Drops every (step, query, version) group run by fewer than `count`
/// distinct stores.
pub fn retain_min_components(records: Vec<TimeLogRecord>, count: usize) -> Vec<TimeLogRecord> {
    let dropped: HashSet<(u32, String, u32)> = distinct_counts(
        &records,
        |r| (r.step, r.query.as_str(), r.version),
        |r| r.component_name.as_str(),
    )
    .into_iter()
    .filter(|(_, n)| *n < count)
    .map(|((step, query, version), _)| (step, query.to_string(), version))
    .collect();

    records
        .into_iter()
        .filter(|r| !dropped.contains(&(r.step, r.query.clone(), r.version)))
        .collect()
}

/// Applies the three filters in order: repeats, versions, then stores.
pub fn apply_filters(records: Vec<TimeLogRecord>, thresholds: &Thresholds) -> Vec<TimeLogRecord> {
    let records = retain_complete_repeats(records, thresholds.repeat);
    info!("After the repeat filter: {}", records.len());
    let records = retain_min_versions(records, thresholds.min_versions);
    info!("After the version count filter: {}", records.len());
    let records = retain_min_components(records, thresholds.min_components);
    info!("After the component count filter: {}", records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(version: u32, step: u32, query: &str, store: &str, try_number: u32) -> TimeLogRecord {
        TimeLogRecord {
            version,
            product: 1,
            step,
            component: format!("bench-dag-x-{}-{}-1-{}", store, version, step),
            duration_ms: 10,
            query: query.to_string(),
            try_number,
            time: 0,
            component_name: store.to_string(),
            aggregative: None,
        }
    }

    /// Every store runs every version with tries 1..=repeat.
    fn complete(versions: &[u32], stores: &[&str], repeat: u32) -> Vec<TimeLogRecord> {
        let mut records = Vec::new();
        for &v in versions {
            for store in stores {
                for t in 1..=repeat {
                    records.push(record(v, 0, "query-1", store, t));
                }
            }
        }
        records
    }

    #[test]
    fn repeats() {
        let mut records = complete(&[1, 2], &["jena"], 3);
        records.push(record(3, 0, "query-1", "jena", 1));
        records.push(record(3, 0, "query-1", "jena", 2));
        let kept = retain_complete_repeats(records, 3);
        assert_eq!(6, kept.len());
        assert!(kept.iter().all(|r| r.version != 3));
    }

    #[test]
    fn versions() {
        let mut records = complete(&[1, 2, 3], &["jena", "blazegraph"], 1);
        // another query where blazegraph only ran two versions
        for v in [1, 2, 3] {
            records.push(record(v, 0, "query-2", "jena", 1));
        }
        for v in [1, 2] {
            records.push(record(v, 0, "query-2", "blazegraph", 1));
        }
        let kept = retain_min_versions(records, 3);
        assert_eq!(6, kept.len());
        assert!(kept.iter().all(|r| r.query == "query-1"));
    }

    #[test]
    fn components() {
        let mut records = complete(&[1, 2], &["jena", "blazegraph", "quaque-flat"], 1);
        records.retain(|r| !(r.version == 2 && r.component_name == "quaque-flat"));
        let kept = retain_min_components(records, 3);
        assert_eq!(3, kept.len());
        assert!(kept.iter().all(|r| r.version == 1));
    }

    #[test]
    fn chained() -> Result<()> {
        let thresholds = Thresholds::from_settings()?;
        assert_eq!(
            Thresholds {
                repeat:         200,
                min_versions:   4,
                min_components: 3,
            },
            thresholds
        );

        let stores = ["jena", "blazegraph", "quaque-flat"];
        let records = complete(&[1, 2, 3, 4], &stores, 2);
        let small = Thresholds {
            repeat:         2,
            min_versions:   4,
            min_components: 3,
        };
        assert_eq!(4 * 3 * 2, apply_filters(records.clone(), &small).len());
        assert!(apply_filters(records, &thresholds).is_empty());
        assert!(apply_filters(vec![], &small).is_empty());
        Ok(())
    }
}
