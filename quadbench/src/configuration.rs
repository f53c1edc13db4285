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

//! Points of the experiment parameter space.
//!
//! A [`Configuration`] is a `(version, product, step)` triple. It is tagged
//! either as a [`DatasetConfiguration`], the maximal version generated once
//! for a `(product, step)` pair, or as a [`DatabaseConfiguration`], one
//! backend instance importing a prefix of that dataset.

use crate::error::{QuadbenchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// One point in the experiment parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Configuration {
    version: u32,
    product: u32,
    step:    u32,
}

impl Configuration {
    /// Creates a configuration without checking its range.
    pub const fn new(version: u32, product: u32, step: u32) -> Self {
        Configuration {
            version,
            product,
            step,
        }
    }

    /// Creates a configuration, rejecting versions or products below one.
    pub fn try_new(version: u32, product: u32, step: u32) -> Result<Self> {
        let config = Self::new(version, product, step);
        config.validate()?;
        Ok(config)
    }

    /// Decodes a configuration from JSON. The single-quoted literal form
    /// used by workflow parameter defaults, e.g.
    /// `{'version': 1, 'product': 1, 'step': 1}`, is accepted as well.
    pub fn parse(text: &str) -> Result<Self> {
        let normalized = text.trim().replace('\'', "\"");
        let config: Configuration = serde_json::from_str(&normalized).map_err(|e| {
            QuadbenchError::InvalidInput(format!("cannot decode configuration {}: {}", text, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that version and product are at least one. A step of zero is
    /// a valid "no change between versions" setting.
    pub fn validate(&self) -> Result<()> {
        if self.version == 0 {
            return Err(QuadbenchError::InvalidInput(format!(
                "version must be positive in {}",
                self
            )));
        }
        if self.product == 0 {
            return Err(QuadbenchError::InvalidInput(format!(
                "product must be positive in {}",
                self
            )));
        }
        Ok(())
    }

    /// Number of versions of the dataset.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of BSBM products inside the first version.
    pub fn product(&self) -> u32 {
        self.product
    }

    /// Number of changes between two versions.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// The `(product, step)` pair shared by a dataset and its databases.
    pub fn product_step(&self) -> (u32, u32) {
        (self.product, self.step)
    }

    /// Human readable identifier: `ve{version}-pr{product}-st{step}`.
    pub fn label(&self) -> String {
        format!("ve{}-pr{}-st{}", self.version, self.product, self.step)
    }

    /// Stable key of a database instance: `v{version}-p{product}-s{step}`.
    pub fn db_key(&self) -> String {
        format!("v{}-p{}-s{}", self.version, self.product, self.step)
    }

    /// Selector value labelling the services created for this configuration.
    pub fn cleanup_label(&self) -> String {
        format!("v-{}-p-{}-s-{}", self.version, self.product, self.step)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ve{}-pr{}-st{}", self.version, self.product, self.step)
    }
}

/// The maximal-version configuration of a `(product, step)` pair. The
/// dataset generated for it contains every smaller version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetConfiguration(Configuration);

impl DatasetConfiguration {
    /// Tags `config` as the dataset configuration of its `(product, step)`.
    pub fn new(config: Configuration) -> Self {
        DatasetConfiguration(config)
    }

    /// Name prefix of the volume holding the dataset. The orchestrator
    /// completes it with a random suffix.
    pub fn pvc_prefix(&self) -> String {
        format!(
            "pvc-ds-dbs-v{}-p{}-s{}-",
            self.version(),
            self.product(),
            self.step()
        )
    }

    /// Whether `db` imports a prefix of this dataset.
    pub fn contains(&self, db: &DatabaseConfiguration) -> bool {
        self.product_step() == db.product_step() && db.version() <= self.version()
    }
}

impl Deref for DatasetConfiguration {
    type Target = Configuration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for DatasetConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The wire record of a database configuration, carrying its `db_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DatabaseRecord {
    version: u32,
    product: u32,
    step:    u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    db_key:  Option<String>,
}

/// One backend instance under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "DatabaseRecord", from = "DatabaseRecord")]
pub struct DatabaseConfiguration(Configuration);

impl DatabaseConfiguration {
    /// Tags `config` as a database configuration.
    pub fn new(config: Configuration) -> Self {
        DatabaseConfiguration(config)
    }

    /// Decodes a database configuration, accepting the same forms as
    /// [`Configuration::parse`]. A `db_key` field is ignored since it is
    /// derived.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(DatabaseConfiguration(Configuration::parse(text)?))
    }

    /// The configuration without its tag.
    pub fn configuration(&self) -> Configuration {
        self.0
    }
}

impl Deref for DatabaseConfiguration {
    type Target = Configuration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for DatabaseConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<DatabaseConfiguration> for DatabaseRecord {
    fn from(db: DatabaseConfiguration) -> Self {
        DatabaseRecord {
            version: db.version(),
            product: db.product(),
            step:    db.step(),
            db_key:  Some(db.db_key()),
        }
    }
}

impl From<DatabaseRecord> for DatabaseConfiguration {
    fn from(record: DatabaseRecord) -> Self {
        DatabaseConfiguration(Configuration::new(
            record.version,
            record.product,
            record.step,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn derived_names() {
        let config = Configuration::new(10, 1, 20);
        assert_eq!("ve10-pr1-st20", config.label());
        assert_eq!("ve10-pr1-st20", config.to_string());
        assert_eq!("v10-p1-s20", config.db_key());
        assert_eq!("v-10-p-1-s-20", config.cleanup_label());
        assert_eq!(
            "pvc-ds-dbs-v10-p1-s20-",
            DatasetConfiguration::new(config).pvc_prefix()
        );
    }

    #[test]
    fn labels_do_not_collide() {
        let mut labels = HashSet::new();
        for version in [1, 10, 11, 100, 101] {
            for product in [1, 10, 11, 110] {
                for step in [0, 1, 10, 11] {
                    assert!(labels.insert(Configuration::new(version, product, step).label()));
                }
            }
        }
        assert_eq!(5 * 4 * 4, labels.len());
    }

    #[test]
    fn parse_json_and_literal() -> Result<()> {
        let json = Configuration::parse(r#"{"version": 100, "product": 1, "step": 0}"#)?;
        assert_eq!(Configuration::new(100, 1, 0), json);

        let literal = Configuration::parse("{'version': 1, 'product': 1, 'step': 1}")?;
        assert_eq!(Configuration::new(1, 1, 1), literal);

        let db = DatabaseConfiguration::parse(
            r#"{"version": 5, "product": 20, "step": 20, "db_key": "v5-p20-s20"}"#,
        )?;
        assert_eq!(Configuration::new(5, 20, 20), db.configuration());
        Ok(())
    }

    #[test]
    fn parse_rejects_bad_input() {
        for text in [
            r#"{"version": 0, "product": 1, "step": 0}"#,
            r#"{"version": 1, "product": 0, "step": 0}"#,
            r#"{"version": -1, "product": 1, "step": 0}"#,
            r#"{"version": 1, "product": 1}"#,
            "not a configuration",
        ] {
            assert!(
                matches!(Configuration::parse(text), Err(QuadbenchError::InvalidInput(_))),
                "{} should be rejected",
                text
            );
        }
    }

    #[test]
    fn wire_records() -> Result<()> {
        let config = Configuration::new(1, 1, 0);
        assert_eq!(
            r#"{"version":1,"product":1,"step":0}"#,
            serde_json::to_string(&DatasetConfiguration::new(config))?
        );
        assert_eq!(
            r#"{"version":1,"product":1,"step":0,"db_key":"v1-p1-s0"}"#,
            serde_json::to_string(&DatabaseConfiguration::new(config))?
        );
        Ok(())
    }

    #[test]
    fn dataset_contains_prefix_versions() {
        let ds = DatasetConfiguration::new(Configuration::new(100, 1, 10));
        assert!(ds.contains(&DatabaseConfiguration::new(Configuration::new(1, 1, 10))));
        assert!(ds.contains(&DatabaseConfiguration::new(Configuration::new(100, 1, 10))));
        assert!(!ds.contains(&DatabaseConfiguration::new(Configuration::new(1, 1, 20))));
        assert!(!ds.contains(&DatabaseConfiguration::new(Configuration::new(101, 1, 10))));
    }
}
