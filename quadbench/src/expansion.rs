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

//! Expansion of the experiment parameter lists into dataset and database
//! configurations.
//!
//! One dataset is generated per `(product, step)` pair, at the maximum
//! version. Every database configuration sharing that pair imports a prefix
//! of it, so the dataset volume is reused by all of them.

use crate::configuration::{Configuration, DatabaseConfiguration, DatasetConfiguration};
use crate::encoding::to_wire_json;
use crate::error::{QuadbenchError, Result};
use itertools::{iproduct, Itertools};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Order of the database configurations inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOrder {
    /// Keep the order of the `versions` list.
    AsGiven,
    /// Sort versions ascending before expanding, so the lowest version of a
    /// group always comes first.
    Ascending,
}

impl Default for VersionOrder {
    fn default() -> Self {
        VersionOrder::AsGiven
    }
}

/// A dataset configuration and the database configurations importing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationGroup {
    /// The dataset generated for the group.
    pub ds_config:  DatasetConfiguration,
    /// The databases built from the dataset.
    pub dbs_config: Vec<DatabaseConfiguration>,
}

/// The result of an expansion, one group per `(product, step)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpansionResult {
    groups: Vec<ConfigurationGroup>,
}

impl ExpansionResult {
    /// Builds a result from already grouped configurations, checking the
    /// range of every configuration, that every database belongs to the
    /// dataset of its group, and that each `(product, step)` pair and each
    /// database appears once.
    pub fn from_groups(groups: Vec<ConfigurationGroup>) -> Result<Self> {
        let mut pairs = HashSet::new();
        let mut databases = HashSet::new();
        for group in &groups {
            group.ds_config.validate()?;
            if !pairs.insert(group.ds_config.product_step()) {
                return Err(QuadbenchError::InconsistentGrouping(format!(
                    "more than one dataset for product {} and step {}",
                    group.ds_config.product(),
                    group.ds_config.step()
                )));
            }
            for db in &group.dbs_config {
                db.validate()?;
                if !databases.insert(*db) {
                    return Err(QuadbenchError::InconsistentGrouping(format!(
                        "database {} is listed more than once",
                        db
                    )));
                }
            }
            if let Some(db) = group.dbs_config.iter().find(|db| !group.ds_config.contains(db)) {
                return Err(QuadbenchError::InconsistentGrouping(format!(
                    "database {} is not covered by dataset {}",
                    db, group.ds_config
                )));
            }
        }
        Ok(ExpansionResult { groups })
    }

    /// Decodes the wire JSON of an expansion.
    pub fn from_json(text: &str) -> Result<Self> {
        let groups: Vec<ConfigurationGroup> = serde_json::from_str(text)
            .map_err(|e| QuadbenchError::InvalidInput(format!("cannot decode groups: {}", e)))?;
        Self::from_groups(groups)
    }

    /// The groups in expansion order.
    pub fn groups(&self) -> &[ConfigurationGroup] {
        &self.groups
    }

    /// The number of groups, i.e. of dataset configurations.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the result has no group.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterates over the dataset configurations.
    pub fn datasets(&self) -> impl Iterator<Item = &DatasetConfiguration> + '_ {
        self.groups.iter().map(|g| &g.ds_config)
    }

    /// Iterates over every database configuration, group by group.
    pub fn databases(&self) -> impl Iterator<Item = &DatabaseConfiguration> + '_ {
        self.groups.iter().flat_map(|g| g.dbs_config.iter())
    }

    /// Returns the dataset configuration a database imports from.
    pub fn dataset_for(&self, db: &DatabaseConfiguration) -> Option<&DatasetConfiguration> {
        self.groups
            .iter()
            .find(|g| g.dbs_config.contains(db))
            .map(|g| &g.ds_config)
    }

    /// Serializes the result for the orchestration layer.
    pub fn to_wire_json(&self) -> Result<String> {
        to_wire_json(&self.groups)
    }
}

impl<'a> IntoIterator for &'a ExpansionResult {
    type Item = &'a ConfigurationGroup;
    type IntoIter = std::slice::Iter<'a, ConfigurationGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Expands the parameter lists, keeping the order of `versions`.
pub fn expand(versions: &[u32], products: &[u32], steps: &[u32]) -> Result<ExpansionResult> {
    expand_with(versions, products, steps, VersionOrder::AsGiven)
}

/// Expands the parameter lists into one group per `(product, step)` pair.
///
/// Groups follow `products` then `steps` order. Inside a group, databases
/// follow `versions` order, or ascending order with
/// [`VersionOrder::Ascending`].
pub fn expand_with(
    versions: &[u32],
    products: &[u32],
    steps: &[u32],
    order: VersionOrder,
) -> Result<ExpansionResult> {
    check_list("versions", versions, 1)?;
    check_list("products", products, 1)?;
    check_list("steps", steps, 0)?;

    let mut versions = versions.to_vec();
    if order == VersionOrder::Ascending {
        versions.sort_unstable();
    }
    let max_version = versions
        .iter()
        .copied()
        .max()
        .ok_or_else(|| QuadbenchError::InvalidInput("versions must not be empty".to_string()))?;

    let mut groups = Vec::with_capacity(products.len() * steps.len());
    let mut index = HashMap::with_capacity(products.len() * steps.len());
    for (&product, &step) in iproduct!(products, steps) {
        index.insert((product, step), groups.len());
        groups.push(ConfigurationGroup {
            ds_config:  DatasetConfiguration::new(Configuration::new(max_version, product, step)),
            dbs_config: Vec::with_capacity(versions.len()),
        });
    }

    for (&version, &product, &step) in iproduct!(&versions, products, steps) {
        let db = DatabaseConfiguration::new(Configuration::new(version, product, step));
        let slot = *index.get(&db.product_step()).ok_or_else(|| {
            QuadbenchError::InconsistentGrouping(format!(
                "no dataset configuration for product {} and step {}",
                product, step
            ))
        })?;
        groups[slot].dbs_config.push(db);
    }

    debug!(
        "Expanded {} dataset and {} database configurations",
        groups.len(),
        groups.iter().map(|g| g.dbs_config.len()).sum::<usize>()
    );

    Ok(ExpansionResult { groups })
}

fn check_list(name: &str, values: &[u32], min: u32) -> Result<()> {
    if values.is_empty() {
        return Err(QuadbenchError::InvalidInput(format!(
            "{} must not be empty",
            name
        )));
    }
    if let Some(v) = values.iter().find(|&&v| v < min) {
        return Err(QuadbenchError::InvalidInput(format!(
            "{} must be at least {}, got {}",
            name, min, v
        )));
    }
    if let Some(v) = values.iter().duplicates().next() {
        return Err(QuadbenchError::InvalidInput(format!(
            "{} contains {} more than once",
            name, v
        )));
    }
    Ok(())
}

/// Hand-picked groups replayed by the fix entry point: `(dataset, versions)`.
const FIXED_GROUPS: &[((u32, u32, u32), &[u32])] = &[
    ((100, 20, 20), &[5, 35, 70, 100]),
    ((100, 20, 0), &[70]),
    ((100, 10, 10), &[100]),
    ((100, 1, 10), &[100, 35]),
];

/// The explicitly enumerated configurations of the fix entry point. They do
/// not come from a cross product and keep their listed order.
pub fn fixed_configurations() -> ExpansionResult {
    let groups = FIXED_GROUPS
        .iter()
        .map(|&((version, product, step), versions)| ConfigurationGroup {
            ds_config:  DatasetConfiguration::new(Configuration::new(version, product, step)),
            dbs_config: versions
                .iter()
                .map(|&v| DatabaseConfiguration::new(Configuration::new(v, product, step)))
                .collect(),
        })
        .collect();
    ExpansionResult { groups }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triples<'a>(
        configs: impl Iterator<Item = &'a DatabaseConfiguration>,
    ) -> Vec<(u32, u32, u32)> {
        configs
            .map(|c| (c.version(), c.product(), c.step()))
            .collect()
    }

    #[test]
    fn versions_products_steps_scenario() -> Result<()> {
        let result = expand(&[1, 10, 100], &[1], &[0, 10, 20])?;

        assert_eq!(3, result.len());
        let datasets: Vec<_> = result
            .datasets()
            .map(|d| (d.version(), d.product(), d.step()))
            .collect();
        assert_eq!(vec![(100, 1, 0), (100, 1, 10), (100, 1, 20)], datasets);

        assert_eq!(9, result.databases().count());
        assert_eq!(
            vec![(1, 1, 0), (10, 1, 0), (100, 1, 0)],
            triples(result.groups()[0].dbs_config.iter())
        );
        assert_eq!(
            vec![(1, 1, 20), (10, 1, 20), (100, 1, 20)],
            triples(result.groups()[2].dbs_config.iter())
        );
        Ok(())
    }

    #[test]
    fn counts_and_grouping() -> Result<()> {
        let versions = [3, 7, 2, 9];
        let products = [1, 20, 40];
        let steps = [0, 5];
        let result = expand(&versions, &products, &steps)?;

        assert_eq!(products.len() * steps.len(), result.len());
        assert_eq!(
            versions.len() * products.len() * steps.len(),
            result.databases().count()
        );
        for group in &result {
            assert_eq!(9, group.ds_config.version());
            for db in &group.dbs_config {
                assert_eq!(group.ds_config.product_step(), db.product_step());
                assert_eq!(Some(&group.ds_config), result.dataset_for(db));
            }
        }
        // every database shows up in exactly one group
        let mut all = triples(result.databases());
        all.sort_unstable();
        all.dedup();
        assert_eq!(versions.len() * products.len() * steps.len(), all.len());
        Ok(())
    }

    #[test]
    fn group_order_follows_inputs() -> Result<()> {
        let result = expand(&[1], &[40, 1], &[20, 0])?;
        let order: Vec<_> = result.datasets().map(|d| d.product_step()).collect();
        assert_eq!(vec![(40, 20), (40, 0), (1, 20), (1, 0)], order);
        Ok(())
    }

    #[test]
    fn version_order() -> Result<()> {
        let given = expand(&[50, 10, 100], &[1], &[0])?;
        assert_eq!(
            vec![50, 10, 100],
            given.groups()[0]
                .dbs_config
                .iter()
                .map(|d| d.version())
                .collect::<Vec<_>>()
        );

        let sorted = expand_with(&[50, 10, 100], &[1], &[0], VersionOrder::Ascending)?;
        assert_eq!(
            vec![10, 50, 100],
            sorted.groups()[0]
                .dbs_config
                .iter()
                .map(|d| d.version())
                .collect::<Vec<_>>()
        );
        assert_eq!(100, sorted.groups()[0].ds_config.version());
        Ok(())
    }

    #[test]
    fn expansion_is_deterministic() -> Result<()> {
        let first = expand(&[10, 50, 100], &[1, 20, 40], &[0, 10, 20])?;
        let second = expand(&[10, 50, 100], &[1, 20, 40], &[0, 10, 20])?;
        assert_eq!(first, second);
        assert_eq!(first.to_wire_json()?, second.to_wire_json()?);
        Ok(())
    }

    #[test]
    fn invalid_inputs() {
        let cases: [(&[u32], &[u32], &[u32]); 6] = [
            (&[], &[1], &[0]),
            (&[1], &[], &[0]),
            (&[1], &[1], &[]),
            (&[0, 1], &[1], &[0]),
            (&[1], &[0], &[0]),
            (&[1, 1], &[1], &[0]),
        ];
        for (versions, products, steps) in cases {
            assert!(matches!(
                expand(versions, products, steps),
                Err(QuadbenchError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn wire_json() -> Result<()> {
        let result = expand(&[1, 10], &[1], &[0])?;
        assert_eq!(
            concat!(
                r#"[{"ds_config": {"version": 10, "product": 1, "step": 0}, "dbs_config": ["#,
                r#"{"version": 1, "product": 1, "step": 0, "db_key": "v1-p1-s0"}, "#,
                r#"{"version": 10, "product": 1, "step": 0, "db_key": "v10-p1-s0"}]}]"#
            ),
            result.to_wire_json()?
        );
        assert_eq!(result, ExpansionResult::from_json(&result.to_wire_json()?)?);
        Ok(())
    }

    #[test]
    fn fixed_groups() -> Result<()> {
        let fixed = fixed_configurations();
        assert_eq!(4, fixed.len());
        assert_eq!(8, fixed.databases().count());
        assert_eq!(
            vec![(100, 1, 10), (35, 1, 10)],
            triples(fixed.groups()[3].dbs_config.iter())
        );
        assert!(fixed.datasets().all(|d| d.version() == 100));
        // the table is consistent with its datasets
        ExpansionResult::from_groups(fixed.groups().to_vec())?;
        Ok(())
    }

    #[test]
    fn inconsistent_groups_are_rejected() {
        let groups = vec![ConfigurationGroup {
            ds_config:  DatasetConfiguration::new(Configuration::new(10, 1, 0)),
            dbs_config: vec![DatabaseConfiguration::new(Configuration::new(5, 1, 10))],
        }];
        assert!(matches!(
            ExpansionResult::from_groups(groups),
            Err(QuadbenchError::InconsistentGrouping(_))
        ));
    }

    #[test]
    fn one_dataset_per_product_and_step() {
        let text = concat!(
            r#"[{"ds_config": {"version": 100, "product": 1, "step": 0}, "#,
            r#""dbs_config": [{"version": 1, "product": 1, "step": 0}]}, "#,
            r#"{"ds_config": {"version": 50, "product": 1, "step": 0}, "#,
            r#""dbs_config": [{"version": 1, "product": 1, "step": 0}]}]"#
        );
        assert!(matches!(
            ExpansionResult::from_json(text),
            Err(QuadbenchError::InconsistentGrouping(_))
        ));

        let repeated = vec![ConfigurationGroup {
            ds_config:  DatasetConfiguration::new(Configuration::new(10, 1, 0)),
            dbs_config: vec![
                DatabaseConfiguration::new(Configuration::new(5, 1, 0)),
                DatabaseConfiguration::new(Configuration::new(5, 1, 0)),
            ],
        }];
        assert!(matches!(
            ExpansionResult::from_groups(repeated),
            Err(QuadbenchError::InconsistentGrouping(_))
        ));
    }
}
