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

//! Coarse storage estimates used to size volumes before they are filled.
//!
//! A dataset holds three copies of the data (triples, relational quads and
//! theoretical quads). Every version adds `step + 1` triples on top of the
//! initial products and a triple is assumed to take a quarter of a mebibyte.

use crate::configuration::Configuration;
use crate::encoding::mebibytes;

/// Number of datasets written per version: triples, relational quads and
/// theoretical quads.
pub const DATASETS_PER_VERSION: f64 = 3.0;

/// Assumed size of one triple, in MiB.
pub const TRIPLE_SIZE_MIB: f64 = 0.25;

/// Fixed head room added to database volumes, in MiB.
pub const DATABASE_BASE_MIB: f64 = 1000.0;

fn data_size_mib(config: &Configuration) -> f64 {
    let versions = f64::from(config.version()) + 1.0;
    let steps = f64::from(config.step()) + 1.0;
    let triples_per_version = f64::from(config.product()) + steps * versions;
    (triples_per_version * TRIPLE_SIZE_MIB) * (versions * DATASETS_PER_VERSION)
}

/// Size of the volume a database (e.g. blazegraph) imports its dataset
/// prefix into, in MiB. Includes [`DATABASE_BASE_MIB`] of head room.
pub fn estimate_dataset_volume_size_mib(config: &Configuration) -> f64 {
    DATABASE_BASE_MIB + data_size_mib(config)
}

/// Size of the volume shared by a dataset and its databases, in MiB.
/// Same linear model without the head room.
pub fn estimate_shared_dataset_volume_size_mib(config: &Configuration) -> f64 {
    data_size_mib(config)
}

/// Storage request of a database volume, e.g. `1007.5Mi`.
pub fn database_volume_request(config: &Configuration) -> String {
    mebibytes(estimate_dataset_volume_size_mib(config))
}

/// Storage request of the shared dataset volume, e.g. `7.5Mi`.
pub fn shared_dataset_volume_request(config: &Configuration) -> String {
    mebibytes(estimate_shared_dataset_volume_size_mib(config))
}
