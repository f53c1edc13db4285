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

//! A "prelude" for users of the quadbench crate.
//!
//! Like the standard library's prelude, this module simplifies importing of
//! common items. Unlike the standard prelude, the contents of this module must
//! be imported manually:
//!
//! ```
//! use quadbench::prelude::*;
//! ```

pub use crate::capacity::{
    database_volume_request, estimate_dataset_volume_size_mib,
    estimate_shared_dataset_volume_size_mib, shared_dataset_volume_request,
};
pub use crate::configs::*;
pub use crate::configuration::{Configuration, DatabaseConfiguration, DatasetConfiguration};
pub use crate::dag::{Backend, ExperimentDag, TaskKind, TaskNode, TaskSummary};
pub use crate::encoding::to_wire_json;
pub use crate::error::{QuadbenchError, Result};
pub use crate::expansion::{
    expand, expand_with, fixed_configurations, ConfigurationGroup, ExpansionResult, VersionOrder,
};
pub use crate::logs::*;
pub use crate::params::ParameterFiles;
