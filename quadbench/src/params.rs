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

//! Output parameters of workflow steps.
//!
//! The orchestrator reads the outputs of a step from small text files at
//! fixed names (`valueFrom.path`). Each file holds a single value without a
//! trailing newline.

use crate::capacity::{database_volume_request, shared_dataset_volume_request};
use crate::config::setting;
use crate::configuration::{Configuration, DatabaseConfiguration, DatasetConfiguration};
use crate::error::{QuadbenchError, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Version of the configuration.
pub const VERSION: &str = "version";
/// Product of the configuration.
pub const PRODUCT: &str = "product";
/// Step of the configuration.
pub const STEP: &str = "step";
/// Name prefix of the shared dataset volume.
pub const PVC_NAME: &str = "pvc-name";
/// Storage request of the shared dataset volume.
pub const PVC_SIZE: &str = "pvc-size";
/// Storage request of the blazegraph volume of a database.
pub const BLAZEGRAPH_PVC_SIZE: &str = "blazegraph-pvc-size";

/// A directory of output parameter files.
#[derive(Debug, Clone)]
pub struct ParameterFiles {
    dir: PathBuf,
}

impl ParameterFiles {
    /// Parameter files stored in `dir`.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        ParameterFiles {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Parameter files stored in the default directory of the settings.
    pub fn from_settings() -> Result<Self> {
        Ok(Self::new(setting("paths", "parameters_dir")?))
    }

    /// The directory holding the files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes one parameter and returns the path of its file.
    pub fn write(&self, name: &str, value: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(|c: char| c == '/' || c == '\\') {
            return Err(QuadbenchError::InvalidInput(format!(
                "invalid parameter name: {:?}",
                name
            )));
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        fs::write(&path, value)?;
        info!("{} = {}", path.display(), value);
        Ok(path)
    }

    /// Reads one parameter back.
    pub fn read(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.dir.join(name))?)
    }

    /// Writes the `version`, `product` and `step` of a configuration.
    pub fn write_configuration(&self, config: &Configuration) -> Result<()> {
        self.write(VERSION, &config.version().to_string())?;
        self.write(PRODUCT, &config.product().to_string())?;
        self.write(STEP, &config.step().to_string())?;
        Ok(())
    }

    /// Reads back a configuration written by
    /// [`ParameterFiles::write_configuration`].
    pub fn read_configuration(&self) -> Result<Configuration> {
        let field = |name: &str| -> Result<u32> {
            let raw = self.read(name)?;
            raw.trim().parse::<u32>().map_err(|_| {
                QuadbenchError::InvalidInput(format!("parameter {} is not a number: {}", name, raw))
            })
        };
        Configuration::try_new(field(VERSION)?, field(PRODUCT)?, field(STEP)?)
    }

    /// Writes the outputs preparing a dataset generation.
    pub fn write_dataset(&self, ds: &DatasetConfiguration) -> Result<()> {
        self.write_configuration(ds)
    }

    /// Writes the name prefix and size request of the shared dataset volume.
    pub fn write_dataset_volume(&self, ds: &DatasetConfiguration) -> Result<()> {
        self.write(PVC_SIZE, &shared_dataset_volume_request(ds))?;
        self.write(PVC_NAME, &ds.pvc_prefix())?;
        Ok(())
    }

    /// Writes the outputs preparing a database: its configuration and the
    /// size request of its blazegraph volume.
    pub fn write_database(&self, db: &DatabaseConfiguration) -> Result<()> {
        self.write_configuration(db)?;
        self.write(BLAZEGRAPH_PVC_SIZE, &database_volume_request(db))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn dataset_parameters() -> Result<()> {
        let dir = tempdir()?;
        let files = ParameterFiles::new(dir.path());
        let ds = DatasetConfiguration::new(Configuration::new(100, 1, 0));

        files.write_dataset(&ds)?;
        assert_eq!("100", files.read(VERSION)?);
        assert_eq!("1", files.read(PRODUCT)?);
        assert_eq!("0", files.read(STEP)?);
        assert_eq!(Configuration::new(100, 1, 0), files.read_configuration()?);

        files.write_dataset_volume(&ds)?;
        assert_eq!("pvc-ds-dbs-v100-p1-s0-", files.read(PVC_NAME)?);
        assert_eq!("7726.5Mi", files.read(PVC_SIZE)?);
        Ok(())
    }

    #[test]
    fn database_parameters() -> Result<()> {
        let dir = tempdir()?;
        let files = ParameterFiles::new(dir.path().join("nested"));
        let db = DatabaseConfiguration::new(Configuration::new(1, 1, 1));

        files.write_database(&db)?;
        assert_eq!("1", files.read(VERSION)?);
        assert_eq!("1007.5Mi", files.read(BLAZEGRAPH_PVC_SIZE)?);
        Ok(())
    }

    #[test]
    fn rejects_path_names() -> Result<()> {
        let dir = tempdir()?;
        let files = ParameterFiles::new(dir.path());
        assert!(files.write("../version", "1").is_err());
        assert!(files.write("", "1").is_err());
        Ok(())
    }

    #[test]
    fn unreadable_configuration() -> Result<()> {
        let dir = tempdir()?;
        let files = ParameterFiles::new(dir.path());
        files.write(VERSION, "ten")?;
        files.write(PRODUCT, "1")?;
        files.write(STEP, "0")?;
        assert!(matches!(
            files.read_configuration(),
            Err(QuadbenchError::InvalidInput(_))
        ));
        Ok(())
    }
}
