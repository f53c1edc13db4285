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

//! Configuration settings that affect all crates in current system.

use crate::error::{QuadbenchError, Result};
use ini::Ini;
use lazy_static::lazy_static;
use std::str::FromStr;

lazy_static! {
    /// Global settings.
    pub static ref QUADBENCH_CONF: Ini = Ini::load_from_str(include_str!("./config.toml")).unwrap();
}

/// Returns the raw value of `key` in `section` of the global settings.
pub fn setting(section: &str, key: &str) -> Result<String> {
    QUADBENCH_CONF
        .section(Some(section))
        .and_then(|s| s.get(key))
        .map(|v| v.to_string())
        .ok_or_else(|| QuadbenchError::Config(format!("missing setting [{}] {}", section, key)))
}

/// Returns the value of `key` in `section` parsed as `T`.
pub fn setting_as<T: FromStr>(section: &str, key: &str) -> Result<T> {
    let raw = setting(section, key)?;
    raw.parse::<T>().map_err(|_| {
        QuadbenchError::Config(format!(
            "setting [{}] {} has an unexpected value: {}",
            section, key, raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_shows() -> Result<()> {
        let conf = Ini::load_from_str(include_str!("./config.toml")).unwrap();

        for (sec, prop) in &conf {
            println!("Section: {:?}", sec);
            for (key, value) in prop.iter() {
                println!("{:?}:{:?}", key, value);
            }
        }

        assert_eq!(200, setting_as::<usize>("experiment", "repeat")?);
        assert_eq!(4, setting_as::<usize>("filter", "min_count_version")?);
        assert_eq!(3, setting_as::<usize>("filter", "min_count_component")?);
        assert_eq!("argo", setting("argo", "namespace")?);
        assert_eq!("stain/jena-fuseki:5.1.0", setting("images", "jena")?);

        Ok(())
    }

    #[test]
    fn missing_setting() {
        assert!(matches!(
            setting("images", "oracle"),
            Err(QuadbenchError::Config(_))
        ));
        assert!(matches!(
            setting_as::<u32>("argo", "namespace"),
            Err(QuadbenchError::Config(_))
        ));
    }
}
