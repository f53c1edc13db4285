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

//! The experiment environment is resolved once at process start from the
//! built-in settings and the process environment, then handed down by
//! reference to every component that needs it.

use crate::config::{setting, setting_as};
use crate::error::Result;
use log::debug;
use serde::Serialize;

/// Container images launched by the experiment tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerImages {
    /// BSBM dataset generator.
    pub bsbm:                String,
    /// Converts generated triples into relational or theoretical quads.
    pub quads_transformer:   String,
    /// Blazegraph triple store.
    pub blazegraph:          String,
    /// Jena Fuseki triple store.
    pub jena:                String,
    /// Postgres backing the converg quad store.
    pub postgres:            String,
    /// Quads loader (importer).
    pub quader:              String,
    /// Quads querier.
    pub quaque:              String,
    /// Small python image with `requests`, used by space probes.
    pub python_requests:     String,
    /// Image shipping `quadbench-cli`, used by the parameter steps.
    pub quadbench:           String,
    /// Fetches and merges the logs of a workflow.
    pub get_workflow_logs:   String,
    /// Timing plots.
    pub log_to_plots:        String,
    /// Storage plots.
    pub space_logs_to_plots: String,
}

impl ContainerImages {
    /// Loads the image references from the `[images]` settings.
    pub fn from_settings() -> Result<Self> {
        Ok(ContainerImages {
            bsbm:                setting("images", "bsbm")?,
            quads_transformer:   setting("images", "quads_transformer")?,
            blazegraph:          setting("images", "blazegraph")?,
            jena:                setting("images", "jena")?,
            postgres:            setting("images", "postgres")?,
            quader:              setting("images", "quader")?,
            quaque:              setting("images", "quaque")?,
            python_requests:     setting("images", "python_requests")?,
            quadbench:           setting("images", "quadbench")?,
            get_workflow_logs:   setting("images", "get_workflow_logs")?,
            log_to_plots:        setting("images", "log_to_plots")?,
            space_logs_to_plots: setting("images", "space_logs_to_plots")?,
        })
    }
}

/// Resource requests and limits shared by the benchmark containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLimits {
    /// Number of query repetitions per configuration.
    pub repeat:         usize,
    /// CPU limit of a database container.
    pub cpu_limit:      u32,
    /// Memory request in GiB.
    pub memory_request: u32,
    /// Memory limit in GiB.
    pub memory_limit:   u32,
    /// Query timeout in seconds, zero disables it.
    pub timeout:        u64,
}

impl ResourceLimits {
    /// Loads the limits from the `[experiment]` settings.
    pub fn from_settings() -> Result<Self> {
        Ok(ResourceLimits {
            repeat:         setting_as("experiment", "repeat")?,
            cpu_limit:      setting_as("experiment", "cpu_limit")?,
            memory_request: setting_as("experiment", "memory_request")?,
            memory_limit:   setting_as("experiment", "memory_limit")?,
            timeout:        setting_as("experiment", "timeout")?,
        })
    }
}

/// Everything an experiment needs to know about its surroundings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentEnv {
    /// Workflow server address without scheme (`ARGO_SERVER`).
    pub server:            Option<String>,
    /// Workflow server bearer token (`ARGO_TOKEN`).
    pub token:             Option<String>,
    /// Workflow namespace (`ARGO_NAMESPACE`).
    pub namespace:         String,
    /// Database user of the postgres backed stores (`POSTGRES_USER`).
    pub postgres_user:     String,
    /// Database password of the postgres backed stores
    /// (`POSTGRES_PASSWORD`).
    pub postgres_password: String,
    /// Container images.
    pub images:            ContainerImages,
    /// Resource limits.
    pub limits:            ResourceLimits,
}

impl ExperimentEnv {
    /// Resolves the environment from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the environment with a custom variable lookup. Unset or empty
    /// variables fall back to the built-in settings.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let env = ExperimentEnv {
            server:            var("ARGO_SERVER"),
            token:             var("ARGO_TOKEN"),
            namespace:         match var("ARGO_NAMESPACE") {
                Some(ns) => ns,
                None => setting("argo", "namespace")?,
            },
            postgres_user:     match var("POSTGRES_USER") {
                Some(user) => user,
                None => setting("postgres", "user")?,
            },
            postgres_password: match var("POSTGRES_PASSWORD") {
                Some(password) => password,
                None => setting("postgres", "password")?,
            },
            images:            ContainerImages::from_settings()?,
            limits:            ResourceLimits::from_settings()?,
        };
        debug!(
            "Experiment environment: server={:?}, namespace={}",
            env.server, env.namespace
        );
        Ok(env)
    }

    /// The workflow server URL, if a server is configured.
    pub fn host(&self) -> Option<String> {
        self.server.as_ref().map(|s| format!("https://{}", s))
    }
}
