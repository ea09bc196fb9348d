// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use serde::Deserialize;

use crate::db::project_dirs;
use crate::error::Result;

const ENV_PREFIX: &str = "MONEYBAG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `moneybag.sqlite`; platform data dir when unset.
    pub data_dir: Option<PathBuf>,
    /// Treat the device as offline: auto-pushes are deferred, pulls refused.
    pub offline: bool,
    /// Per-request timeout for the sync endpoint.
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            offline: false,
            timeout_secs: 15,
        }
    }
}

/// File, then `MONEYBAG_*` environment, then command-line flags.
pub fn load(m: &clap::ArgMatches) -> Result<AppConfig> {
    let path = match m.get_one::<String>("config") {
        Some(p) => Some(PathBuf::from(p)),
        None => project_dirs()
            .ok()
            .map(|d| d.config_dir().join("config.toml")),
    };

    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(false));
    }
    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if m.get_flag("offline") {
        settings.offline = true;
    }
    if let Some(dir) = m.get_one::<String>("data-dir") {
        settings.data_dir = Some(PathBuf::from(dir));
    }
    Ok(settings)
}
