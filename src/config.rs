// merakifw - Meraki MX firewalled services report
// Copyright (C) 2024 merakifw contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

pub const CONFIG_DIR_ENV: &str = "MERAKIFW_CONFIG_DIR";

/// Optional defaults read from `config.yaml`. Flags and environment
/// variables always win over the file.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub org_id: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate a config directory for the current user")]
    MissingConfigDir,
    #[error("timeout_secs must be at least 1 second")]
    ZeroTimeout,
}

#[derive(Debug)]
pub struct EffectiveConfig {
    pub api_key: Option<String>,
    pub org_id: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

pub fn config_path() -> Result<PathBuf> {
    if let Ok(custom) = env::var(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(custom).join("config.yaml"));
    }
    let base = config_dir().ok_or(ConfigError::MissingConfigDir)?;
    Ok(base.join("merakifw").join("config.yaml"))
}

pub fn load(path: &Path) -> Result<Config> {
    Ok(read_if_exists(path)?.unwrap_or_default())
}

/// Layer command-line/environment overrides on top of the file at `path`.
pub fn resolve(path: &Path, overrides: Config) -> Result<EffectiveConfig> {
    let merged = merge(load(path)?, overrides);

    let base_url = merged
        .base_url
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let timeout_secs = merged.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(ConfigError::ZeroTimeout.into());
    }
    let timeout = Duration::from_secs(timeout_secs);

    Ok(EffectiveConfig {
        api_key: non_blank(merged.api_key),
        org_id: non_blank(merged.org_id),
        base_url,
        timeout,
    })
}

fn read_if_exists(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let config = serde_yaml::from_str(&contents).with_context(|| format!("parsing {:?}", path))?;
    Ok(Some(config))
}

fn merge(file: Config, overrides: Config) -> Config {
    Config {
        api_key: overrides.api_key.or(file.api_key),
        org_id: overrides.org_id.or(file.org_id),
        base_url: overrides.base_url.or(file.base_url),
        timeout_secs: overrides.timeout_secs.or(file.timeout_secs),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
