//==================================================
// File: config/mod.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Configuration for the Theta resolver and CLI
// Objective: Load theta.toml and pick the effective load path
//==================================================

//! Configuration handling for Theta including loading and defaults.

use crate::load_path::LoadPath;
use crate::versions::SupportedVersions;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding a platform path list of module roots.
pub const LOAD_PATH_ENV: &str = "THETA_LOADPATH";

/// Default configuration file name inside the user's config directory.
const CONFIG_FILE: &str = "theta.toml";

/// Configuration model loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Roots searched for modules, in order.
    pub load_path: Vec<PathBuf>,
    /// Accepted language and target version ranges.
    pub versions: SupportedVersions,
}

impl Config {
    /// `<config dir>/theta/theta.toml`, when the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("theta").join(CONFIG_FILE))
    }

    /// Load configuration from `path`, which must exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?;
        Self::from_toml(&data).with_context(|| format!("parsing configuration {}", path.display()))
    }

    /// Like [`Config::load`], but an absent file yields defaults.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml(data: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(data)?)
    }

    /// Relative `load-path` entries are taken relative to `base`.
    pub fn resolve_relative_to(mut self, base: &Path) -> Self {
        for root in &mut self.load_path {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
        self
    }

    /// Pick the effective load path: explicit roots, then `env`, then the file, then `.`.
    pub fn load_path(&self, explicit: &[PathBuf], env: Option<OsString>) -> LoadPath {
        if !explicit.is_empty() {
            return LoadPath::new(explicit.iter().cloned());
        }
        if let Some(list) = env {
            let from_env = LoadPath::from_path_list(list);
            if !from_env.is_empty() {
                return from_env;
            }
        }
        if !self.load_path.is_empty() {
            return LoadPath::new(self.load_path.iter().cloned());
        }
        LoadPath::new(["."])
    }
}


//==================================================
// End of file
//==================================================
