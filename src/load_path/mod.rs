//==================================================
// File: load_path/mod.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Ordered search roots for schema modules
// Objective: Locate a module's source file by root precedence and list modules
//==================================================

use crate::error::{Result, ThetaError};
use crate::name::{ModuleName, THETA_EXTENSION};
use serde::Serialize;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Ordered list of root directories. Earlier roots shadow later ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadPath {
    roots: Vec<PathBuf>,
}

impl LoadPath {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a platform path list (`:`-separated on Unix), as used by `THETA_LOADPATH`.
    pub fn from_path_list(list: impl AsRef<OsStr>) -> Self {
        Self::new(std::env::split_paths(list.as_ref()).filter(|root| !root.as_os_str().is_empty()))
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn push<P: Into<PathBuf>>(&mut self, root: P) {
        let root = root.into();
        if !self.roots.contains(&root) {
            self.roots.push(root);
        }
    }

    /// Return the file for `name` under the first root that has one.
    pub fn find(&self, name: &ModuleName) -> Result<PathBuf> {
        let relative = name.to_path();
        for root in &self.roots {
            let candidate = root.join(&relative);
            trace!(module = %name, candidate = %candidate.display(), "probing");
            if candidate.is_file() {
                debug!(module = %name, path = %candidate.display(), "located module");
                return Ok(candidate);
            }
        }
        Err(ThetaError::missing_module(self, name))
    }

    /// Every module reachable through this load path, sorted by name.
    ///
    /// Files whose relative path is not a valid module name are skipped.
    pub fn list_modules(&self) -> Result<Vec<ModuleName>> {
        let mut modules = BTreeSet::new();
        for root in &self.roots {
            if !root.is_dir() {
                continue;
            }
            for entry in WalkDir::new(root).follow_links(true) {
                let entry = entry.map_err(|error| {
                    let path = error.path().unwrap_or(root.as_path()).to_path_buf();
                    ThetaError::io(path, error.into())
                })?;
                if !entry.file_type().is_file() || !has_theta_extension(entry.path()) {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(root) else {
                    continue;
                };
                match ModuleName::from_path(relative) {
                    Ok(name) => {
                        modules.insert(name);
                    }
                    Err(error) => debug!(%error, "skipping file"),
                }
            }
        }
        Ok(modules.into_iter().collect())
    }
}

fn has_theta_extension(path: &Path) -> bool {
    path.extension().and_then(OsStr::to_str) == Some(THETA_EXTENSION)
}

impl fmt::Display for LoadPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, root) in self.roots.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", root.display())?;
        }
        f.write_str("]")
    }
}


//==================================================
// End of file
//==================================================
