//==================================================
// File: error/mod.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Error taxonomy for module resolution
// Objective: One failure channel callers can match on to build diagnostics
//==================================================

use crate::load_path::LoadPath;
use crate::name::{ModuleName, Name, NameError};
use crate::parser::ParseError;
use crate::types::Metadata;
use crate::versions::VersionAxis;
use semver::{Version, VersionReq};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = ThetaError> = std::result::Result<T, E>;

/// Unified error type for loading and querying Theta modules.
#[derive(Debug, Error)]
pub enum ThetaError {
    #[error("module '{module}' not found in load path {load_path}")]
    MissingModule {
        load_path: LoadPath,
        module: ModuleName,
    },
    #[error("'{0}' is not defined")]
    MissingName(Name),
    #[error(
        "module '{}' declares {axis} version {actual}, supported range is {expected}",
        .metadata.module_name
    )]
    UnsupportedVersion {
        metadata: Metadata,
        axis: VersionAxis,
        expected: VersionReq,
        actual: Version,
    },
    #[error("cyclic import: {}", render_cycle(.cycle))]
    CyclicImport { cycle: Vec<ModuleName> },
    #[error("parse error in '{}': {error}", .path.display())]
    Parse { path: PathBuf, error: ParseError },
    #[error("failed reading '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    InvalidName(#[from] NameError),
}

fn render_cycle(cycle: &[ModuleName]) -> String {
    cycle
        .iter()
        .map(ModuleName::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl ThetaError {
    pub fn missing_module(load_path: &LoadPath, module: &ModuleName) -> Self {
        Self::MissingModule {
            load_path: load_path.clone(),
            module: module.clone(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}


//==================================================
// End of file
//==================================================
