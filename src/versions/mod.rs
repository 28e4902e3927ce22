//==================================================
// File: versions/mod.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Supported language and target version ranges
// Objective: Reject modules declaring versions this engine cannot handle
//==================================================

use crate::error::{Result, ThetaError};
use crate::types::Metadata;
use once_cell::sync::Lazy;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Range of `language-version` values understood by the parser.
pub static LANGUAGE_VERSIONS: Lazy<VersionReq> = Lazy::new(|| {
    VersionReq::parse(">=1.0.0, <1.2.0").expect("valid version range")
});

/// Range of `avro-version` values understood by downstream code generators.
pub static TARGET_VERSIONS: Lazy<VersionReq> = Lazy::new(|| {
    VersionReq::parse(">=1.0.0, <1.1.0").expect("valid version range")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionAxis {
    Language,
    Target,
}

impl fmt::Display for VersionAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionAxis::Language => f.write_str("language"),
            VersionAxis::Target => f.write_str("avro"),
        }
    }
}

/// Accepted range for each version axis. Immutable for the duration of a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportedVersions {
    pub language: VersionReq,
    pub target: VersionReq,
}

impl Default for SupportedVersions {
    fn default() -> Self {
        Self {
            language: LANGUAGE_VERSIONS.clone(),
            target: TARGET_VERSIONS.clone(),
        }
    }
}

impl SupportedVersions {
    pub fn range(&self, axis: VersionAxis) -> &VersionReq {
        match axis {
            VersionAxis::Language => &self.language,
            VersionAxis::Target => &self.target,
        }
    }

    /// Check both axes of `metadata`, language first.
    pub fn check(&self, metadata: &Metadata) -> Result<()> {
        self.check_axis(metadata, VersionAxis::Language, &metadata.language_version)?;
        self.check_axis(metadata, VersionAxis::Target, &metadata.target_version)
    }

    fn check_axis(&self, metadata: &Metadata, axis: VersionAxis, actual: &Version) -> Result<()> {
        let expected = self.range(axis);
        if expected.matches(actual) {
            return Ok(());
        }
        Err(ThetaError::UnsupportedVersion {
            metadata: metadata.clone(),
            axis,
            expected: expected.clone(),
            actual: actual.clone(),
        })
    }
}


//==================================================
// End of file
//==================================================
