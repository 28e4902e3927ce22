//==================================================
// File: name/mod.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Dotted module names and namespace-qualified definition names
// Objective: Provide ModuleName, Name, and the module name <-> path codec
//==================================================

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// File extension used by every schema module on disk.
pub const THETA_EXTENSION: &str = "theta";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("'{0}' is not a valid name segment")]
    InvalidSegment(String),
    #[error("module name is empty")]
    Empty,
    #[error("'{0}' is not qualified with a module name")]
    Unqualified(String),
    #[error("'{}' is not a .{} module path", .0.display(), THETA_EXTENSION)]
    InvalidPath(PathBuf),
}

/// Letters, digits and underscores, never starting with a digit.
pub fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn check_segment(segment: &str) -> Result<(), NameError> {
    if is_valid_segment(segment) {
        Ok(())
    } else {
        Err(NameError::InvalidSegment(segment.to_string()))
    }
}

//==================================================
// Section 1.0 - Module Names
//==================================================

/// A dotted module name such as `com.example.users`.
///
/// `namespace` holds every segment but the last; `base` is the last one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleName {
    namespace: Vec<String>,
    base: String,
}

impl ModuleName {
    pub fn new(namespace: Vec<String>, base: impl Into<String>) -> Result<Self, NameError> {
        let base = base.into();
        for segment in &namespace {
            check_segment(segment)?;
        }
        check_segment(&base)?;
        Ok(Self { namespace, base })
    }

    /// Parse a dotted name. Every segment must be non-empty.
    pub fn parse(dotted: &str) -> Result<Self, NameError> {
        if dotted.is_empty() {
            return Err(NameError::Empty);
        }
        let mut segments: Vec<String> = dotted.split('.').map(str::to_string).collect();
        let base = segments.pop().ok_or(NameError::Empty)?;
        Self::new(segments, base)
    }

    pub fn namespace(&self) -> &[String] {
        &self.namespace
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.namespace
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.base.as_str()))
    }

    /// Relative path of this module's source file, e.g. `com/example/users.theta`.
    pub fn to_path(&self) -> PathBuf {
        let mut path: PathBuf = self.namespace.iter().collect();
        path.push(format!("{}.{}", self.base, THETA_EXTENSION));
        path
    }

    /// Inverse of [`ModuleName::to_path`]. Only plain relative components are accepted.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, NameError> {
        let path = path.as_ref();
        let invalid = || NameError::InvalidPath(path.to_path_buf());

        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_str().ok_or_else(invalid)?),
                _ => return Err(invalid()),
            }
        }

        let file = segments.pop().ok_or_else(invalid)?;
        let base = file
            .strip_suffix(THETA_EXTENSION)
            .and_then(|stem| stem.strip_suffix('.'))
            .ok_or_else(invalid)?;
        let namespace = segments.into_iter().map(str::to_string).collect();
        Self::new(namespace, base)
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.namespace {
            write!(f, "{}.", segment)?;
        }
        f.write_str(&self.base)
    }
}

impl FromStr for ModuleName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ModuleName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

//==================================================
// Section 2.0 - Qualified Names
//==================================================

/// A definition name qualified with its owning module: `com.example.users.User`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    pub module: ModuleName,
    pub name: String,
}

impl Name {
    pub fn new(module: ModuleName, name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        check_segment(&name)?;
        Ok(Self { module, name })
    }

    /// Split on the last dot: everything before it names the module.
    pub fn parse(qualified: &str) -> Result<Self, NameError> {
        let (module, name) = qualified
            .rsplit_once('.')
            .ok_or_else(|| NameError::Unqualified(qualified.to_string()))?;
        Self::new(ModuleName::parse(module)?, name)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}


//==================================================
// End of file
//==================================================
