//==================================================
// File: lib.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Theta schema module resolution engine
// Objective: Locate, parse, version-check and merge .theta modules
//==================================================

pub mod config;
pub mod error;
pub mod load_path;
pub mod lookup;
pub mod modules;
pub mod name;
pub mod parser;
pub mod pretty;
pub mod tokenizer;
pub mod types;
pub mod versions;

pub use error::{Result, ThetaError};
pub use load_path::LoadPath;
pub use lookup::get_definition;
pub use modules::{ModuleLoader, get_module};
pub use name::{ModuleName, Name};
pub use types::{Definition, Environment, Metadata, Module, Type, import_module};
pub use versions::SupportedVersions;

//==================================================
// End of file
//==================================================
