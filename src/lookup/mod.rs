//==================================================
// File: lookup/mod.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Resolve fully qualified names to definitions
// Objective: Load the owning module and search its merged environment
//==================================================

use crate::error::{Result, ThetaError};
use crate::load_path::LoadPath;
use crate::modules::ModuleLoader;
use crate::name::Name;
use crate::types::Definition;

impl ModuleLoader {
    /// Look up `module.Name`.
    ///
    /// A module with no source file yields `MissingModule` for the requested
    /// module; a loaded module without the name yields `MissingName`.
    pub fn get_definition(&self, qualified: &str) -> Result<Definition> {
        let name = Name::parse(qualified)?;
        self.get_definition_by_name(&name)
    }

    pub fn get_definition_by_name(&self, name: &Name) -> Result<Definition> {
        let module = self.get_module(&name.module)?;
        module
            .lookup_name(name)
            .cloned()
            .ok_or_else(|| ThetaError::MissingName(name.clone()))
    }
}

/// Look up `module.Name` with default version ranges and a fresh cache.
pub fn get_definition(load_path: &LoadPath, qualified: &str) -> Result<Definition> {
    ModuleLoader::new(load_path.clone()).get_definition(qualified)
}


//==================================================
// End of file
//==================================================
