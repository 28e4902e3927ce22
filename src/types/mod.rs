//==================================================
// File: types/mod.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Core data model for resolved Theta modules
// Objective: Definitions, structural types, modules and their merged environment
//==================================================

use crate::name::{ModuleName, Name};
use semver::Version;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

//==================================================
// Section 1.0 - Metadata
//==================================================

/// Header carried by every module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub language_version: Version,
    /// Declared as `avro-version` in source.
    pub target_version: Version,
    pub module_name: ModuleName,
}

//==================================================
// Section 2.0 - Types
//==================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Primitive {
    Bool,
    Bytes,
    Int,
    Long,
    Float,
    Double,
    String,
    Date,
    Datetime,
    Uuid,
    Time,
    LocalDatetime,
}

impl Primitive {
    pub const ALL: [Primitive; 12] = [
        Primitive::Bool,
        Primitive::Bytes,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
        Primitive::String,
        Primitive::Date,
        Primitive::Datetime,
        Primitive::Uuid,
        Primitive::Time,
        Primitive::LocalDatetime,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Bool => "Bool",
            Primitive::Bytes => "Bytes",
            Primitive::Int => "Int",
            Primitive::Long => "Long",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
            Primitive::String => "String",
            Primitive::Date => "Date",
            Primitive::Datetime => "Datetime",
            Primitive::Uuid => "UUID",
            Primitive::Time => "Time",
            Primitive::LocalDatetime => "LocalDatetime",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == keyword)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub doc: Option<String>,
    #[serde(rename = "type")]
    pub ty: Type,
}

/// One constructor of a variant type: `Circle { radius : Double }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Case {
    pub name: Name,
    pub doc: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumSymbol {
    pub name: String,
    pub doc: Option<String>,
}

/// Structural type of a definition.
///
/// References hold the qualified name only; the target is looked up in the
/// owning module's environment when needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Type {
    Primitive(Primitive),
    Array(Box<Type>),
    Map(Box<Type>),
    Optional(Box<Type>),
    Reference(Name),
    Record(Vec<Field>),
    Variant(Vec<Case>),
    Enum(Vec<EnumSymbol>),
    Newtype(Box<Type>),
}

impl Type {
    /// Every qualified name this type mentions, in source order.
    pub fn references(&self) -> Vec<&Name> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a Name>) {
        match self {
            Type::Primitive(_) | Type::Enum(_) => {}
            Type::Array(inner) | Type::Map(inner) | Type::Optional(inner) | Type::Newtype(inner) => {
                inner.collect_references(out)
            }
            Type::Reference(name) => out.push(name),
            Type::Record(fields) => {
                for field in fields {
                    field.ty.collect_references(out);
                }
            }
            Type::Variant(cases) => {
                for field in cases.iter().flat_map(|case| &case.fields) {
                    field.ty.collect_references(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub name: Name,
    pub doc: Option<String>,
    #[serde(rename = "type")]
    pub ty: Type,
}

impl Definition {
    pub fn new(name: Name, ty: Type) -> Self {
        Self {
            name,
            doc: None,
            ty,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

//==================================================
// Section 3.0 - Modules
//==================================================

/// A module with its imports already resolved.
///
/// Modules are values: merging produces a new module and never mutates the
/// operands. Imported modules are shared through `Arc`. The merged
/// environment is computed when a module is built or merged, so lookups never
/// walk the import graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: ModuleName,
    pub metadata: Metadata,
    definitions: Vec<Definition>,
    imports: Vec<Arc<Module>>,
    /// Fold of every import's environment in declared order.
    imported: Arc<Environment>,
    /// `imported` with local definitions on top.
    environment: Arc<Environment>,
}

/// Effective name -> definition mapping of a module.
pub type Environment = HashMap<Name, Definition>;

impl Module {
    pub fn new(name: ModuleName, definitions: Vec<Definition>, metadata: Metadata) -> Self {
        let imported = Arc::new(Environment::new());
        let environment = Arc::new(layer(&imported, &definitions));
        Self {
            name,
            metadata,
            definitions,
            imports: Vec::new(),
            imported,
            environment,
        }
    }

    /// Local definitions in source order. Later entries shadow earlier ones.
    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    /// Directly imported modules in declared order.
    pub fn imports(&self) -> &[Arc<Module>] {
        &self.imports
    }

    /// Imports folded in declared order, then local definitions on top.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn lookup_name(&self, name: &Name) -> Option<&Definition> {
        self.environment.get(name)
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.lookup_name(name).is_some()
    }

    pub fn import_names(&self) -> impl Iterator<Item = &ModuleName> {
        self.imports.iter().map(|import| &import.name)
    }

    /// Every module reachable through imports, each once, depth-first in declared order.
    pub fn transitive_imports(&self) -> Vec<Arc<Module>> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        self.collect_imports(&mut seen, &mut ordered);
        ordered
    }

    fn collect_imports(&self, seen: &mut HashSet<ModuleName>, ordered: &mut Vec<Arc<Module>>) {
        for import in &self.imports {
            if seen.insert(import.name.clone()) {
                ordered.push(Arc::clone(import));
                import.collect_imports(seen, ordered);
            }
        }
    }

    /// References in local definitions that the environment cannot satisfy.
    pub fn unresolved_references(&self) -> Vec<&Name> {
        let mut missing: Vec<&Name> = self
            .definitions
            .iter()
            .flat_map(|definition| definition.ty.references())
            .filter(|name| !self.environment.contains_key(*name))
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

/// Return `importing` with `imported` appended to its imports.
///
/// Local definitions of `importing` keep priority over anything `imported`
/// brings in, and a later import wins over an earlier one.
pub fn import_module(imported: Arc<Module>, importing: &Module) -> Module {
    let mut imported_environment = Environment::clone(&importing.imported);
    imported_environment.extend(
        imported
            .environment()
            .iter()
            .map(|(name, definition)| (name.clone(), definition.clone())),
    );
    let environment = layer(&imported_environment, &importing.definitions);

    let mut imports = importing.imports.clone();
    imports.push(imported);
    Module {
        name: importing.name.clone(),
        metadata: importing.metadata.clone(),
        definitions: importing.definitions.clone(),
        imports,
        imported: Arc::new(imported_environment),
        environment: Arc::new(environment),
    }
}

fn layer(base: &Environment, definitions: &[Definition]) -> Environment {
    let mut environment = base.clone();
    for definition in definitions {
        environment.insert(definition.name.clone(), definition.clone());
    }
    environment
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (language-version: {}, avro-version: {})",
            self.module_name, self.language_version, self.target_version
        )
    }
}


//==================================================
// End of file
//==================================================
