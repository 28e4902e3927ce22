//==================================================
// File: modules/mod.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Recursive import resolution for Theta modules
// Objective: Load a module, gate its versions, resolve and merge its imports
//==================================================

use crate::error::{Result, ThetaError};
use crate::load_path::LoadPath;
use crate::name::ModuleName;
use crate::parser::{ModuleParser, ThetaParser};
use crate::types::{Metadata, Module, import_module};
use crate::versions::SupportedVersions;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Loads modules from a load path and resolves their imports.
///
/// Fully resolved modules are cached by canonical source path. The cache is
/// append-only and every key always maps to an equal module, so concurrent
/// resolutions through one loader may race on an entry without harm.
pub struct ModuleLoader {
    load_path: LoadPath,
    versions: SupportedVersions,
    parser: Box<dyn ModuleParser>,
    cache: RwLock<HashMap<PathBuf, Arc<Module>>>,
}

impl fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("load_path", &self.load_path)
            .field("versions", &self.versions)
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

impl ModuleLoader {
    pub fn new(load_path: LoadPath) -> Self {
        Self::with_versions(load_path, SupportedVersions::default())
    }

    pub fn with_versions(load_path: LoadPath, versions: SupportedVersions) -> Self {
        Self::with_parser(load_path, versions, ThetaParser)
    }

    pub fn with_parser<P>(load_path: LoadPath, versions: SupportedVersions, parser: P) -> Self
    where
        P: ModuleParser + 'static,
    {
        Self {
            load_path,
            versions,
            parser: Box::new(parser),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn load_path(&self) -> &LoadPath {
        &self.load_path
    }

    pub fn versions(&self) -> &SupportedVersions {
        &self.versions
    }

    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    pub fn cached_modules(&self) -> usize {
        self.cache.read().len()
    }

    /// Resolve `name` and everything it imports.
    ///
    /// Fails fast: the first missing module, unsupported version, parse error
    /// or import cycle aborts the whole resolution.
    pub fn get_module(&self, name: &ModuleName) -> Result<Arc<Module>> {
        let mut resolution = Resolution::default();
        self.resolve(name, &mut resolution)
    }

    fn resolve(&self, name: &ModuleName, resolution: &mut Resolution) -> Result<Arc<Module>> {
        if resolution.in_progress.contains(name) {
            return Err(resolution.cycle_error(name));
        }

        let path = self.load_path.find(name)?;
        let key = canonical_path(&path);
        if let Some(cached) = self.cache.read().get(&key) {
            trace!(module = %name, "cache hit");
            return Ok(Arc::clone(cached));
        }

        let source = fs::read_to_string(&path).map_err(|error| ThetaError::io(&path, error))?;
        let raw = self
            .parser
            .parse(name, &source)
            .map_err(|error| ThetaError::Parse {
                path: path.clone(),
                error,
            })?;
        debug!(module = %name, path = %path.display(), "parsed module");

        let metadata = Metadata {
            language_version: raw.header.language_version,
            target_version: raw.header.target_version,
            module_name: name.clone(),
        };
        self.versions.check(&metadata)?;

        let mut module = Module::new(name.clone(), raw.definitions, metadata);
        warn_on_local_shadowing(&module);

        resolution.enter(name);
        for import in &raw.imports {
            trace!(module = %name, import = %import, "resolving import");
            let imported = self.resolve(import, resolution)?;
            module = import_module(imported, &module);
        }
        resolution.leave();

        let module = Arc::new(module);
        let mut cache = self.cache.write();
        let entry = cache.entry(key).or_insert(module);
        Ok(Arc::clone(entry))
    }
}

/// Recursion state for one top-level `get_module` call.
#[derive(Default)]
struct Resolution {
    stack: Vec<ModuleName>,
    in_progress: HashSet<ModuleName>,
}

impl Resolution {
    fn enter(&mut self, name: &ModuleName) {
        self.stack.push(name.clone());
        self.in_progress.insert(name.clone());
    }

    fn leave(&mut self) {
        if let Some(name) = self.stack.pop() {
            self.in_progress.remove(&name);
        }
    }

    /// The cycle from the first visit of `name` back to `name`.
    fn cycle_error(&self, name: &ModuleName) -> ThetaError {
        let start = self
            .stack
            .iter()
            .position(|entry| entry == name)
            .unwrap_or(0);
        let mut cycle = self.stack[start..].to_vec();
        cycle.push(name.clone());
        ThetaError::CyclicImport { cycle }
    }
}

fn canonical_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn warn_on_local_shadowing(module: &Module) {
    let mut seen = HashSet::new();
    for definition in module.definitions() {
        if !seen.insert(&definition.name) {
            warn!(
                module = %module.name,
                name = %definition.name,
                "definition shadows an earlier definition with the same name"
            );
        }
    }
}

/// Resolve `name` with default version ranges and a fresh cache.
pub fn get_module(load_path: &LoadPath, name: &ModuleName) -> Result<Arc<Module>> {
    ModuleLoader::new(load_path.clone()).get_module(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::Name;
    use crate::parser::{Header, ParseError, RawModule};
    use crate::types::{Primitive, Type};
    use semver::Version;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const HEADER: &str = "language-version: 1.0.0\navro-version: 1.0.0\n---\n";

    fn write_module(root: &Path, name: &str, body: &str) {
        let path = root.join(ModuleName::parse(name).unwrap().to_path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, format!("{HEADER}{body}")).unwrap();
    }

    fn module_name(name: &str) -> ModuleName {
        ModuleName::parse(name).unwrap()
    }

    #[test]
    fn resolves_transitive_imports() {
        let root = tempfile::tempdir().expect("create temp dir");
        write_module(root.path(), "base", "type Id = Long\n");
        write_module(root.path(), "com.middle", "import base\ntype Pair = [base.Id]\n");
        write_module(root.path(), "top", "import com.middle\n");

        let loader = ModuleLoader::new(LoadPath::new([root.path()]));
        let top = loader.get_module(&module_name("top")).expect("resolve top");

        let id = Name::parse("base.Id").unwrap();
        assert_eq!(
            top.lookup_name(&id).map(|d| &d.ty),
            Some(&Type::Primitive(Primitive::Long))
        );
        assert!(top.environment().contains_key(&Name::parse("com.middle.Pair").unwrap()));
        assert_eq!(top.imports().len(), 1);
        assert_eq!(top.imports()[0].imports()[0].name, module_name("base"));
    }

    #[test]
    fn names_from_distinct_modules_do_not_collide() {
        let root = tempfile::tempdir().unwrap();
        write_module(root.path(), "shadowed", "type Foo = Int\n");
        write_module(root.path(), "shadowing", "type Foo = Long\n");
        write_module(root.path(), "first", "import shadowed\nimport shadowing\n");
        write_module(root.path(), "second", "import shadowing\nimport shadowed\n");

        let loader = ModuleLoader::new(LoadPath::new([root.path()]));
        let first = loader.get_module(&module_name("first")).unwrap();
        let second = loader.get_module(&module_name("second")).unwrap();
        for qualified in ["shadowed.Foo", "shadowing.Foo"] {
            let name = Name::parse(qualified).unwrap();
            assert!(first.contains(&name));
            assert!(second.contains(&name));
        }
        assert_eq!(first.environment(), second.environment());
    }

    #[test]
    fn detects_import_cycles() {
        let root = tempfile::tempdir().unwrap();
        write_module(root.path(), "a", "import b\n");
        write_module(root.path(), "b", "import c\n");
        write_module(root.path(), "c", "import b\n");

        let loader = ModuleLoader::new(LoadPath::new([root.path()]));
        match loader.get_module(&module_name("a")) {
            Err(ThetaError::CyclicImport { cycle }) => {
                let names: Vec<String> = cycle.iter().map(ToString::to_string).collect();
                assert_eq!(names, vec!["b", "c", "b"]);
            }
            other => panic!("expected CyclicImport, got {other:?}"),
        }
    }

    #[test]
    fn self_import_is_a_cycle() {
        let root = tempfile::tempdir().unwrap();
        write_module(root.path(), "selfish", "import selfish\n");
        let loader = ModuleLoader::new(LoadPath::new([root.path()]));
        assert!(matches!(
            loader.get_module(&module_name("selfish")),
            Err(ThetaError::CyclicImport { .. })
        ));
    }

    #[test]
    fn diamond_imports_are_not_cycles() {
        let root = tempfile::tempdir().unwrap();
        write_module(root.path(), "base", "type Id = Long\n");
        write_module(root.path(), "left", "import base\n");
        write_module(root.path(), "right", "import base\n");
        write_module(root.path(), "top", "import left\nimport right\n");

        let loader = ModuleLoader::new(LoadPath::new([root.path()]));
        let top = loader.get_module(&module_name("top")).expect("diamond resolves");
        assert_eq!(top.transitive_imports().len(), 3);
        assert!(Arc::ptr_eq(
            &top.imports()[0].imports()[0],
            &top.imports()[1].imports()[0]
        ));
    }

    #[test]
    fn deep_diamond_layers_resolve_without_refolding() {
        const LAYERS: usize = 32;
        let root = tempfile::tempdir().unwrap();
        for layer in 0..LAYERS {
            let imports = if layer + 1 < LAYERS {
                format!("import l{next}a\nimport l{next}b\n", next = layer + 1)
            } else {
                String::new()
            };
            for side in ["a", "b"] {
                write_module(
                    root.path(),
                    &format!("l{layer}{side}"),
                    &format!("{imports}type T{side} = Int\n"),
                );
            }
        }
        write_module(root.path(), "top", "import l0a\nimport l0b\n");

        let loader = ModuleLoader::new(LoadPath::new([root.path()]));
        let top = loader.get_module(&module_name("top")).expect("resolve layered diamond");
        assert_eq!(top.environment().len(), LAYERS * 2);
        assert_eq!(top.transitive_imports().len(), LAYERS * 2);

        let deepest = Name::parse(&format!("l{}b.Tb", LAYERS - 1)).unwrap();
        assert!(top.contains(&deepest));
        assert!(top.lookup_name(&Name::parse("top.Missing").unwrap()).is_none());
        assert!(top.unresolved_references().is_empty());
    }

    #[test]
    fn missing_import_reports_the_import() {
        let root = tempfile::tempdir().unwrap();
        write_module(root.path(), "top", "import gone\n");
        let loader = ModuleLoader::new(LoadPath::new([root.path()]));
        match loader.get_module(&module_name("top")) {
            Err(ThetaError::MissingModule { module, .. }) => assert_eq!(module, module_name("gone")),
            other => panic!("expected MissingModule, got {other:?}"),
        }
    }

    #[test]
    fn version_gate_runs_before_imports() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("old.theta");
        fs::write(&path, "language-version: 1.0.0\navro-version: 0.1.0\n---\nimport gone\n").unwrap();
        let loader = ModuleLoader::new(LoadPath::new([root.path()]));
        assert!(matches!(
            loader.get_module(&module_name("old")),
            Err(ThetaError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn parse_errors_carry_the_file() {
        let root = tempfile::tempdir().unwrap();
        write_module(root.path(), "broken", "type = Int\n");
        let loader = ModuleLoader::new(LoadPath::new([root.path()]));
        match loader.get_module(&module_name("broken")) {
            Err(ThetaError::Parse { path, .. }) => assert!(path.ends_with("broken.theta")),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    struct CountingParser {
        calls: Arc<AtomicUsize>,
    }

    impl ModuleParser for CountingParser {
        fn parse(&self, _module: &ModuleName, source: &str) -> Result<RawModule, ParseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let imports = source
                .lines()
                .filter_map(|line| line.strip_prefix("import "))
                .map(|name| ModuleName::parse(name.trim()).expect("import name"))
                .collect();
            Ok(RawModule {
                header: Header {
                    language_version: Version::new(1, 0, 0),
                    target_version: Version::new(1, 0, 0),
                },
                imports,
                definitions: Vec::new(),
            })
        }
    }

    #[test]
    fn shared_imports_are_parsed_once_per_loader() {
        let root = tempfile::tempdir().unwrap();
        for (name, body) in [("base", ""), ("left", "import base"), ("right", "import base")] {
            fs::write(root.path().join(format!("{name}.theta")), body).unwrap();
        }
        fs::write(root.path().join("top.theta"), "import left\nimport right\n").unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let loader = ModuleLoader::with_parser(
            LoadPath::new([root.path()]),
            SupportedVersions::default(),
            CountingParser {
                calls: Arc::clone(&calls),
            },
        );
        loader.get_module(&module_name("top")).unwrap();
        loader.get_module(&module_name("left")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(loader.cached_modules(), 4);

        loader.clear_cache();
        loader.get_module(&module_name("base")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn concurrent_resolutions_share_one_loader() {
        let root = tempfile::tempdir().unwrap();
        write_module(root.path(), "base", "type Id = Long\n");
        write_module(root.path(), "top", "import base\n");
        let loader = Arc::new(ModuleLoader::new(LoadPath::new([root.path()])));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let loader = Arc::clone(&loader);
                std::thread::spawn(move || loader.get_module(&module_name("top")).map(|m| m.name.clone()))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), module_name("top"));
        }
        assert_eq!(loader.cached_modules(), 2);
    }
}

//==================================================
// End of file
//==================================================
