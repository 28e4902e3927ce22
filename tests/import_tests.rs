//==============================================
// File: tests/import_tests.rs
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Exercise module resolution against fixture schemas
// Objective: Validate lookups, version gating, merge order and cycle detection
//==============================================

use std::path::PathBuf;
use std::sync::Arc;

use semver::Version;
use theta::types::{Field, Primitive};
use theta::versions::{TARGET_VERSIONS, VersionAxis};
use theta::{
    LoadPath, ModuleLoader, ModuleName, Name, ThetaError, Type, get_definition, get_module,
    import_module,
};

fn data_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn load_path() -> LoadPath {
    LoadPath::new([data_dir("modules")])
}

fn module_name(name: &str) -> ModuleName {
    ModuleName::parse(name).expect("valid module name")
}

#[test]
fn get_definition_returns_expected_type() {
    let definition = get_definition(&load_path(), "foo.Bar").expect("foo.Bar");
    let point = Name::parse("com.example.point.Point").unwrap();
    let expected = Type::Record(vec![
        Field {
            name: "point".into(),
            doc: None,
            ty: Type::Reference(point),
        },
        Field {
            name: "label".into(),
            doc: None,
            ty: Type::Optional(Box::new(Type::Primitive(Primitive::String))),
        },
    ]);
    assert_eq!(definition.ty, expected);
    assert_eq!(definition.doc.as_deref(), Some("A labelled point."));
}

#[test]
fn get_definition_missing_name() {
    match get_definition(&load_path(), "foo.NotInScope") {
        Err(ThetaError::MissingName(name)) => assert_eq!(name.to_string(), "foo.NotInScope"),
        other => panic!("expected MissingName, got {other:?}"),
    }
}

#[test]
fn get_definition_missing_module() {
    let load_path = load_path();
    match get_definition(&load_path, "notInScope.NotInScope") {
        Err(ThetaError::MissingModule {
            load_path: reported,
            module,
        }) => {
            assert_eq!(reported, load_path);
            assert_eq!(module, module_name("notInScope"));
        }
        other => panic!("expected MissingModule, got {other:?}"),
    }
}

#[test]
fn missing_transitive_import_names_the_import() {
    match get_definition(&load_path(), "imports_missing.Anything") {
        Err(ThetaError::MissingModule { module, .. }) => {
            assert_eq!(module, module_name("notInScope"))
        }
        other => panic!("expected MissingModule, got {other:?}"),
    }
}

#[test]
fn references_resolve_through_imports() {
    let foo = get_module(&load_path(), &module_name("foo")).expect("load foo");
    let Type::Record(fields) = &foo.lookup_name(&Name::parse("foo.Bar").unwrap()).unwrap().ty
    else {
        panic!("foo.Bar should be a record");
    };
    let Type::Reference(point) = &fields[0].ty else {
        panic!("first field should be a reference");
    };
    assert!(matches!(
        foo.lookup_name(point).map(|definition| &definition.ty),
        Some(Type::Record(_))
    ));
    assert!(foo.unresolved_references().is_empty());
}

#[test]
fn unsupported_target_version() {
    match get_module(&load_path(), &module_name("unsupported_avro_version")) {
        Err(ThetaError::UnsupportedVersion {
            metadata,
            axis,
            expected,
            actual,
        }) => {
            assert_eq!(metadata.module_name, module_name("unsupported_avro_version"));
            assert_eq!(axis, VersionAxis::Target);
            assert_eq!(expected, *TARGET_VERSIONS);
            assert_eq!(actual, Version::new(999, 0, 0));
            assert_eq!(actual.to_string(), "999.0.0");
        }
        other => panic!("expected UnsupportedVersion, got {other:?}"),
    }
}

#[test]
fn unsupported_language_version() {
    assert!(matches!(
        get_module(&load_path(), &module_name("unsupported_language_version")),
        Err(ThetaError::UnsupportedVersion {
            axis: VersionAxis::Language,
            ..
        })
    ));
}

#[test]
fn unsupported_import_fails_the_importer() {
    match get_module(&load_path(), &module_name("imports_unsupported")) {
        Err(ThetaError::UnsupportedVersion { metadata, .. }) => {
            assert_eq!(metadata.module_name, module_name("unsupported_avro_version"))
        }
        other => panic!("expected UnsupportedVersion, got {other:?}"),
    }
}

#[test]
fn supported_versions_load() {
    let foo = get_module(&load_path(), &module_name("foo")).expect("foo loads");
    assert_eq!(foo.metadata.language_version, Version::new(1, 0, 0));
    assert_eq!(foo.metadata.target_version, Version::new(1, 0, 0));
    assert_eq!(foo.metadata.module_name, module_name("foo"));
}

#[test]
fn cyclic_imports_are_reported() {
    match get_module(&load_path(), &module_name("cyclic_a")) {
        Err(ThetaError::CyclicImport { cycle }) => {
            assert_eq!(
                cycle,
                vec![
                    module_name("cyclic_a"),
                    module_name("cyclic_b"),
                    module_name("cyclic_a")
                ]
            );
        }
        other => panic!("expected CyclicImport, got {other:?}"),
    }
}

#[test]
fn import_module_adds_definitions() {
    let loader = ModuleLoader::new(load_path());
    let imported = loader.get_module(&module_name("imported")).unwrap();
    let importing = loader.get_module(&module_name("importing")).unwrap();
    let foo = Name::parse("imported.Foo").unwrap();

    assert!(!importing.environment().contains_key(&foo));
    let combined = import_module(Arc::clone(&imported), &importing);
    assert!(combined.environment().contains_key(&foo));
    assert!(combined.import_names().any(|name| name == &imported.name));
}

#[test]
fn earlier_root_shadows_later_root() {
    let load_path = LoadPath::new([data_dir("override"), data_dir("modules")]);
    let definition = get_definition(&load_path, "foo.Bar").expect("foo.Bar");
    assert_eq!(definition.ty, Type::Primitive(Primitive::Long));
}

#[test]
fn lists_fixture_modules() {
    let modules = load_path().list_modules().expect("list modules");
    assert!(modules.contains(&module_name("com.example.point")));
    assert!(modules.contains(&module_name("foo")));
    assert!(modules.windows(2).all(|pair| pair[0] < pair[1]));
}

//==============================================
// End of file
//==============================================
