//==================================================
// File: pretty/mod.rs
//==================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Human-readable rendering of modules and types
// Objective: Print definitions back in .theta syntax for diagnostics and the CLI
//==================================================

use crate::name::{ModuleName, Name};
use crate::types::{Case, Definition, Field, Module, Type};
use std::fmt::{self, Write};

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(primitive) => f.write_str(primitive.keyword()),
            Type::Array(item) => write!(f, "[{}]", item),
            Type::Map(value) => write!(f, "{{{}}}", value),
            Type::Optional(inner) => write!(f, "{}?", inner),
            Type::Reference(name) => write!(f, "{}", name),
            Type::Record(fields) => write_fields(f, fields, 0),
            Type::Variant(cases) => {
                for (index, case) in cases.iter().enumerate() {
                    if index > 0 {
                        f.write_str("\n  | ")?;
                    }
                    write_case(f, case)?;
                }
                Ok(())
            }
            Type::Enum(symbols) => {
                for (index, symbol) in symbols.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" | ")?;
                    }
                    write_inline_doc(f, &symbol.doc)?;
                    f.write_str(&symbol.name)?;
                }
                Ok(())
            }
            Type::Newtype(inner) => write!(f, "{}", inner),
        }
    }
}

fn write_doc(f: &mut impl Write, doc: &Option<String>, indent: usize) -> fmt::Result {
    let Some(doc) = doc else {
        return Ok(());
    };
    let pad = " ".repeat(indent);
    if doc.contains('\n') {
        writeln!(f, "{pad}/**")?;
        for line in doc.lines() {
            writeln!(f, "{pad} * {line}")?;
        }
        writeln!(f, "{pad} */")
    } else {
        writeln!(f, "{pad}/** {doc} */")
    }
}

/// Doc placed in front of an enum symbol or variant case on the same line.
fn write_inline_doc(f: &mut impl Write, doc: &Option<String>) -> fmt::Result {
    match doc {
        None => Ok(()),
        Some(doc) if doc.contains('\n') => {
            f.write_str("/**\n")?;
            for line in doc.lines() {
                writeln!(f, " * {line}")?;
            }
            f.write_str(" */ ")
        }
        Some(doc) => write!(f, "/** {doc} */ "),
    }
}

fn write_fields(f: &mut impl Write, fields: &[Field], indent: usize) -> fmt::Result {
    if fields.is_empty() {
        return f.write_str("{}");
    }
    f.write_str("{\n")?;
    let pad = " ".repeat(indent + 4);
    for field in fields {
        write_doc(f, &field.doc, indent + 4)?;
        writeln!(f, "{pad}{} : {},", field.name, field.ty)?;
    }
    write!(f, "{}}}", " ".repeat(indent))
}

fn write_case(f: &mut impl Write, case: &Case) -> fmt::Result {
    write_inline_doc(f, &case.doc)?;
    write!(f, "{} ", case.name.name)?;
    write_fields(f, &case.fields, 2)
}

/// Render a reference relative to `module`: local names lose their qualifier.
fn relative(name: &Name, module: &ModuleName) -> String {
    if &name.module == module {
        name.name.clone()
    } else {
        name.to_string()
    }
}

fn keyword(ty: &Type) -> &'static str {
    match ty {
        Type::Enum(_) => "enum",
        Type::Newtype(_) => "newtype",
        _ => "type",
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_doc(f, &self.doc, 0)?;
        write!(f, "{} {} = {}", keyword(&self.ty), self.name, self.ty)
    }
}

/// Render a definition as it would appear inside its own module's source.
pub fn definition(definition: &Definition) -> String {
    let mut out = String::new();
    let _ = write_doc(&mut out, &definition.doc, 0);
    let _ = write!(
        out,
        "{} {} = {}",
        keyword(&definition.ty),
        relative(&definition.name, &definition.name.module),
        definition.ty
    );
    out
}

/// Render the header, imports and local definitions of `module` in .theta syntax.
pub fn module(module: &Module) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "language-version: {}", module.metadata.language_version);
    let _ = writeln!(out, "avro-version: {}", module.metadata.target_version);
    out.push_str("---\n");
    if !module.imports().is_empty() {
        out.push('\n');
        for import in module.import_names() {
            let _ = writeln!(out, "import {}", import);
        }
    }
    for local in module.definitions() {
        out.push('\n');
        out.push_str(&definition(local));
        out.push('\n');
    }
    out
}


//==================================================
// End of file
//==================================================
