//! In-memory model of one emitted C translation unit.

use std::fmt::Write;
use std::sync::OnceLock;

use sumc_core::{CDialect, ExistingDefinition};

use crate::shim::BoolShim;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CItem {
    /// `#include <header>`
    SystemInclude(String),
    /// `#include "header"`
    Include(String),
    /// `#define name value`
    Define { name: String, value: String },
    /// `typedef target name;`
    Typedef { name: String, target: String },
    Struct(CStruct),
    Function(CFunction),
}

impl CItem {
    fn group(&self) -> u8 {
        match self {
            CItem::SystemInclude(_) | CItem::Include(_) => 0,
            CItem::Define { .. } => 1,
            CItem::Typedef { .. } => 2,
            CItem::Struct(_) => 3,
            CItem::Function(_) => 4,
        }
    }

    fn render(&self, out: &mut String) -> std::fmt::Result {
        match self {
            CItem::SystemInclude(header) => writeln!(out, "#include <{header}>"),
            CItem::Include(header) => writeln!(out, "#include \"{header}\""),
            CItem::Define { name, value } => writeln!(out, "#define {name} {value}"),
            CItem::Typedef { name, target } => writeln!(out, "typedef {target} {name};"),
            CItem::Struct(def) => def.render(out),
            CItem::Function(def) => def.render(out),
        }
    }
}

/// `typedef struct { ... } name;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CStruct {
    pub name: String,
    pub fields: Vec<CField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CField {
    pub name: String,
    pub ty: String,
}

impl CStruct {
    fn render(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "typedef struct {{")?;
        for field in &self.fields {
            writeln!(out, "    {} {};", field.ty, field.name)?;
        }
        writeln!(out, "}} {};", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CFunction {
    pub name: String,
    pub return_type: String,
    pub params: Vec<CField>,
    /// Statements, one per line, without indentation.
    pub body: Vec<String>,
}

impl CFunction {
    pub fn signature(&self) -> String {
        let params = if self.params.is_empty() {
            "void".to_string()
        } else {
            self.params
                .iter()
                .map(|param| format!("{} {}", param.ty, param.name))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("{} {}({})", self.return_type, self.name, params)
    }

    fn render(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "{} {{", self.signature())?;
        for line in &self.body {
            writeln!(out, "    {line}")?;
        }
        writeln!(out, "}}")
    }
}

/// A C translation unit under construction.
///
/// The boolean shim lives in a define-once cell so that it can be applied
/// through a shared reference, any number of times, from any thread.
#[derive(Debug)]
pub struct CUnit {
    dialect: CDialect,
    guard: String,
    existing: Vec<ExistingDefinition>,
    pub(crate) bool_shim: OnceLock<BoolShim>,
    items: Vec<CItem>,
}

impl CUnit {
    pub fn new(dialect: CDialect, guard: impl Into<String>) -> Self {
        Self {
            dialect,
            guard: guard.into(),
            existing: Vec::new(),
            bool_shim: OnceLock::new(),
            items: Vec::new(),
        }
    }

    pub fn with_existing(mut self, existing: impl IntoIterator<Item = ExistingDefinition>) -> Self {
        self.existing.extend(existing);
        self
    }

    pub fn dialect(&self) -> CDialect {
        self.dialect
    }

    pub fn guard(&self) -> &str {
        &self.guard
    }

    pub fn existing(&self) -> &[ExistingDefinition] {
        &self.existing
    }

    pub fn items(&self) -> &[CItem] {
        &self.items
    }

    pub fn push(&mut self, item: CItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = CItem>) {
        self.items.extend(items);
    }

    /// Render the unit: shim first, then items in insertion order, with a
    /// blank line between groups of different kinds and around every struct
    /// and function.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) -> std::fmt::Result {
        if let Some(shim) = self.bool_shim.get() {
            shim.render(out)?;
            if !self.items.is_empty() {
                out.push('\n');
            }
        }
        let mut previous: Option<u8> = None;
        for item in &self.items {
            let group = item.group();
            if let Some(prev) = previous
                && (prev != group || group >= 3)
            {
                out.push('\n');
            }
            item.render(out)?;
            previous = Some(group);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_groups() {
        let mut unit = CUnit::new(CDialect::C99, "T_BOOLEANS_DEFINED");
        unit.push(CItem::Include("stdio.h".into()));
        unit.push(CItem::Define {
            name: "A".into(),
            value: "0".into(),
        });
        unit.push(CItem::Define {
            name: "B".into(),
            value: "1".into(),
        });
        unit.push(CItem::Struct(CStruct {
            name: "pair".into(),
            fields: vec![CField {
                name: "kind".into(),
                ty: "bool".into(),
            }],
        }));
        unit.push(CItem::Function(CFunction {
            name: "make".into(),
            return_type: "pair".into(),
            params: vec![],
            body: vec!["pair result = { .kind = A };".into(), "return result;".into()],
        }));

        let expected = "\
#include \"stdio.h\"

#define A 0
#define B 1

typedef struct {
    bool kind;
} pair;

pair make(void) {
    pair result = { .kind = A };
    return result;
}
";
        assert_eq!(unit.render(), expected);
    }

    #[test]
    fn test_signature_with_params() {
        let function = CFunction {
            name: "f".into(),
            return_type: "int".into(),
            params: vec![
                CField {
                    name: "v0".into(),
                    ty: "int".into(),
                },
                CField {
                    name: "v1".into(),
                    ty: "long".into(),
                },
            ],
            body: vec![],
        };
        assert_eq!(function.signature(), "int f(int v0, long v1)");
    }
}
