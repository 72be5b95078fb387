//! Source-level type declarations handed to the backend.
//!
//! These mirror what the front end produces after type checking: every type
//! reference is already resolved to a primitive name, a sum type name, or a
//! generic parameter of the enclosing declaration.

use serde::{Deserialize, Serialize};

/// One compilation unit worth of declarations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitDecl {
    /// `::`-separated package path, e.g. `c::main`.
    pub package: String,
    /// Headers to include after the boolean shim.
    #[serde(default)]
    pub includes: Vec<String>,
    /// Definitions already present in the target unit before lowering.
    #[serde(default)]
    pub existing: Vec<ExistingDefinition>,
    /// Sum types in source declaration order.
    #[serde(default)]
    pub types: Vec<SumTypeDecl>,
    /// Concrete instances of generic sum types, in emission order.
    #[serde(default)]
    pub instances: Vec<Instantiation>,
}

impl UnitDecl {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, decl: SumTypeDecl) -> Self {
        self.types.push(decl);
        self
    }

    pub fn with_instance(mut self, instance: Instantiation) -> Self {
        self.instances.push(instance);
        self
    }

    pub fn with_include(mut self, header: impl Into<String>) -> Self {
        self.includes.push(header.into());
        self
    }

    pub fn with_existing(mut self, existing: ExistingDefinition) -> Self {
        self.existing.push(existing);
        self
    }

    /// Find a declared sum type by its source name.
    pub fn find_type(&self, name: &str) -> Option<&SumTypeDecl> {
        self.types.iter().find(|decl| decl.name == name)
    }
}

/// A sum type declaration: `type Name[T, ...] = A(..) | B(..) | ...`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SumTypeDecl {
    pub name: String,
    #[serde(default)]
    pub generics: Vec<String>,
    pub variants: Vec<VariantDecl>,
}

impl SumTypeDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generics: Vec::new(),
            variants: Vec::new(),
        }
    }

    pub fn generic(mut self, param: impl Into<String>) -> Self {
        self.generics.push(param.into());
        self
    }

    pub fn variant(mut self, name: impl Into<String>, payload: Vec<TypeRef>) -> Self {
        self.variants.push(VariantDecl {
            name: name.into(),
            payload,
        });
        self
    }

    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantDecl {
    pub name: String,
    #[serde(default)]
    pub payload: Vec<TypeRef>,
}

/// A resolved reference to a payload type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// A primitive from the `core.basic_types` table, e.g. `Int32`.
    Primitive(String),
    /// Another sum type of this unit, optionally instantiated.
    Sum {
        name: String,
        #[serde(default)]
        args: Vec<TypeRef>,
    },
    /// A generic parameter of the enclosing declaration.
    Generic(String),
}

impl TypeRef {
    pub fn primitive(name: impl Into<String>) -> Self {
        TypeRef::Primitive(name.into())
    }

    pub fn sum(name: impl Into<String>) -> Self {
        TypeRef::Sum {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>) -> Self {
        TypeRef::Generic(name.into())
    }
}

/// `Name[Arg, ...]` requested for emission.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Instantiation {
    pub ty: String,
    pub args: Vec<TypeRef>,
}

impl Instantiation {
    pub fn new(ty: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            ty: ty.into(),
            args,
        }
    }
}

/// A definition the target unit already carries (e.g. from a hand-written
/// preamble). Only consulted for conflict detection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExistingDefinition {
    /// `#define name value`
    Define { name: String, value: String },
    /// `typedef target name;`
    Typedef { name: String, target: String },
}

impl ExistingDefinition {
    pub fn name(&self) -> &str {
        match self {
            ExistingDefinition::Define { name, .. } | ExistingDefinition::Typedef { name, .. } => {
                name
            }
        }
    }
}
