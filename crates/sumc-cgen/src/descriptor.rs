//! Resolved sum type descriptors.
//!
//! Descriptors are produced once per lowering from the source declarations
//! and never change afterwards. Everything downstream (encoding, constructor
//! emission, tag tables) reads them.

use derive_more::Display;
use serde::Serialize;

use crate::primitive::PrimitiveType;

/// Discriminant of a variant within its sum type.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, salsa::Update)]
#[serde(transparent)]
pub struct Tag(pub u32);

/// C type of a sum type's tag field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagRepr {
    /// Two-variant types reuse the boolean encoding: variant 0 is `false`,
    /// variant 1 is `true`.
    Bool,
    /// Narrowest unsigned primitive that holds every tag.
    Unsigned(PrimitiveType),
}

impl TagRepr {
    pub fn for_variant_count(count: usize) -> Self {
        if count == 2 {
            TagRepr::Bool
        } else {
            TagRepr::Unsigned(PrimitiveType::unsigned_for(count))
        }
    }

    pub fn c_type(&self) -> String {
        match self {
            TagRepr::Bool => "bool".to_string(),
            TagRepr::Unsigned(ty) => ty.c_name(),
        }
    }

    /// C literal of a tag value in this representation.
    pub fn literal(&self, tag: Tag) -> String {
        match (self, tag.0) {
            (TagRepr::Bool, 0) => "false".to_string(),
            (TagRepr::Bool, _) => "true".to_string(),
            (TagRepr::Unsigned(_), value) => value.to_string(),
        }
    }
}

/// A fully resolved payload type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoweredType {
    Primitive(PrimitiveType),
    /// A sum type lowered earlier in the same unit.
    Sum {
        /// Unqualified instance name, e.g. `Option_Int32`.
        short_name: String,
        /// Qualified C name, e.g. `c_main_Option_Int32`.
        c_name: String,
    },
}

impl LoweredType {
    pub fn c_name(&self) -> String {
        match self {
            LoweredType::Primitive(ty) => ty.c_name(),
            LoweredType::Sum { c_name, .. } => c_name.clone(),
        }
    }

    /// Name used when this type appears as a generic argument.
    pub fn short_name(&self) -> &str {
        match self {
            LoweredType::Primitive(ty) => ty.name(),
            LoweredType::Sum { short_name, .. } => short_name,
        }
    }
}

impl std::fmt::Display for LoweredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantDescriptor {
    pub name: String,
    pub tag: Tag,
    pub payload: Vec<LoweredType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SumTypeDescriptor {
    /// Name of the declaration in source, without type arguments.
    pub source_name: String,
    /// Instance name, e.g. `Option_Int32`; equal to `source_name` for
    /// non-generic types.
    pub short_name: String,
    pub c_name: String,
    pub tag_repr: TagRepr,
    pub variants: Vec<VariantDescriptor>,
}

impl SumTypeDescriptor {
    pub fn variant(&self, name: &str) -> Option<&VariantDescriptor> {
        self.variants.iter().find(|variant| variant.name == name)
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.variants.iter().map(|variant| variant.tag)
    }

    pub fn as_type(&self) -> LoweredType {
        LoweredType::Sum {
            short_name: self.short_name.clone(),
            c_name: self.c_name.clone(),
        }
    }
}
