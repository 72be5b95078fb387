//! The `core.basic_types` primitive type table.
//!
//! Every primitive has a fixed width and signedness, a canonical C
//! declaration name, and a C spelling that depends on the dialect. The
//! language-default aliases `Integer` and `UInteger` keep their own nominal
//! entries even though they share the representation of `Int32`/`UInt32`.

use std::str::FromStr;

use derive_more::Display;
use sumc_core::{CDialect, DataModel};

use crate::errors::{LoweringError, LoweringResult};
use crate::naming;

/// Package that owns the primitive types.
pub const CORE_PACKAGE: &str = "core::basic_types";

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Integer,
    UInteger,
}

impl PrimitiveType {
    /// All entries in canonical emission order: concrete types first, then
    /// aliases (an alias must follow the type it names).
    pub const ALL: [PrimitiveType; 11] = [
        PrimitiveType::Bool,
        PrimitiveType::Int8,
        PrimitiveType::Int16,
        PrimitiveType::Int32,
        PrimitiveType::Int64,
        PrimitiveType::UInt8,
        PrimitiveType::UInt16,
        PrimitiveType::UInt32,
        PrimitiveType::UInt64,
        PrimitiveType::Integer,
        PrimitiveType::UInteger,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "Bool",
            PrimitiveType::Int8 => "Int8",
            PrimitiveType::Int16 => "Int16",
            PrimitiveType::Int32 => "Int32",
            PrimitiveType::Int64 => "Int64",
            PrimitiveType::UInt8 => "UInt8",
            PrimitiveType::UInt16 => "UInt16",
            PrimitiveType::UInt32 => "UInt32",
            PrimitiveType::UInt64 => "UInt64",
            PrimitiveType::Integer => "Integer",
            PrimitiveType::UInteger => "UInteger",
        }
    }

    /// The type this one is a nominal alias of, if any.
    pub fn alias_of(self) -> Option<PrimitiveType> {
        match self {
            PrimitiveType::Integer => Some(PrimitiveType::Int32),
            PrimitiveType::UInteger => Some(PrimitiveType::UInt32),
            _ => None,
        }
    }

    /// The concrete type sharing this type's representation.
    pub fn representation(self) -> PrimitiveType {
        self.alias_of().unwrap_or(self)
    }

    pub fn bit_width(self) -> u8 {
        match self {
            PrimitiveType::Bool => 1,
            PrimitiveType::Int8 | PrimitiveType::UInt8 => 8,
            PrimitiveType::Int16 | PrimitiveType::UInt16 => 16,
            PrimitiveType::Int32
            | PrimitiveType::UInt32
            | PrimitiveType::Integer
            | PrimitiveType::UInteger => 32,
            PrimitiveType::Int64 | PrimitiveType::UInt64 => 64,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self.representation(),
            PrimitiveType::Int8 | PrimitiveType::Int16 | PrimitiveType::Int32 | PrimitiveType::Int64
        )
    }

    pub fn is_integer(self) -> bool {
        self.representation() != PrimitiveType::Bool
    }

    /// Canonical C declaration name, e.g. `core_basic_types_Int32`.
    pub fn c_name(self) -> String {
        naming::qualified(CORE_PACKAGE, self.name())
    }

    /// The unsigned integer type used for tags of a sum type with
    /// `variant_count` variants (more than two).
    pub fn unsigned_for(variant_count: usize) -> PrimitiveType {
        let max_tag = variant_count.saturating_sub(1) as u64;
        if max_tag <= u64::from(u8::MAX) {
            PrimitiveType::UInt8
        } else if max_tag <= u64::from(u16::MAX) {
            PrimitiveType::UInt16
        } else {
            PrimitiveType::UInt32
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = LoweringError;

    fn from_str(s: &str) -> LoweringResult<Self> {
        PrimitiveType::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| LoweringError::unknown_primitive(s))
    }
}

/// Primitive table bound to a dialect and data model.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveTable {
    dialect: CDialect,
    data_model: DataModel,
}

impl PrimitiveTable {
    pub fn new(dialect: CDialect, data_model: DataModel) -> Self {
        Self {
            dialect,
            data_model,
        }
    }

    pub fn lookup(&self, name: &str) -> LoweringResult<PrimitiveType> {
        name.parse()
    }

    /// Whether the spellings need `<stdint.h>`.
    pub fn needs_stdint(&self) -> bool {
        self.dialect.has_stdint()
    }

    /// The C type a primitive's declaration refers to: the builtin spelling
    /// for concrete integers, the aliased declaration for aliases, and
    /// `bool` for the boolean primitive.
    pub fn c_spelling(&self, ty: PrimitiveType) -> String {
        if let Some(target) = ty.alias_of() {
            return target.c_name();
        }
        if ty == PrimitiveType::Bool {
            return "bool".to_string();
        }
        if self.dialect.has_stdint() {
            let sign = if ty.is_signed() { "" } else { "u" };
            return format!("{sign}int{}_t", ty.bit_width());
        }
        let base = match ty.bit_width() {
            8 => "char",
            16 => "short int",
            32 => "int",
            _ if self.data_model.long_width() == 64 => "long int",
            _ => "long long int",
        };
        let sign = if ty.is_signed() { "signed" } else { "unsigned" };
        format!("{sign} {base}")
    }

    /// Integer literal suffix giving a constant the width of `ty`. 64-bit
    /// literals use `L` exactly where [`Self::c_spelling`] picks `long int`.
    pub fn literal_suffix(&self, ty: PrimitiveType) -> &'static str {
        let long_is_64 = !self.dialect.has_stdint() && self.data_model.long_width() == 64;
        match (ty.bit_width(), ty.is_signed()) {
            (64, true) if long_is_64 => "L",
            (64, false) if long_is_64 => "UL",
            (64, true) => "LL",
            (64, false) => "ULL",
            (32, false) => "u",
            _ => "",
        }
    }

    /// `typedef <spelling> <canonical name>;` for every integer primitive,
    /// in canonical order. `Bool` is declared by the boolean wrapper instead.
    pub fn typedefs(&self) -> Vec<(String, String)> {
        PrimitiveType::ALL
            .into_iter()
            .filter(|ty| ty.is_integer())
            .map(|ty| (ty.c_name(), self.c_spelling(ty)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LoweringErrorKind;

    #[test]
    fn test_widths_and_signedness() {
        assert_eq!(PrimitiveType::Bool.bit_width(), 1);
        assert_eq!(PrimitiveType::Int16.bit_width(), 16);
        assert_eq!(PrimitiveType::UInt64.bit_width(), 64);
        assert_eq!(PrimitiveType::Integer.bit_width(), 32);
        assert!(PrimitiveType::Integer.is_signed());
        assert!(!PrimitiveType::UInteger.is_signed());
        assert!(!PrimitiveType::Bool.is_signed());
    }

    #[test]
    fn test_aliases_are_distinct_nominal_types() {
        assert_ne!(PrimitiveType::Integer, PrimitiveType::Int32);
        assert_eq!(PrimitiveType::Integer.representation(), PrimitiveType::Int32);
        assert_eq!(PrimitiveType::Integer.c_name(), "core_basic_types_Integer");

        let table = PrimitiveTable::new(CDialect::C99, DataModel::Lp64);
        assert_eq!(
            table.c_spelling(PrimitiveType::Integer),
            "core_basic_types_Int32"
        );
        assert_eq!(
            table.c_spelling(PrimitiveType::UInteger),
            "core_basic_types_UInt32"
        );
    }

    #[test]
    fn test_lookup() {
        let table = PrimitiveTable::new(CDialect::Auto, DataModel::Lp64);
        assert_eq!(table.lookup("UInt16").unwrap(), PrimitiveType::UInt16);

        let err = table.lookup("Float32").unwrap_err();
        assert_eq!(
            err.kind(),
            &LoweringErrorKind::UnknownPrimitive("Float32".into())
        );
    }

    #[test]
    fn test_stdint_spellings() {
        let table = PrimitiveTable::new(CDialect::C11, DataModel::Lp64);
        assert_eq!(table.c_spelling(PrimitiveType::Int8), "int8_t");
        assert_eq!(table.c_spelling(PrimitiveType::UInt64), "uint64_t");
        assert_eq!(table.c_spelling(PrimitiveType::Bool), "bool");
    }

    #[test]
    fn test_c89_spellings_follow_data_model() {
        let lp64 = PrimitiveTable::new(CDialect::C89, DataModel::Lp64);
        assert_eq!(lp64.c_spelling(PrimitiveType::Int8), "signed char");
        assert_eq!(lp64.c_spelling(PrimitiveType::UInt16), "unsigned short int");
        assert_eq!(lp64.c_spelling(PrimitiveType::Int32), "signed int");
        assert_eq!(lp64.c_spelling(PrimitiveType::Int64), "signed long int");

        let llp64 = PrimitiveTable::new(CDialect::C89, DataModel::Llp64);
        assert_eq!(
            llp64.c_spelling(PrimitiveType::UInt64),
            "unsigned long long int"
        );
    }

    #[test]
    fn test_typedef_order_puts_aliases_last() {
        let table = PrimitiveTable::new(CDialect::C99, DataModel::Lp64);
        let names: Vec<_> = table.typedefs().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "core_basic_types_Int8");
        assert_eq!(names[8], "core_basic_types_Integer");
        assert_eq!(names[9], "core_basic_types_UInteger");
    }

    #[test]
    fn test_tag_width_selection() {
        assert_eq!(PrimitiveType::unsigned_for(3), PrimitiveType::UInt8);
        assert_eq!(PrimitiveType::unsigned_for(256), PrimitiveType::UInt8);
        assert_eq!(PrimitiveType::unsigned_for(257), PrimitiveType::UInt16);
        assert_eq!(PrimitiveType::unsigned_for(70_000), PrimitiveType::UInt32);
    }
}
