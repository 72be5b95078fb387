//! Lowering-time values.
//!
//! `Scalar` is a constant argument to a constructor call and
//! `EncodedValue` is what a constructor produces: the tag plus one slot per
//! payload field of the whole representation. Only the constructor's own
//! slots are populated; the rest stay unset and are never handed out.

use crate::descriptor::{LoweredType, Tag};
use crate::primitive::{PrimitiveTable, PrimitiveType};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Sum(EncodedValue),
}

impl Scalar {
    /// The primitive this scalar is an instance of, if it is not a sum value.
    pub fn primitive(&self) -> Option<PrimitiveType> {
        Some(match self {
            Scalar::Bool(_) => PrimitiveType::Bool,
            Scalar::Int8(_) => PrimitiveType::Int8,
            Scalar::Int16(_) => PrimitiveType::Int16,
            Scalar::Int32(_) => PrimitiveType::Int32,
            Scalar::Int64(_) => PrimitiveType::Int64,
            Scalar::UInt8(_) => PrimitiveType::UInt8,
            Scalar::UInt16(_) => PrimitiveType::UInt16,
            Scalar::UInt32(_) => PrimitiveType::UInt32,
            Scalar::UInt64(_) => PrimitiveType::UInt64,
            Scalar::Sum(_) => return None,
        })
    }

    /// Whether this scalar can be stored in a slot of type `ty`. Aliases
    /// accept values of the type they name; no widening or narrowing.
    pub fn fits(&self, ty: &LoweredType) -> bool {
        match (self, ty) {
            (Scalar::Sum(value), LoweredType::Sum { c_name, .. }) => value.ty() == c_name,
            (_, LoweredType::Primitive(prim)) => {
                self.primitive() == Some(prim.representation())
            }
            _ => false,
        }
    }

    /// Short description for error messages.
    pub fn type_name(&self) -> String {
        match (self.primitive(), self) {
            (Some(prim), _) => prim.name().to_string(),
            (None, Scalar::Sum(value)) => value.ty().to_string(),
            (None, _) => "?".to_string(),
        }
    }

    /// C integer literal for integer scalars, suffixed for the table's
    /// dialect and data model. Booleans and sum values need constructor
    /// calls and are rendered by the lowered unit.
    pub fn int_literal(&self, table: &PrimitiveTable) -> Option<String> {
        let suffix = |ty: PrimitiveType| table.literal_suffix(ty);
        Some(match self {
            Scalar::Int8(v) => v.to_string(),
            Scalar::Int16(v) => v.to_string(),
            Scalar::Int32(i32::MIN) => "(-2147483647 - 1)".to_string(),
            Scalar::Int32(v) => v.to_string(),
            Scalar::Int64(i64::MIN) => {
                format!("(-9223372036854775807{} - 1)", suffix(PrimitiveType::Int64))
            }
            Scalar::Int64(v) => format!("{v}{}", suffix(PrimitiveType::Int64)),
            Scalar::UInt8(v) => v.to_string(),
            Scalar::UInt16(v) => v.to_string(),
            Scalar::UInt32(v) => format!("{v}{}", suffix(PrimitiveType::UInt32)),
            Scalar::UInt64(v) => format!("{v}{}", suffix(PrimitiveType::UInt64)),
            Scalar::Bool(_) | Scalar::Sum(_) => return None,
        })
    }
}

/// One instance of a sum type's unified representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedValue {
    ty: String,
    tag: Tag,
    slots: Box<[Option<Scalar>]>,
}

impl EncodedValue {
    pub(crate) fn new(ty: String, tag: Tag, slots: Box<[Option<Scalar>]>) -> Self {
        Self { ty, tag, slots }
    }

    /// C name of the representation this value belongs to.
    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Unchecked slot access. Callers gate on the tag first.
    pub(crate) fn slots(&self) -> &[Option<Scalar>] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumc_core::{CDialect, DataModel};

    #[test]
    fn test_fits_respects_width_and_aliases() {
        let int32 = LoweredType::Primitive(PrimitiveType::Int32);
        let integer = LoweredType::Primitive(PrimitiveType::Integer);
        let int64 = LoweredType::Primitive(PrimitiveType::Int64);

        assert!(Scalar::Int32(7).fits(&int32));
        assert!(Scalar::Int32(7).fits(&integer));
        assert!(!Scalar::Int32(7).fits(&int64));
        assert!(!Scalar::UInt32(7).fits(&int32));
        assert!(Scalar::Bool(true).fits(&LoweredType::Primitive(PrimitiveType::Bool)));
    }

    #[test]
    fn test_fits_sum_by_representation_name() {
        let value = EncodedValue::new("c_main_Color".into(), Tag(1), Box::new([]));
        let color = LoweredType::Sum {
            short_name: "Color".into(),
            c_name: "c_main_Color".into(),
        };
        let other = LoweredType::Sum {
            short_name: "Shape".into(),
            c_name: "c_main_Shape".into(),
        };
        assert!(Scalar::Sum(value.clone()).fits(&color));
        assert!(!Scalar::Sum(value).fits(&other));
    }

    #[test]
    fn test_int_literals() {
        let c99 = PrimitiveTable::new(CDialect::C99, DataModel::Lp64);
        assert_eq!(Scalar::Int32(36).int_literal(&c99).as_deref(), Some("36"));
        assert_eq!(Scalar::Int8(-5).int_literal(&c99).as_deref(), Some("-5"));
        assert_eq!(
            Scalar::Int32(i32::MIN).int_literal(&c99).as_deref(),
            Some("(-2147483647 - 1)")
        );
        assert_eq!(Scalar::UInt32(9).int_literal(&c99).as_deref(), Some("9u"));
        assert_eq!(Scalar::UInt64(9).int_literal(&c99).as_deref(), Some("9ULL"));
        assert_eq!(Scalar::Int64(-3).int_literal(&c99).as_deref(), Some("-3LL"));
        assert_eq!(Scalar::Bool(true).int_literal(&c99), None);
    }

    #[test]
    fn test_c89_literals_follow_data_model() {
        let lp64 = PrimitiveTable::new(CDialect::C89, DataModel::Lp64);
        assert_eq!(Scalar::UInt64(9).int_literal(&lp64).as_deref(), Some("9UL"));
        assert_eq!(Scalar::Int64(7).int_literal(&lp64).as_deref(), Some("7L"));
        assert_eq!(
            Scalar::Int64(i64::MIN).int_literal(&lp64).as_deref(),
            Some("(-9223372036854775807L - 1)")
        );

        let llp64 = PrimitiveTable::new(CDialect::C89, DataModel::Llp64);
        assert_eq!(Scalar::UInt64(9).int_literal(&llp64).as_deref(), Some("9ULL"));
    }
}
