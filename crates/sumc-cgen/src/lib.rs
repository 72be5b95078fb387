//! C backend for sum types.
//!
//! Sum type declarations are lowered to a single flat C struct per type, with
//! a tag field followed by the payload fields of every variant, plus one
//! constructor function per variant. A boolean compatibility shim makes the
//! tag encoding work on every supported C dialect.
//!
//! ```
//! use sumc_cgen::lower_unit;
//! use sumc_core::{Instantiation, LoweringConfig, SumTypeDecl, TypeRef, UnitDecl};
//!
//! let unit = UnitDecl::new("c::main")
//!     .with_type(
//!         SumTypeDecl::new("Option")
//!             .generic("T")
//!             .variant("None", vec![])
//!             .variant("Some", vec![TypeRef::generic("T")]),
//!     )
//!     .with_instance(Instantiation::new("Option", vec![TypeRef::primitive("Int32")]));
//!
//! let lowered = lower_unit(&unit, &LoweringConfig::default()).unwrap();
//! assert!(lowered.render().contains("#define C_MAIN_OPTION_INT32_SOME true"));
//! ```

pub mod constructor;
pub mod descriptor;
pub mod encoder;
pub mod errors;
pub mod lower;
pub mod naming;
pub mod primitive;
pub mod queries;
pub mod shim;
pub mod tags;
pub mod unit;
pub mod value;

pub use constructor::{Constructor, ConstructorEmitter, ConstructorParam};
pub use descriptor::{LoweredType, SumTypeDescriptor, Tag, TagRepr, VariantDescriptor};
pub use encoder::{EncodedRepr, PayloadField, TAG_FIELD, VariantEncoder, VariantLayout};
pub use errors::{LoweringError, LoweringErrorKind, LoweringResult};
pub use lower::{
    LoweredSumType, LoweredUnit, TagTableEntry, check_unit, lower_unit, lower_unit_checked,
};
pub use primitive::{CORE_PACKAGE, PrimitiveTable, PrimitiveType};
pub use queries::{emit_c_source, lowering_diagnostics, tag_table};
pub use shim::{BoolShim, ShimBody, ShimState};
pub use tags::{TagAllocator, TagAssignment};
pub use unit::{CField, CFunction, CItem, CStruct, CUnit};
pub use value::{EncodedValue, Scalar};
