//! Constructor emission.
//!
//! Every variant gets one pure C function that takes exactly the variant's
//! payload, in declaration order, and returns a value whose tag is the
//! variant's tag constant. Constructors are the only way generated code
//! produces a sum value.

use std::ops::Range;

use sumc_core::CDialect;

use crate::descriptor::{LoweredType, Tag};
use crate::encoder::{EncodedRepr, TAG_FIELD};
use crate::errors::{LoweringError, LoweringResult};
use crate::naming;
use crate::unit::{CField, CFunction};
use crate::value::{EncodedValue, Scalar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorParam {
    pub name: String,
    pub ty: LoweredType,
    /// Payload field the parameter is stored into.
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    function: String,
    type_c_name: String,
    variant: String,
    tag: Tag,
    tag_constant: String,
    params: Vec<ConstructorParam>,
    slots: Range<usize>,
    slot_count: usize,
}

impl Constructor {
    /// Name of the emitted C function.
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn params(&self) -> &[ConstructorParam] {
        &self.params
    }

    /// C prototype, e.g. `c_main_Option_Int32 New_c_main_Option_Int32_Some(core_basic_types_Int32 v0)`.
    pub fn signature(&self) -> String {
        self.c_function(CDialect::default()).signature()
    }

    pub fn c_function(&self, dialect: CDialect) -> CFunction {
        let ty = &self.type_c_name;
        let body = if dialect.has_designated_initializers() {
            let inits: Vec<String> = std::iter::once(format!(".{TAG_FIELD} = {}", self.tag_constant))
                .chain(
                    self.params
                        .iter()
                        .map(|param| format!(".{} = {}", param.field, param.name)),
                )
                .collect();
            vec![
                format!("{ty} result = {{ {} }};", inits.join(", ")),
                "return result;".to_string(),
            ]
        } else {
            let mut body = vec![
                format!("{ty} result = {{0}};"),
                format!("result.{TAG_FIELD} = {};", self.tag_constant),
            ];
            body.extend(
                self.params
                    .iter()
                    .map(|param| format!("result.{} = {};", param.field, param.name)),
            );
            body.push("return result;".to_string());
            body
        };

        CFunction {
            name: self.function.clone(),
            return_type: ty.clone(),
            params: self
                .params
                .iter()
                .map(|param| CField {
                    name: param.name.clone(),
                    ty: param.ty.c_name(),
                })
                .collect(),
            body,
        }
    }

    /// Evaluate the constructor at lowering time. Only this variant's slots
    /// are populated.
    pub fn call(&self, args: Vec<Scalar>) -> LoweringResult<EncodedValue> {
        self.check_args(&args)?;
        let mut slots = vec![None; self.slot_count];
        for (slot, arg) in slots[self.slots.clone()].iter_mut().zip(args) {
            *slot = Some(arg);
        }
        Ok(EncodedValue::new(
            self.type_c_name.clone(),
            self.tag,
            slots.into_boxed_slice(),
        ))
    }

    /// Render a call expression from already rendered argument expressions.
    pub fn emit_call(&self, args: &[String]) -> LoweringResult<String> {
        if args.len() != self.params.len() {
            return Err(self.arity_error(args.len()));
        }
        Ok(format!("{}({})", self.function, args.join(", ")))
    }

    fn check_args(&self, args: &[Scalar]) -> LoweringResult<()> {
        if args.len() != self.params.len() {
            return Err(self.arity_error(args.len()));
        }
        for (index, (arg, param)) in args.iter().zip(&self.params).enumerate() {
            if !arg.fits(&param.ty) {
                return Err(LoweringError::argument_mismatch(
                    &self.function,
                    format!(
                        "argument {index} has type {}, expected {}",
                        arg.type_name(),
                        param.ty
                    ),
                ));
            }
        }
        Ok(())
    }

    fn arity_error(&self, found: usize) -> LoweringError {
        LoweringError::argument_mismatch(
            &self.function,
            format!("expected {} arguments, found {found}", self.params.len()),
        )
    }
}

/// Emits one constructor per variant of an encoded representation.
#[derive(Debug, Clone)]
pub struct ConstructorEmitter {
    prefix: String,
}

impl ConstructorEmitter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn emit(&self, repr: &EncodedRepr) -> Vec<Constructor> {
        repr.variants()
            .iter()
            .map(|variant| {
                let fields = &repr.fields()[variant.fields.clone()];
                Constructor {
                    function: naming::constructor(&self.prefix, repr.c_name(), &variant.name),
                    type_c_name: repr.c_name().to_string(),
                    variant: variant.name.clone(),
                    tag: variant.tag,
                    tag_constant: variant.tag_constant.clone(),
                    params: fields
                        .iter()
                        .enumerate()
                        .map(|(index, field)| ConstructorParam {
                            name: format!("v{index}"),
                            ty: field.ty.clone(),
                            field: field.name.clone(),
                        })
                        .collect(),
                    slots: variant.fields.clone(),
                    slot_count: repr.slot_count(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{SumTypeDescriptor, TagRepr, VariantDescriptor};
    use crate::encoder::VariantEncoder;
    use crate::errors::LoweringErrorKind;
    use crate::primitive::PrimitiveType;

    fn option_int32() -> EncodedRepr {
        let descriptor = SumTypeDescriptor {
            source_name: "Option".into(),
            short_name: "Option_Int32".into(),
            c_name: "c_main_Option_Int32".into(),
            tag_repr: TagRepr::Bool,
            variants: vec![
                VariantDescriptor {
                    name: "None".into(),
                    tag: Tag(0),
                    payload: vec![],
                },
                VariantDescriptor {
                    name: "Some".into(),
                    tag: Tag(1),
                    payload: vec![LoweredType::Primitive(PrimitiveType::Int32)],
                },
            ],
        };
        VariantEncoder.encode(&descriptor).unwrap()
    }

    #[test]
    fn test_signatures() {
        let ctors = ConstructorEmitter::new("New").emit(&option_int32());
        assert_eq!(
            ctors[0].signature(),
            "c_main_Option_Int32 New_c_main_Option_Int32_None(void)"
        );
        assert_eq!(
            ctors[1].signature(),
            "c_main_Option_Int32 New_c_main_Option_Int32_Some(core_basic_types_Int32 v0)"
        );
    }

    #[test]
    fn test_designated_initializer_body() {
        let ctors = ConstructorEmitter::new("New").emit(&option_int32());
        let function = ctors[1].c_function(CDialect::C99);
        assert_eq!(
            function.body,
            vec![
                "c_main_Option_Int32 result = { .kind = C_MAIN_OPTION_INT32_SOME, .Some_0 = v0 };",
                "return result;",
            ]
        );
    }

    #[test]
    fn test_c89_body() {
        let ctors = ConstructorEmitter::new("New").emit(&option_int32());
        let function = ctors[1].c_function(CDialect::C89);
        assert_eq!(
            function.body,
            vec![
                "c_main_Option_Int32 result = {0};",
                "result.kind = C_MAIN_OPTION_INT32_SOME;",
                "result.Some_0 = v0;",
                "return result;",
            ]
        );
    }

    #[test]
    fn test_call_populates_only_own_slots() {
        let repr = option_int32();
        let ctors = ConstructorEmitter::new("New").emit(&repr);

        let some = ctors[1].call(vec![Scalar::Int32(36)]).unwrap();
        assert_eq!(some.tag(), Tag(1));
        assert_eq!(repr.payload(&some, "Some"), Some(vec![&Scalar::Int32(36)]));
        assert_eq!(repr.payload(&some, "None"), None);

        let none = ctors[0].call(vec![]).unwrap();
        assert_eq!(none.tag(), Tag(0));
        assert_eq!(repr.payload(&none, "None"), Some(vec![]));
        assert_eq!(repr.payload(&none, "Some"), None);
    }

    #[test]
    fn test_call_rejects_bad_arguments() {
        let ctors = ConstructorEmitter::new("New").emit(&option_int32());

        let err = ctors[1].call(vec![]).unwrap_err();
        assert!(matches!(err.kind(), LoweringErrorKind::ArgumentMismatch { .. }));

        let err = ctors[1].call(vec![Scalar::Int64(36)]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad arguments for constructor `New_c_main_Option_Int32_Some`: argument 0 has type Int64, expected Int32"
        );
    }

    #[test]
    fn test_emit_call() {
        let ctors = ConstructorEmitter::new("New").emit(&option_int32());
        assert_eq!(
            ctors[1].emit_call(&["36".to_string()]).unwrap(),
            "New_c_main_Option_Int32_Some(36)"
        );
        assert!(ctors[0].emit_call(&["1".to_string()]).is_err());
    }
}
