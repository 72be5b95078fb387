//! Variant encoding.
//!
//! A sum type becomes one flat C struct: the tag field `kind` first, then
//! every payload field of every variant, each named `<Variant>_<position>`.
//! Fields are never shared between variants, even when their types line up.
//!
//! ```text
//! typedef struct {
//!     core_basic_types_UInt8 kind;
//!     core_basic_types_Int32 Circle_0;
//!     core_basic_types_Int32 Rect_0;
//!     core_basic_types_Int32 Rect_1;
//! } c_main_Shape;
//! ```

use std::collections::HashSet;
use std::ops::Range;

use tracing::debug;

use crate::descriptor::{LoweredType, SumTypeDescriptor, Tag, TagRepr};
use crate::errors::{LoweringErrorKind, LoweringResult};
use crate::naming;
use crate::unit::{CField, CItem, CStruct};
use crate::value::{EncodedValue, Scalar};

/// Name of the discriminant field in every encoded struct.
pub const TAG_FIELD: &str = "kind";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadField {
    pub name: String,
    pub ty: LoweredType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantLayout {
    pub name: String,
    pub tag: Tag,
    /// Name of the `#define` holding the tag value.
    pub tag_constant: String,
    /// Indices into [`EncodedRepr::fields`] owned by this variant.
    pub fields: Range<usize>,
}

/// The unified representation of one sum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRepr {
    c_name: String,
    tag_repr: TagRepr,
    fields: Vec<PayloadField>,
    variants: Vec<VariantLayout>,
}

impl EncodedRepr {
    pub fn c_name(&self) -> &str {
        &self.c_name
    }

    pub fn tag_repr(&self) -> TagRepr {
        self.tag_repr
    }

    pub fn fields(&self) -> &[PayloadField] {
        &self.fields
    }

    pub fn variants(&self) -> &[VariantLayout] {
        &self.variants
    }

    pub fn variant(&self, name: &str) -> Option<&VariantLayout> {
        self.variants.iter().find(|variant| variant.name == name)
    }

    pub fn variant_by_tag(&self, tag: Tag) -> Option<&VariantLayout> {
        self.variants.iter().find(|variant| variant.tag == tag)
    }

    /// Number of payload slots across all variants.
    pub fn slot_count(&self) -> usize {
        self.fields.len()
    }

    /// The variant a value currently holds. `None` for values of another
    /// representation, including one that only shares this C name.
    pub fn variant_of(&self, value: &EncodedValue) -> Option<&VariantLayout> {
        if value.ty() != self.c_name || value.slots().len() != self.slot_count() {
            return None;
        }
        self.variant_by_tag(value.tag())
    }

    /// Tag-gated payload read: `Some` only if `value` holds `variant`.
    pub fn payload<'v>(&self, value: &'v EncodedValue, variant: &str) -> Option<Vec<&'v Scalar>> {
        let layout = self.variant_of(value)?;
        if layout.name != variant {
            return None;
        }
        value
            .slots()
            .get(layout.fields.clone())?
            .iter()
            .map(Option::as_ref)
            .collect()
    }

    /// `#define` items for the tag constants, in tag order.
    pub fn tag_defines(&self) -> Vec<CItem> {
        self.variants
            .iter()
            .map(|variant| CItem::Define {
                name: variant.tag_constant.clone(),
                value: self.tag_repr.literal(variant.tag),
            })
            .collect()
    }

    pub fn c_struct(&self) -> CStruct {
        let tag = CField {
            name: TAG_FIELD.to_string(),
            ty: self.tag_repr.c_type(),
        };
        let payload = self.fields.iter().map(|field| CField {
            name: field.name.clone(),
            ty: field.ty.c_name(),
        });
        CStruct {
            name: self.c_name.clone(),
            fields: std::iter::once(tag).chain(payload).collect(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct VariantEncoder;

impl VariantEncoder {
    pub fn encode(&self, descriptor: &SumTypeDescriptor) -> LoweringResult<EncodedRepr> {
        let mut fields = Vec::new();
        let mut variants = Vec::with_capacity(descriptor.variants.len());
        let mut names = HashSet::new();
        names.insert(TAG_FIELD.to_string());

        for variant in &descriptor.variants {
            let start = fields.len();
            for (position, ty) in variant.payload.iter().enumerate() {
                let name = naming::payload_field(&variant.name, position);
                if !names.insert(name.clone()) {
                    return Err(LoweringErrorKind::FieldCollision {
                        ty: descriptor.short_name.clone(),
                        field: name,
                    }
                    .into());
                }
                fields.push(PayloadField {
                    name,
                    ty: ty.clone(),
                });
            }
            variants.push(VariantLayout {
                name: variant.name.clone(),
                tag: variant.tag,
                tag_constant: naming::tag_constant(&descriptor.c_name, &variant.name),
                fields: start..fields.len(),
            });
        }

        debug!(
            ty = %descriptor.c_name,
            variants = variants.len(),
            fields = fields.len(),
            "encoded sum type"
        );

        Ok(EncodedRepr {
            c_name: descriptor.c_name.clone(),
            tag_repr: descriptor.tag_repr,
            fields,
            variants,
        })
    }
}
