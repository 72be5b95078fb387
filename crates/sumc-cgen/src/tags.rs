//! Tag allocation.
//!
//! Tags are dense and zero-based, assigned strictly in declaration order.
//! The same variant list always yields the same assignment.

use std::collections::HashSet;

use tracing::trace;

use crate::descriptor::{Tag, TagRepr};
use crate::errors::{LoweringError, LoweringErrorKind, LoweringResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAssignment {
    pub repr: TagRepr,
    /// One tag per variant, index-aligned with the input.
    pub tags: Vec<Tag>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TagAllocator;

impl TagAllocator {
    /// Assign tags to the variants of the sum type `ty`.
    pub fn assign(&self, ty: &str, variants: &[&str]) -> LoweringResult<TagAssignment> {
        let mut seen = HashSet::new();
        for name in variants {
            if !seen.insert(*name) {
                return Err(LoweringError::duplicate_variant(ty, name));
            }
        }

        let tags: Vec<Tag> = (0..variants.len())
            .map(|index| Tag(u32::try_from(index).unwrap_or(u32::MAX)))
            .collect();

        let mut unique = HashSet::with_capacity(tags.len());
        if let Some(tag) = tags.iter().find(|tag| !unique.insert(**tag)) {
            return Err(LoweringErrorKind::DuplicateTag {
                ty: ty.to_string(),
                tag: tag.0,
            }
            .into());
        }

        let repr = TagRepr::for_variant_count(variants.len());
        trace!(ty, count = tags.len(), ?repr, "assigned tags");
        Ok(TagAssignment { repr, tags })
    }
}
