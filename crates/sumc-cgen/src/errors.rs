//! Error types for sum type lowering
//!
//! Every error here is raised while lowering declarations; nothing in this
//! crate can fail once C has been emitted.

use derive_more::{Display, From};
use sumc_core::{CompilationPhase, Diagnostic, DiagnosticSeverity};

pub type LoweringResult<T> = Result<T, LoweringError>;

#[derive(Display, Debug, From, Clone, PartialEq, Eq)]
#[display("{kind}")]
pub struct LoweringError {
    #[from]
    kind: Box<LoweringErrorKind>,
}

impl<E> From<E> for LoweringError
where
    LoweringErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        LoweringError {
            kind: Box::new(LoweringErrorKind::from(error)),
        }
    }
}

impl LoweringError {
    pub fn kind(&self) -> &LoweringErrorKind {
        &self.kind
    }

    /// Errors that signal a bug in the backend rather than in the input.
    pub fn is_internal(&self) -> bool {
        matches!(
            *self.kind,
            LoweringErrorKind::DuplicateTag { .. } | LoweringErrorKind::FieldCollision { .. }
        )
    }

    /// Source name of the type this error is about, if there is one.
    pub fn subject(&self) -> Option<&str> {
        use LoweringErrorKind::*;
        match &*self.kind {
            DuplicateVariantName { ty, .. }
            | DuplicateTag { ty, .. }
            | DuplicateTypeName(ty)
            | UnknownType(ty)
            | EmptySumType(ty)
            | RecursiveType(ty)
            | GenericArity { ty, .. }
            | UnboundGeneric { ty, .. }
            | UnsupportedNestedGeneric { ty, .. }
            | UninstantiatedGeneric(ty)
            | NotGeneric(ty)
            | FieldCollision { ty, .. }
            | NameCollision { ty, .. } => Some(ty),
            UnknownPrimitive(_)
            | ShimConflict { .. }
            | InvalidIdentifier(_)
            | ArgumentMismatch { .. } => None,
        }
    }

    pub(crate) fn duplicate_variant(ty: &str, variant: &str) -> Self {
        LoweringErrorKind::DuplicateVariantName {
            ty: ty.to_string(),
            variant: variant.to_string(),
        }
        .into()
    }

    pub(crate) fn unknown_primitive(name: &str) -> Self {
        LoweringErrorKind::UnknownPrimitive(name.to_string()).into()
    }

    pub(crate) fn argument_mismatch(constructor: &str, msg: impl std::fmt::Display) -> Self {
        LoweringErrorKind::ArgumentMismatch {
            constructor: constructor.to_string(),
            detail: msg.to_string(),
        }
        .into()
    }

    /// Convert into an error diagnostic for the salsa accumulator.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let phase = if self.is_internal() {
            CompilationPhase::Emission
        } else {
            CompilationPhase::Validation
        };
        Diagnostic {
            message: self.to_string(),
            subject: self.subject().map(str::to_string),
            severity: DiagnosticSeverity::Error,
            phase,
        }
    }
}

#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum LoweringErrorKind {
    #[display("Duplicate variant `{variant}` in type `{ty}`")]
    DuplicateVariantName { ty: String, variant: String },

    #[display("Internal error: tag {tag} assigned twice in type `{ty}`")]
    DuplicateTag { ty: String, tag: u32 },

    #[display("Unknown primitive type: {_0}")]
    UnknownPrimitive(String),

    #[display("Boolean shim conflicts with existing definition of `{symbol}` as `{existing}`")]
    ShimConflict { symbol: String, existing: String },

    #[display("Type `{_0}` is declared more than once")]
    DuplicateTypeName(String),

    #[display("Unknown sum type: {_0}")]
    UnknownType(String),

    #[display("Sum type `{_0}` has no variants")]
    EmptySumType(String),

    #[display("Sum type `{_0}` contains itself without indirection")]
    RecursiveType(String),

    #[display("`{_0}` is not a valid C identifier")]
    InvalidIdentifier(String),

    #[display("Type `{ty}` expects {expected} type arguments, found {found}")]
    GenericArity {
        ty: String,
        expected: usize,
        found: usize,
    },

    #[display("Type `{ty}` uses undeclared generic parameter `{param}`")]
    UnboundGeneric { ty: String, param: String },

    #[display("Type `{ty}` is instantiated with nested generic argument `{arg}`")]
    UnsupportedNestedGeneric { ty: String, arg: String },

    #[display("Generic type `{_0}` is referenced without type arguments")]
    UninstantiatedGeneric(String),

    #[display("Type `{_0}` is not generic and cannot be instantiated")]
    NotGeneric(String),

    #[display("Internal error: payload field `{field}` collides in type `{ty}`")]
    FieldCollision { ty: String, field: String },

    #[display("C name `{name}` of {owner} collides with {other}")]
    NameCollision {
        ty: String,
        name: String,
        owner: String,
        other: String,
    },

    #[display("Bad arguments for constructor `{constructor}`: {detail}")]
    ArgumentMismatch { constructor: String, detail: String },
}

impl std::error::Error for LoweringError {}
