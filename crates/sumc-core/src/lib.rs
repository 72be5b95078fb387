//! Shared infrastructure for the sumc backend: the salsa database, lowering
//! inputs and configuration, target information, and diagnostics.
pub mod config;
pub mod database;
pub mod decl;
pub mod diagnostic;
pub mod target;

pub use config::LoweringConfig;
pub use database::{LoweringInput, SumcDatabaseImpl};
pub use decl::{ExistingDefinition, Instantiation, SumTypeDecl, TypeRef, UnitDecl, VariantDecl};
pub use diagnostic::{CompilationPhase, Diagnostic, DiagnosticSeverity};
pub use target::{CDialect, DataModel, UnknownDialect};
