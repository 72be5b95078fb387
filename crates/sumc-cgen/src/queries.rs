//! Salsa queries over [`LoweringInput`].
//!
//! Lowering problems are reported through the [`Diagnostic`] accumulator,
//! all of them at once, and the queries return `None` when any error was
//! found.

use salsa::Accumulator;
use sumc_core::{CompilationPhase, Diagnostic, DiagnosticSeverity, LoweringInput};
use tracing::warn;

use crate::lower::{LoweredUnit, TagTableEntry, lower_unit_checked};

/// Lower the input and report every problem as a diagnostic.
fn lower_reporting(db: &dyn salsa::Database, input: LoweringInput) -> Option<LoweredUnit> {
    let unit = input.unit(db);
    let config = input.config(db);

    let lowered = match lower_unit_checked(unit, config) {
        Ok(lowered) => lowered,
        Err(errors) => {
            for err in &errors {
                err.to_diagnostic().accumulate(db);
            }
            return None;
        }
    };

    for decl in unit.types.iter().filter(|decl| decl.is_generic()) {
        let instantiated = lowered
            .types()
            .iter()
            .any(|ty| ty.descriptor.source_name == decl.name);
        if !instantiated {
            warn!(ty = %decl.name, "generic type never instantiated");
            Diagnostic {
                message: format!(
                    "Generic type `{}` is never instantiated and emits no C",
                    decl.name
                ),
                subject: Some(decl.name.clone()),
                severity: DiagnosticSeverity::Warning,
                phase: CompilationPhase::Lowering,
            }
            .accumulate(db);
        }
    }

    Some(lowered)
}

/// Rendered C source for the input, or `None` if lowering failed.
#[salsa::tracked]
pub fn emit_c_source(db: &dyn salsa::Database, input: LoweringInput) -> Option<String> {
    lower_reporting(db, input).map(|lowered| lowered.render())
}

/// Tag table of every emitted sum type, the `Bool` wrapper first.
#[salsa::tracked]
pub fn tag_table(db: &dyn salsa::Database, input: LoweringInput) -> Option<Vec<TagTableEntry>> {
    lower_reporting(db, input).map(|lowered| lowered.tag_table())
}

/// Diagnostics produced while lowering the input.
pub fn lowering_diagnostics(db: &dyn salsa::Database, input: LoweringInput) -> Vec<Diagnostic> {
    emit_c_source(db, input);
    emit_c_source::accumulated::<Diagnostic>(db, input)
        .into_iter()
        .cloned()
        .collect()
}
