//! Driver pipeline for sumc.
//!
//! ```text
//! decls.json ─► read_unit ─► UnitDecl
//!                               │
//!                               ▼
//!                        LoweringInput (salsa)
//!                               │
//!            ┌──────────────────┴──────────────────┐
//!            ▼                                     ▼
//!      emit_c_source ─► C text              tag_table ─► JSON
//! ```
//!
//! Diagnostics are collected from the salsa accumulator and returned next
//! to the output, so the caller decides how to print them.

use std::path::{Path, PathBuf};

use derive_more::{Display, From};
use sumc_cgen::{TagTableEntry, emit_c_source, lowering_diagnostics, tag_table};
use sumc_core::{
    Diagnostic, DiagnosticSeverity, LoweringConfig, LoweringInput, SumcDatabaseImpl, UnitDecl,
};
use tracing::{debug, info};

#[derive(Debug, Display, From)]
pub enum DriverError {
    #[display("Failed to read `{}`: {source}", path.display())]
    #[from(skip)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[display("Failed to write `{}`: {source}", path.display())]
    #[from(skip)]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[display("Invalid declaration unit: {_0}")]
    Json(serde_json::Error),
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Read { source, .. } | DriverError::Write { source, .. } => Some(source),
            DriverError::Json(err) => Some(err),
        }
    }
}

/// Output of one driver run together with every diagnostic reported.
#[derive(Debug)]
pub struct Outcome<T> {
    /// `None` when lowering reported errors.
    pub output: Option<T>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Outcome<T> {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == DiagnosticSeverity::Error)
    }
}

pub fn parse_unit(text: &str) -> Result<UnitDecl, DriverError> {
    Ok(serde_json::from_str(text)?)
}

pub fn read_unit(path: &Path) -> Result<UnitDecl, DriverError> {
    let text = std::fs::read_to_string(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let unit = parse_unit(&text)?;
    debug!(
        path = %path.display(),
        package = %unit.package,
        types = unit.types.len(),
        "read declaration unit"
    );
    Ok(unit)
}

/// Lower `unit` to C source text.
pub fn lower_to_c(unit: UnitDecl, config: LoweringConfig) -> Outcome<String> {
    let db = SumcDatabaseImpl::default();
    let input = LoweringInput::new(&db, unit, config);
    let output = emit_c_source(&db, input);
    let diagnostics = lowering_diagnostics(&db, input);
    info!(
        ok = output.is_some(),
        diagnostics = diagnostics.len(),
        "lowering finished"
    );
    Outcome {
        output,
        diagnostics,
    }
}

/// Compute the tag table of `unit` as pretty-printed JSON.
pub fn tags_json(unit: UnitDecl, config: LoweringConfig) -> Result<Outcome<String>, DriverError> {
    let db = SumcDatabaseImpl::default();
    let input = LoweringInput::new(&db, unit, config);
    let table: Option<Vec<TagTableEntry>> = tag_table(&db, input);
    let diagnostics = lowering_diagnostics(&db, input);
    let output = table
        .map(|table| serde_json::to_string_pretty(&table))
        .transpose()?;
    Ok(Outcome {
        output,
        diagnostics,
    })
}

/// Write `text` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, text: &str) -> Result<(), DriverError> {
    match path {
        Some(path) => std::fs::write(path, text).map_err(|source| DriverError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sumc_core::CDialect;

    const OPTION_UNIT: &str = r#"{
        "package": "c::main",
        "types": [{
            "name": "Option",
            "generics": ["T"],
            "variants": [
                { "name": "None" },
                { "name": "Some", "payload": [{ "generic": "T" }] }
            ]
        }],
        "instances": [{ "ty": "Option", "args": [{ "primitive": "Int32" }] }]
    }"#;

    #[test]
    fn test_lower_to_c() {
        let unit = parse_unit(OPTION_UNIT).unwrap();
        let outcome = lower_to_c(unit, LoweringConfig::default().with_dialect(CDialect::C99));
        assert!(!outcome.has_errors());
        let c = outcome.output.unwrap();
        assert!(c.contains("#define bool _Bool\n"));
        assert!(c.contains("c_main_Option_Int32 New_c_main_Option_Int32_Some(core_basic_types_Int32 v0) {\n"));
    }

    #[test]
    fn test_errors_become_diagnostics() {
        let unit = parse_unit(
            r#"{ "package": "p", "types": [{ "name": "Empty", "variants": [] }] }"#,
        )
        .unwrap();
        let outcome = lower_to_c(unit, LoweringConfig::default());
        assert!(outcome.output.is_none());
        assert!(outcome.has_errors());
        assert_eq!(
            outcome.diagnostics[0].to_string(),
            "[ERROR] Empty: Sum type `Empty` has no variants"
        );
    }

    #[test]
    fn test_tags_json() {
        let unit = parse_unit(OPTION_UNIT).unwrap();
        let outcome = tags_json(unit, LoweringConfig::default()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&outcome.output.unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 4);
        assert_eq!(json[3]["constant"], "C_MAIN_OPTION_INT32_SOME");
        assert_eq!(json[3]["tag"], 1);
        assert_eq!(json[3]["fields"][0], "Some_0");
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_unit(r#"{ "package": 1 }"#).unwrap_err();
        assert!(matches!(err, DriverError::Json(_)));
    }
}
