//! Diagnostic messages emitted during lowering.

/// A diagnostic message (error, warning, or info) tied to the declaration it
/// concerns.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[salsa::accumulator]
pub struct Diagnostic {
    pub message: String,
    /// Source name of the type the diagnostic is about, if any.
    pub subject: Option<String>,
    pub severity: DiagnosticSeverity,
    pub phase: CompilationPhase,
}

/// Severity level of a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

/// Compilation phase where a diagnostic was emitted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CompilationPhase {
    Validation,
    Lowering,
    Emission,
}

impl std::fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "ERROR"),
            DiagnosticSeverity::Warning => write!(f, "WARNING"),
            DiagnosticSeverity::Info => write!(f, "INFO"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "[{}] {}: {}", self.severity, subject, self.message),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}
