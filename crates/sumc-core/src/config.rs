//! Lowering configuration.

use crate::target::{CDialect, DataModel};

/// Knobs for one lowering run. Built by the driver from command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoweringConfig {
    pub dialect: CDialect,
    pub data_model: DataModel,
    /// Prefix of the boolean shim's include guard, `<PREFIX>_BOOLEANS_DEFINED`.
    pub guard_prefix: String,
    /// Prefix of emitted constructor functions, `<PREFIX>_<type>_<variant>`.
    pub constructor_prefix: String,
}

impl Default for LoweringConfig {
    fn default() -> Self {
        Self {
            dialect: CDialect::default(),
            data_model: DataModel::default(),
            guard_prefix: "SUMC".to_string(),
            constructor_prefix: "New".to_string(),
        }
    }
}

impl LoweringConfig {
    pub fn with_dialect(mut self, dialect: CDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_data_model(mut self, data_model: DataModel) -> Self {
        self.data_model = data_model;
        self
    }

    pub fn with_guard_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.guard_prefix = prefix.into();
        self
    }

    pub fn shim_guard(&self) -> String {
        format!("{}_BOOLEANS_DEFINED", self.guard_prefix)
    }
}
