//! Boolean compatibility shim.
//!
//! Tag fields and the `Bool` wrapper are declared with `bool`, `true` and
//! `false`, which only C23 has as keywords. The shim supplies them for older
//! dialects inside an include guard so that a unit carries at most one
//! definition no matter how often the shim is applied.

use std::fmt::Write;

use sumc_core::{CDialect, ExistingDefinition};
use tracing::{debug, trace};

use crate::errors::{LoweringErrorKind, LoweringResult};
use crate::unit::CUnit;

/// The two states of a unit with respect to the shim. `Applied` absorbs
/// further applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimState {
    Unapplied,
    Applied,
}

/// How the boolean facility is obtained for a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimBody {
    /// The dialect has `bool`, `true` and `false` built in.
    Native,
    /// Always define the macros, aliasing `bool` to the given integer type.
    Synthesized { alias: &'static str },
    /// Probe `__STDC_VERSION__` and define the macros only below
    /// `native_since`.
    Probed {
        alias: &'static str,
        native_since: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolShim {
    guard: String,
    body: ShimBody,
}

impl BoolShim {
    pub fn for_dialect(dialect: CDialect, guard: impl Into<String>) -> Self {
        let body = match dialect {
            CDialect::C23 => ShimBody::Native,
            CDialect::Auto => match CDialect::native_bool_since() {
                Some(native_since) => ShimBody::Probed {
                    alias: "_Bool",
                    native_since,
                },
                None => ShimBody::Synthesized { alias: "_Bool" },
            },
            d if d.has_underscore_bool() => ShimBody::Synthesized { alias: "_Bool" },
            _ => ShimBody::Synthesized {
                alias: "unsigned char",
            },
        };
        Self {
            guard: guard.into(),
            body,
        }
    }

    pub fn guard(&self) -> &str {
        &self.guard
    }

    pub fn body(&self) -> ShimBody {
        self.body
    }

    /// The macros this shim may define, as `(name, value)`.
    pub fn definitions(&self) -> Vec<(&'static str, &'static str)> {
        match self.body {
            ShimBody::Native => Vec::new(),
            ShimBody::Synthesized { alias } | ShimBody::Probed { alias, .. } => {
                vec![("bool", alias), ("true", "1"), ("false", "0")]
            }
        }
    }

    /// Check a definition already present in the unit against this shim.
    fn check(&self, existing: &ExistingDefinition) -> LoweringResult<()> {
        let name = existing.name();
        if !matches!(name, "bool" | "true" | "false") {
            return Ok(());
        }
        let compatible = match existing {
            ExistingDefinition::Define { value, .. } => self
                .definitions()
                .iter()
                .any(|(shim_name, shim_value)| *shim_name == name && value.trim() == *shim_value),
            ExistingDefinition::Typedef { .. } => false,
        };
        if compatible {
            return Ok(());
        }
        let existing = match existing {
            ExistingDefinition::Define { value, .. } => format!("#define {name} {value}"),
            ExistingDefinition::Typedef { target, .. } => format!("typedef {target} {name}"),
        };
        Err(LoweringErrorKind::ShimConflict {
            symbol: name.to_string(),
            existing,
        }
        .into())
    }

    /// Fail if any of `existing` would clash with this shim.
    pub fn check_conflicts<'a>(
        &self,
        existing: impl IntoIterator<Item = &'a ExistingDefinition>,
    ) -> LoweringResult<()> {
        existing.into_iter().try_for_each(|def| self.check(def))
    }

    pub(crate) fn render(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "#ifndef {}", self.guard)?;
        writeln!(out, "#define {}", self.guard)?;
        match self.body {
            ShimBody::Native => {}
            ShimBody::Synthesized { .. } => {
                for (name, value) in self.definitions() {
                    writeln!(out, "#define {name} {value}")?;
                }
            }
            ShimBody::Probed { native_since, .. } => {
                writeln!(
                    out,
                    "#if !defined(__STDC_VERSION__) || __STDC_VERSION__ < {native_since}L"
                )?;
                for (name, value) in self.definitions() {
                    writeln!(out, "#define {name} {value}")?;
                }
                writeln!(out, "#endif")?;
            }
        }
        writeln!(out, "#define __bool_true_false_are_defined 1")?;
        writeln!(out, "#endif")
    }
}

impl CUnit {
    pub fn shim_state(&self) -> ShimState {
        if self.bool_shim.get().is_some() {
            ShimState::Applied
        } else {
            ShimState::Unapplied
        }
    }

    /// Make boolean semantics available in this unit. Applying the shim to a
    /// unit that already has it returns the installed shim unchanged.
    pub fn apply_bool_shim(&self) -> LoweringResult<&BoolShim> {
        if let Some(shim) = self.bool_shim.get() {
            trace!(guard = shim.guard(), "boolean shim already applied");
            return Ok(shim);
        }
        let shim = BoolShim::for_dialect(self.dialect(), self.guard());
        shim.check_conflicts(self.existing())?;
        let installed = self.bool_shim.get_or_init(|| {
            debug!(dialect = %self.dialect(), body = ?shim.body(), "applying boolean shim");
            shim
        });
        Ok(installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_apply_transitions_state() {
        let unit = CUnit::new(CDialect::C99, "T_BOOLEANS_DEFINED");
        assert_eq!(unit.shim_state(), ShimState::Unapplied);
        unit.apply_bool_shim().unwrap();
        assert_eq!(unit.shim_state(), ShimState::Applied);
    }

    #[test]
    fn test_apply_twice_is_noop() {
        let once = CUnit::new(CDialect::C11, "T_BOOLEANS_DEFINED");
        once.apply_bool_shim().unwrap();

        let twice = CUnit::new(CDialect::C11, "T_BOOLEANS_DEFINED");
        let first = twice.apply_bool_shim().unwrap().clone();
        let second = twice.apply_bool_shim().unwrap();
        assert_eq!(&first, second);

        let rendered = twice.render();
        assert_eq!(rendered, once.render());
        assert_eq!(count(&rendered, "#define bool _Bool"), 1);
        assert_eq!(count(&rendered, "#ifndef T_BOOLEANS_DEFINED"), 1);
    }

    #[test]
    fn test_concurrent_apply_installs_once() {
        let unit = CUnit::new(CDialect::Auto, "T_BOOLEANS_DEFINED");
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    unit.apply_bool_shim().unwrap();
                });
            }
        });
        assert_eq!(unit.shim_state(), ShimState::Applied);
        assert_eq!(count(&unit.render(), "#define bool _Bool"), 1);
    }

    #[test]
    fn test_auto_probes_the_first_native_version() {
        let shim = BoolShim::for_dialect(CDialect::Auto, "G");
        assert_eq!(
            shim.body(),
            ShimBody::Probed {
                alias: "_Bool",
                native_since: 202311,
            }
        );
        let mut out = String::new();
        shim.render(&mut out).unwrap();
        assert!(out.contains("__STDC_VERSION__ < 202311L\n"));
    }

    #[test]
    fn test_bodies_per_dialect() {
        let c23 = CUnit::new(CDialect::C23, "G");
        c23.apply_bool_shim().unwrap();
        assert_eq!(
            c23.render(),
            "#ifndef G\n#define G\n#define __bool_true_false_are_defined 1\n#endif\n"
        );

        let c89 = CUnit::new(CDialect::C89, "G");
        c89.apply_bool_shim().unwrap();
        let rendered = c89.render();
        assert!(rendered.contains("#define bool unsigned char\n"));
        assert!(rendered.contains("#define true 1\n#define false 0\n"));
        assert!(!rendered.contains("__STDC_VERSION__"));

        let auto = CUnit::new(CDialect::Auto, "G");
        auto.apply_bool_shim().unwrap();
        let expected = "\
#ifndef G
#define G
#if !defined(__STDC_VERSION__) || __STDC_VERSION__ < 202311L
#define bool _Bool
#define true 1
#define false 0
#endif
#define __bool_true_false_are_defined 1
#endif
";
        assert_eq!(auto.render(), expected);
    }

    #[test]
    fn test_identical_existing_definition_is_accepted() {
        let unit = CUnit::new(CDialect::C99, "G").with_existing([ExistingDefinition::Define {
            name: "true".into(),
            value: "1".into(),
        }]);
        assert!(unit.apply_bool_shim().is_ok());
    }

    #[test]
    fn test_conflicting_definition_is_rejected() {
        let unit = CUnit::new(CDialect::C99, "G").with_existing([ExistingDefinition::Typedef {
            name: "bool".into(),
            target: "int".into(),
        }]);
        let err = unit.apply_bool_shim().unwrap_err();
        assert_eq!(
            err.kind(),
            &LoweringErrorKind::ShimConflict {
                symbol: "bool".into(),
                existing: "typedef int bool".into(),
            }
        );
        assert_eq!(unit.shim_state(), ShimState::Unapplied);
    }

    #[test]
    fn test_native_dialect_rejects_keyword_redefinition() {
        let unit = CUnit::new(CDialect::C23, "G").with_existing([ExistingDefinition::Define {
            name: "false".into(),
            value: "0".into(),
        }]);
        assert!(unit.apply_bool_shim().is_err());
    }
}
