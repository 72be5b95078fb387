//! Target information for C emission
//!
//! Two things about the target influence the generated code: which C
//! standard the output is compiled under (this decides how booleans and
//! fixed-width integers are spelled), and the integer data model of the
//! platform (only relevant for dialects without `<stdint.h>`).

use std::str::FromStr;

use derive_more::Display;
use target_lexicon::{OperatingSystem, PointerWidth, Triple};

/// C language dialect the emitted unit targets.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CDialect {
    #[display("c89")]
    C89,
    #[display("c99")]
    C99,
    #[display("c11")]
    C11,
    #[display("c17")]
    C17,
    #[display("c23")]
    C23,
    /// Decide at C compile time from `__STDC_VERSION__`.
    #[default]
    #[display("auto")]
    Auto,
}

impl CDialect {
    pub const ALL: [CDialect; 6] = [
        CDialect::C89,
        CDialect::C99,
        CDialect::C11,
        CDialect::C17,
        CDialect::C23,
        CDialect::Auto,
    ];

    /// Lowest `__STDC_VERSION__` at which `bool`, `true` and `false` are
    /// keywords.
    pub fn native_bool_since() -> Option<u32> {
        Self::ALL
            .into_iter()
            .filter(|dialect| dialect.has_native_bool())
            .filter_map(Self::stdc_version)
            .min()
    }

    /// Value of `__STDC_VERSION__` for this dialect, if it defines one.
    pub fn stdc_version(self) -> Option<u32> {
        match self {
            CDialect::C89 | CDialect::Auto => None,
            CDialect::C99 => Some(199901),
            CDialect::C11 => Some(201112),
            CDialect::C17 => Some(201710),
            CDialect::C23 => Some(202311),
        }
    }

    /// `bool`, `true` and `false` are keywords.
    pub fn has_native_bool(self) -> bool {
        self == CDialect::C23
    }

    /// `_Bool` is available.
    pub fn has_underscore_bool(self) -> bool {
        !matches!(self, CDialect::C89)
    }

    /// `<stdint.h>` is available.
    pub fn has_stdint(self) -> bool {
        !matches!(self, CDialect::C89)
    }

    /// Designated initializers (`{ .field = value }`) are available.
    pub fn has_designated_initializers(self) -> bool {
        !matches!(self, CDialect::C89)
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("unknown C dialect: {_0}")]
pub struct UnknownDialect(pub String);

impl std::error::Error for UnknownDialect {}

impl FromStr for CDialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c89" | "c90" | "ansi" => Ok(CDialect::C89),
            "c99" => Ok(CDialect::C99),
            "c11" => Ok(CDialect::C11),
            "c17" | "c18" => Ok(CDialect::C17),
            "c23" | "c2x" => Ok(CDialect::C23),
            "auto" => Ok(CDialect::Auto),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

/// Widths of the C integer types `int`/`long`/`long long` on a platform.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataModel {
    /// 32-bit `int`, `long` and pointers.
    #[display("ILP32")]
    Ilp32,
    /// 64-bit `long` and pointers (Unix-like 64-bit).
    #[default]
    #[display("LP64")]
    Lp64,
    /// 32-bit `long`, 64-bit `long long` and pointers (64-bit Windows).
    #[display("LLP64")]
    Llp64,
}

impl DataModel {
    pub fn from_triple(triple: &Triple) -> Self {
        match triple.pointer_width() {
            Ok(PointerWidth::U64) => match triple.operating_system {
                OperatingSystem::Windows => DataModel::Llp64,
                _ => DataModel::Lp64,
            },
            Ok(PointerWidth::U16) | Ok(PointerWidth::U32) => DataModel::Ilp32,
            Err(_) => DataModel::Lp64, // Default to 64-bit
        }
    }

    pub fn host() -> Self {
        Self::from_triple(&Triple::host())
    }

    /// Bit width of C `long`.
    pub fn long_width(self) -> u8 {
        match self {
            DataModel::Lp64 => 64,
            DataModel::Ilp32 | DataModel::Llp64 => 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_parse() {
        assert_eq!("c99".parse::<CDialect>().unwrap(), CDialect::C99);
        assert_eq!("C2X".parse::<CDialect>().unwrap(), CDialect::C23);
        assert_eq!("ansi".parse::<CDialect>().unwrap(), CDialect::C89);
        assert!("c++17".parse::<CDialect>().is_err());
    }

    #[test]
    fn test_dialect_features() {
        assert!(CDialect::C23.has_native_bool());
        assert!(!CDialect::C17.has_native_bool());
        assert!(!CDialect::Auto.has_native_bool());
        assert!(!CDialect::C89.has_underscore_bool());
        assert!(!CDialect::C89.has_stdint());
        assert!(CDialect::Auto.has_stdint());
        assert_eq!(CDialect::C11.stdc_version(), Some(201112));
        assert_eq!(CDialect::native_bool_since(), Some(202311));
        assert_eq!(CDialect::C89.to_string(), "c89");
    }

    #[test]
    fn test_data_model_from_triple() {
        let linux = Triple::from_str("x86_64-unknown-linux-gnu").unwrap();
        assert_eq!(DataModel::from_triple(&linux), DataModel::Lp64);

        let windows = Triple::from_str("x86_64-pc-windows-msvc").unwrap();
        assert_eq!(DataModel::from_triple(&windows), DataModel::Llp64);

        let i386 = Triple::from_str("i386-unknown-linux-gnu").unwrap();
        assert_eq!(DataModel::from_triple(&i386), DataModel::Ilp32);
        assert_eq!(DataModel::Ilp32.long_width(), 32);
    }
}
