//! C symbol mangling.
//!
//! Package paths are flattened with `_` (`c::main` becomes `c_main`) and
//! prefixed to every emitted type name. Tag constants are the upper-cased
//! qualified name of the variant.

/// Flatten a `::`-separated package path.
pub fn package_prefix(package: &str) -> String {
    package
        .split("::")
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// `<package>_<name>`, or just `name` for the root package.
pub fn qualified(package: &str, name: &str) -> String {
    let prefix = package_prefix(package);
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}_{name}")
    }
}

/// Short name of a generic instance: `Option` with `[Int32]` is `Option_Int32`.
pub fn instance_name(base: &str, args: &[&str]) -> String {
    let mut name = base.to_string();
    for arg in args {
        name.push('_');
        name.push_str(arg);
    }
    name
}

/// Name of the tag constant for `variant` of the C type `type_c_name`.
pub fn tag_constant(type_c_name: &str, variant: &str) -> String {
    format!("{type_c_name}_{variant}").to_ascii_uppercase()
}

/// Name of the payload field for `variant` at `position`.
pub fn payload_field(variant: &str, position: usize) -> String {
    format!("{variant}_{position}")
}

/// Name of the constructor function for `variant` of `type_c_name`.
pub fn constructor(prefix: &str, type_c_name: &str, variant: &str) -> String {
    format!("{prefix}_{type_c_name}_{variant}")
}

/// Reserved words of C89 through C23 that cannot name a type or field.
const C_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "auto", "bool", "break", "case", "char", "const", "constexpr",
    "continue", "default", "do", "double", "else", "enum", "extern", "false", "float", "for",
    "goto", "if", "inline", "int", "long", "nullptr", "register", "restrict", "return", "short",
    "signed", "sizeof", "static", "static_assert", "struct", "switch", "thread_local", "true",
    "typedef", "typeof", "typeof_unqual", "union", "unsigned", "void", "volatile", "while",
];

/// Whether `name` can be used verbatim as part of a C identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !C_KEYWORDS.contains(&name)
        && !name.starts_with("__")
}
