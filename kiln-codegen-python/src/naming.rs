//! Python-specific naming conventions.

use kiln_core::to_constant_case;

/// Python reserved words; colliding parameter or field names get a
/// trailing underscore.
static PYTHON_RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class", "continue",
    "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if", "import",
    "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield",
];

pub fn is_reserved(name: &str) -> bool {
    PYTHON_RESERVED.contains(&name)
}

/// Escape a reserved word by suffixing an underscore.
pub fn safe_name(name: &str) -> String {
    if is_reserved(name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Derive an enum member name from its value text.
///
/// Case-normalized to CONSTANT_CASE; characters that cannot appear in an
/// identifier become underscores, and a digit-leading value gets a
/// `VALUE_` prefix.
pub fn enum_member_name(value: &str) -> String {
    let mut name: String = to_constant_case(value)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    while name.contains("__") {
        name = name.replace("__", "_");
    }
    let name = name.trim_matches('_').to_string();
    if name.is_empty() {
        return "UNKNOWN".to_string();
    }
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return format!("VALUE_{}", name);
    }
    name
}
