//! Shared naming and case-conversion utilities.

/// Convert a string to snake_case (e.g., "CreateChat" -> "create_chat").
///
/// Acronym runs collapse into a single word ("ListAPIKeys" -> "list_api_keys").
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' || c == '.' {
            if !result.ends_with('_') {
                result.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let acronym_end = i > 0
                && chars[i - 1].is_uppercase()
                && chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if (prev_lower || acronym_end) && !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Convert a string to PascalCase (e.g., "chat_message" -> "ChatMessage").
pub fn to_pascal_case(s: &str) -> String {
    s.split(['_', '-', '.', ' '])
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Convert a string to camelCase (e.g., "chat_message" -> "chatMessage").
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_lowercase().chain(chars).collect(),
    }
}

/// Convert a string to CONSTANT_CASE (e.g., "in progress" -> "IN_PROGRESS").
pub fn to_constant_case(s: &str) -> String {
    to_snake_case(s).to_uppercase()
}

/// Check whether a string is a plain identifier: a letter or underscore
/// followed by letters, digits, and underscores.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        None => false,
        Some(c) if !c.is_ascii_alphabetic() && c != '_' => false,
        _ => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
    }
}
