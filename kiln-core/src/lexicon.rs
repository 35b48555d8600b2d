//! Singular/plural lexicon used when deriving model names from collection
//! schema names (e.g., a "bots" list yields a "Bot" model).

/// Irregular plural forms that the suffix rules below would get wrong.
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("children", "child"),
    ("data", "data"),
    ("indices", "index"),
    ("media", "media"),
    ("people", "person"),
    ("statuses", "status"),
    ("series", "series"),
];

/// Reduce a plural word to its singular form.
///
/// Falls back to the input unchanged when no rule applies.
pub fn singularize(word: &str) -> String {
    if let Some((_, singular)) = IRREGULAR_PLURALS.iter().find(|(p, _)| *p == word) {
        return (*singular).to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    for suffix in ["ches", "shes", "sses", "xes", "zes"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{}{}", stem, &suffix[..suffix.len() - 2]);
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Expand a singular word to its plural form.
pub fn pluralize(word: &str) -> String {
    if let Some((plural, _)) = IRREGULAR_PLURALS.iter().find(|(_, s)| *s == word) {
        return (*plural).to_string();
    }
    if word.ends_with('y') && word.len() > 1 {
        let before = word.chars().rev().nth(1).unwrap();
        if !matches!(before, 'a' | 'e' | 'i' | 'o' | 'u') {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }
    for suffix in ["ch", "sh", "ss", "x", "z"] {
        if word.ends_with(suffix) {
            return format!("{}es", word);
        }
    }
    format!("{}s", word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize_regular() {
        assert_eq!(singularize("bots"), "bot");
        assert_eq!(singularize("messages"), "message");
        assert_eq!(singularize("entries"), "entry");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("batches"), "batch");
    }

    #[test]
    fn test_singularize_irregular() {
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("statuses"), "status");
        assert_eq!(singularize("data"), "data");
    }

    #[test]
    fn test_singularize_noop() {
        assert_eq!(singularize("chat"), "chat");
        assert_eq!(singularize("class"), "class");
        assert_eq!(singularize("s"), "s");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("bot"), "bots");
        assert_eq!(pluralize("entry"), "entries");
        assert_eq!(pluralize("day"), "days");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("person"), "people");
    }
}
