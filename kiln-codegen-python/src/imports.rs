//! Comment/string-aware import normalization.
//!
//! Rendering assembles many independent fragments, so a file's exact import
//! set is only knowable once the whole file exists. This pass scans the
//! finished text (with literals stripped by a small state machine), decides
//! which well-known symbols are actually referenced, and rewrites the
//! import block accordingly: missing imports are added, unused ones pruned.

use std::collections::{BTreeMap, BTreeSet};

/// The well-known `(module, symbol)` pairs the normalizer manages.
pub struct ImportTable {
    entries: Vec<ImportModule>,
}

struct ImportModule {
    module: String,
    /// `(symbol, also scanned inside quoted forward-reference annotations)`
    symbols: Vec<(&'static str, bool)>,
}

impl ImportTable {
    /// The table for an SDK rooted at the given Python package.
    pub fn for_sdk(package: &str) -> Self {
        let typing = ["Any", "AsyncIterator", "Dict", "Iterator", "List", "Optional", "Union"];
        Self {
            entries: vec![
                ImportModule {
                    module: "typing".to_string(),
                    symbols: typing.iter().map(|s| (*s, true)).collect(),
                },
                ImportModule {
                    module: "enum".to_string(),
                    symbols: vec![("Enum", false)],
                },
                ImportModule {
                    module: format!("{}.model", package),
                    symbols: vec![("BaseModel", false)],
                },
                ImportModule {
                    module: format!("{}.pagination", package),
                    symbols: vec![
                        ("LastIDPagedResponse", false),
                        ("NumberPagedResponse", false),
                        ("TokenPagedResponse", false),
                    ],
                },
                ImportModule {
                    module: format!("{}.request", package),
                    symbols: vec![("Requester", false)],
                },
                ImportModule {
                    module: format!("{}.stream", package),
                    symbols: vec![("AsyncStream", false), ("Stream", false)],
                },
                ImportModule {
                    module: format!("{}.util", package),
                    symbols: vec![("dump_exclude_none", false), ("remove_none_values", false)],
                },
            ],
        }
    }

    fn is_table_module(&self, module: &str) -> bool {
        self.entries.iter().any(|e| e.module == module)
    }

    fn is_table_symbol(&self, module: &str, symbol: &str) -> bool {
        self.entries
            .iter()
            .find(|e| e.module == module)
            .is_some_and(|e| e.symbols.iter().any(|(s, _)| *s == symbol))
    }
}

/// Rewrite a rendered file so it imports exactly what it uses.
pub fn normalize_imports(source: &str, table: &ImportTable) -> String {
    // Pull existing imports of managed modules out of the text.
    let mut existing: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut header: Vec<&str> = Vec::new();
    let mut body_lines: Vec<&str> = Vec::new();
    let mut in_header = true;
    for line in source.lines() {
        if let Some((module, symbols)) = parse_from_import(line) {
            if table.is_table_module(&module) {
                existing.entry(module).or_default().extend(symbols);
                continue;
            }
        }
        if in_header && line.starts_with('#') && body_lines.is_empty() {
            header.push(line);
            continue;
        }
        in_header = false;
        body_lines.push(line);
    }
    while body_lines.first().is_some_and(|l| l.trim().is_empty()) {
        body_lines.remove(0);
    }
    let body = body_lines.join("\n");

    let scanned = strip_literals(&body);
    let code_ids = identifiers_in(&scanned.code);
    let quoted_ids = identifiers_in(&scanned.quoted);

    let mut import_lines: Vec<String> = Vec::new();
    for entry in &table.entries {
        let mut symbols: BTreeSet<String> = BTreeSet::new();
        for (symbol, scan_quoted) in &entry.symbols {
            let referenced =
                code_ids.contains(*symbol) || (*scan_quoted && quoted_ids.contains(*symbol));
            if referenced && !declared_locally(&scanned.code, symbol) {
                symbols.insert((*symbol).to_string());
            }
        }
        // Foreign symbols on a managed module line survive untouched.
        if let Some(found) = existing.get(&entry.module) {
            for symbol in found {
                if !table.is_table_symbol(&entry.module, symbol) {
                    symbols.insert(symbol.clone());
                }
            }
        }
        if !symbols.is_empty() {
            let joined: Vec<String> = symbols.into_iter().collect();
            import_lines.push(format!("from {} import {}", entry.module, joined.join(", ")));
        }
    }

    let mut out = String::new();
    for line in &header {
        out.push_str(line);
        out.push('\n');
    }
    if !import_lines.is_empty() {
        if !header.is_empty() {
            out.push('\n');
        }
        for line in &import_lines {
            out.push_str(line);
            out.push('\n');
        }
        if !body.is_empty() {
            out.push('\n');
        }
    }
    out.push_str(&body);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Parse a `from X import a, b` line.
fn parse_from_import(line: &str) -> Option<(String, Vec<String>)> {
    let rest = line.strip_prefix("from ")?;
    let (module, rest) = rest.split_once(" import ")?;
    let symbols = rest
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    Some((module.trim().to_string(), symbols))
}

/// Whether the file itself declares the symbol at module level.
fn declared_locally(code: &str, symbol: &str) -> bool {
    code.lines().any(|line| {
        if line.starts_with(' ') || line.starts_with('\t') {
            return false;
        }
        if let Some(rest) = line.strip_prefix("class ") {
            return rest.starts_with(symbol)
                && !rest[symbol.len()..]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        }
        if let Some(rest) = line.strip_prefix("def ") {
            return rest.starts_with(symbol) && rest[symbol.len()..].starts_with('(');
        }
        if let Some(rest) = line.strip_prefix(symbol) {
            let rest = rest.trim_start();
            return rest.starts_with('=') && !rest.starts_with("==");
        }
        false
    })
}

/// Output of the literal-stripping scanner.
pub(crate) struct ScannedSource {
    /// Source with comments and string contents blanked out.
    pub code: String,
    /// Contents of single-line string literals (quoted forward-reference
    /// annotations live here); docstrings are excluded.
    pub quoted: String,
}

/// Strip string/comment content with a small state machine so identifier
/// scanning never matches inside literals.
pub(crate) fn strip_literals(source: &str) -> ScannedSource {
    #[derive(PartialEq, Clone, Copy)]
    enum State {
        Code,
        LineComment,
        Single,
        Double,
        TripleSingle,
        TripleDouble,
    }

    fn is_triple(chars: &[char], i: usize, q: char) -> bool {
        i + 2 < chars.len() && chars[i + 1] == q && chars[i + 2] == q
    }

    let chars: Vec<char> = source.chars().collect();
    let mut code = String::with_capacity(source.len());
    let mut quoted = String::new();
    let mut state = State::Code;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match state {
            State::Code => match c {
                '#' => {
                    state = State::LineComment;
                    code.push(' ');
                }
                '\'' if is_triple(&chars, i, '\'') => {
                    state = State::TripleSingle;
                    code.push_str("   ");
                    i += 2;
                }
                '"' if is_triple(&chars, i, '"') => {
                    state = State::TripleDouble;
                    code.push_str("   ");
                    i += 2;
                }
                '\'' => {
                    state = State::Single;
                    code.push(' ');
                }
                '"' => {
                    state = State::Double;
                    code.push(' ');
                }
                _ => code.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                    code.push('\n');
                } else {
                    code.push(' ');
                }
            }
            State::Single | State::Double => {
                let close = if state == State::Single { '\'' } else { '"' };
                if c == '\\' && i + 1 < chars.len() {
                    code.push(' ');
                    code.push(' ');
                    quoted.push(' ');
                    i += 1;
                } else if c == close {
                    state = State::Code;
                    code.push(' ');
                    quoted.push(' ');
                } else if c == '\n' {
                    // Unterminated; recover rather than corrupt the scan.
                    state = State::Code;
                    code.push('\n');
                    quoted.push(' ');
                } else {
                    code.push(' ');
                    quoted.push(c);
                }
            }
            State::TripleSingle | State::TripleDouble => {
                let close = if state == State::TripleSingle { '\'' } else { '"' };
                if c == close && is_triple(&chars, i, close) {
                    state = State::Code;
                    code.push_str("   ");
                    i += 2;
                } else if c == '\n' {
                    code.push('\n');
                } else {
                    code.push(' ');
                }
            }
        }
        i += 1;
    }
    ScannedSource { code, quoted }
}

/// All identifier tokens in a text.
pub(crate) fn identifiers_in(text: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            current.push(c);
        } else if !current.is_empty() {
            if !current.chars().next().is_some_and(|f| f.is_ascii_digit()) {
                out.insert(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if !current.is_empty() && !current.chars().next().is_some_and(|f| f.is_ascii_digit()) {
        out.insert(current);
    }
    out
}
