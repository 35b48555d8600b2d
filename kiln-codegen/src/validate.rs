//! Pre-flight validation of the config against the document.

use eyre::{Result, bail};
use kiln_config::Config;
use kiln_openapi::Document;

/// Check that every mapping and ignore rule refers to something the
/// document actually has.
///
/// Runs before any generation work. Every missing operation and unmatched
/// path prefix is collected and reported in one error, not just the first.
pub fn validate(doc: &Document, config: &Config) -> Result<()> {
    let ops = doc.operations();
    let mut problems: Vec<String> = Vec::new();

    for mapping in &config.mappings {
        if mapping.allow_missing {
            continue;
        }
        if !ops.iter().any(|o| mapping.matches(&o.path, &o.method)) {
            problems.push(format!(
                "mapping {} {} matches no document operation",
                mapping.method.to_uppercase(),
                mapping.path
            ));
        }
    }

    for rule in &config.ignores {
        if !ops.iter().any(|o| rule.matches(&o.path, &o.method)) {
            let kind = if rule.prefix { "path prefix" } else { "path" };
            problems.push(format!(
                "ignore rule for {} {} matches no document operation",
                kind, rule.path
            ));
        }
    }

    if !problems.is_empty() {
        bail!(
            "config refers to operations missing from the document:\n  {}",
            problems.join("\n  ")
        );
    }
    Ok(())
}
