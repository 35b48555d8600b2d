//! Resolves document operations and mapping config into ordered bindings.

use std::collections::BTreeSet;

use eyre::{Result, bail};
use kiln_config::{Config, OperationMapping};
use kiln_core::to_snake_case;
use kiln_openapi::{Document, OperationDetails, Parameter, Schema};

use crate::types::OperationBinding;

/// `operationId` prefixes carried over from the document exporter.
static OPERATION_ID_PREFIXES: &[&str] = &["OpenAPI", "API", "Api"];

/// Bind every document operation (and synthetic mapping-only operation) to
/// its SDK methods.
///
/// The result is ordered by package, then by mapping-declared order with
/// discovery order as the fallback key. Method name collisions within a
/// package's sync or async target are suffixed `_2`, `_3`, ... in encounter
/// order.
pub fn bind(doc: &Document, config: &Config) -> Result<Vec<OperationBinding>> {
    let ops = doc.operations();
    let mut bindings = Vec::new();
    let mut seq: u32 = 0;

    for details in &ops {
        if config.is_ignored(&details.path, &details.method) {
            continue;
        }
        let mappings = config.mappings_for(&details.path, &details.method);
        if mappings.is_empty() {
            if !config.sdk.generate_only_mapped {
                let package = infer_package(&details.path);
                let method = default_method_name(details);
                bindings.push(make_binding(package, method, details.clone(), None, None, &mut seq));
            }
            continue;
        }
        for mapping in mappings {
            push_mapping_bindings(&mut bindings, mapping, details.clone(), &mut seq);
        }
    }

    // Mappings flagged allow_missing with no document entry get details
    // manufactured from the mapping path alone.
    for mapping in &config.mappings {
        if !mapping.allow_missing || ops.iter().any(|o| mapping.matches(&o.path, &o.method)) {
            continue;
        }
        push_mapping_bindings(&mut bindings, mapping, synthetic_details(mapping), &mut seq);
    }

    if bindings.is_empty() {
        bail!("generation produced zero bindings; check the document and mapping config");
    }

    bindings.sort_by(|a, b| {
        let key = |x: &OperationBinding| {
            (
                x.package.clone(),
                x.order.unwrap_or(u32::MAX),
                x.seq,
            )
        };
        key(a).cmp(&key(b))
    });
    assign_target_names(&mut bindings);
    Ok(bindings)
}

fn push_mapping_bindings(
    out: &mut Vec<OperationBinding>,
    mapping: &OperationMapping,
    details: OperationDetails,
    seq: &mut u32,
) {
    if mapping.sdk_methods.is_empty() {
        let package = infer_package(&details.path);
        let method = default_method_name(&details);
        out.push(make_binding(
            package,
            method,
            details,
            Some(mapping.clone()),
            mapping.order,
            seq,
        ));
        return;
    }
    for target in &mapping.sdk_methods {
        let (package, method) = target
            .rsplit_once('.')
            .unwrap_or(("api", target.as_str()));
        out.push(make_binding(
            package.to_string(),
            method.to_string(),
            details.clone(),
            Some(mapping.clone()),
            mapping.order,
            seq,
        ));
    }
}

fn make_binding(
    package: String,
    method_name: String,
    details: OperationDetails,
    mapping: Option<OperationMapping>,
    order: Option<u32>,
    seq: &mut u32,
) -> OperationBinding {
    let binding = OperationBinding {
        package,
        method_name,
        sync_name: None,
        async_name: None,
        details,
        mapping,
        order,
        seq: *seq,
    };
    *seq += 1;
    binding
}

/// Suffix colliding `(package, method)` pairs per generation target.
fn assign_target_names(bindings: &mut [OperationBinding]) {
    let mut sync_used: BTreeSet<(String, String)> = BTreeSet::new();
    let mut async_used: BTreeSet<(String, String)> = BTreeSet::new();
    for binding in bindings.iter_mut() {
        let targets = binding.targets();
        if targets.includes_sync() {
            binding.sync_name = Some(unique_name(
                &binding.package,
                &binding.method_name,
                &mut sync_used,
            ));
        }
        if targets.includes_async() {
            binding.async_name = Some(unique_name(
                &binding.package,
                &binding.method_name,
                &mut async_used,
            ));
        }
    }
}

fn unique_name(package: &str, requested: &str, used: &mut BTreeSet<(String, String)>) -> String {
    let mut candidate = requested.to_string();
    let mut n = 1;
    while !used.insert((package.to_string(), candidate.clone())) {
        n += 1;
        candidate = format!("{}_{}", requested, n);
    }
    candidate
}

/// Default package for an unmapped operation: the first path segment that
/// is neither a version marker nor a parameter.
pub fn infer_package(path: &str) -> String {
    path.split('/')
        .filter(|seg| !seg.is_empty())
        .find(|seg| !is_version_segment(seg) && !seg.starts_with('{'))
        .map(|seg| seg.replace('-', "_"))
        .unwrap_or_else(|| "api".to_string())
}

fn is_version_segment(seg: &str) -> bool {
    seg.len() > 1
        && seg.starts_with('v')
        && seg[1..].chars().all(|c| c.is_ascii_digit())
}

/// Default method name: `operationId` with exporter prefixes stripped,
/// else the last non-parameter path segment.
pub fn default_method_name(details: &OperationDetails) -> String {
    if let Some(id) = &details.operation_id {
        let mut id = id.as_str();
        for prefix in OPERATION_ID_PREFIXES {
            if let Some(rest) = id.strip_prefix(prefix) {
                if !rest.is_empty() {
                    id = rest;
                    break;
                }
            }
        }
        let name = to_snake_case(id);
        if !name.is_empty() {
            return name;
        }
    }
    details
        .path
        .split('/')
        .filter(|seg| !seg.is_empty() && !seg.starts_with('{'))
        .next_back()
        .map(|seg| to_snake_case(&seg.replace('-', "_")))
        .unwrap_or_else(|| details.method.clone())
}

fn synthetic_details(mapping: &OperationMapping) -> OperationDetails {
    let mut details = OperationDetails {
        path: mapping.path.clone(),
        method: mapping.method.to_lowercase(),
        ..OperationDetails::default()
    };
    for seg in mapping.path.split('/') {
        if let Some(name) = seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            details.path_params.push(Parameter {
                name: name.to_string(),
                required: true,
                schema: Some(Schema {
                    schema_type: Some("string".into()),
                    ..Schema::default()
                }),
                description: None,
            });
        }
    }
    details
}
