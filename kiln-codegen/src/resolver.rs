//! Derives the ordered, deduplicated model set per package.

use std::collections::{BTreeMap, BTreeSet};

use kiln_config::{Config, PaginationMode};
use kiln_core::{is_identifier, singularize, to_pascal_case};
use kiln_openapi::{Document, OperationDetails, Schema, SchemaKind, ref_name};

use crate::types::{ModelDefinition, OperationBinding, PackageModels};

/// Resolve the model set of every package touched by config or bindings.
pub fn resolve_models(
    doc: &Document,
    config: &Config,
    bindings: &[OperationBinding],
) -> BTreeMap<String, PackageModels> {
    let mut package_names: Vec<String> = Vec::new();
    for pkg in &config.packages {
        if !package_names.contains(&pkg.name) {
            package_names.push(pkg.name.clone());
        }
    }
    for binding in bindings {
        if !package_names.contains(&binding.package) {
            package_names.push(binding.package.clone());
        }
    }

    package_names
        .into_iter()
        .map(|name| {
            let pkg_bindings: Vec<&OperationBinding> =
                bindings.iter().filter(|b| b.package == name).collect();
            let resolved = resolve_package(doc, config, &name, &pkg_bindings);
            (name, resolved)
        })
        .collect()
}

fn resolve_package(
    doc: &Document,
    config: &Config,
    package: &str,
    bindings: &[&OperationBinding],
) -> PackageModels {
    let mut models: Vec<ModelDefinition> = Vec::new();
    let mut aliases: BTreeMap<String, String> = BTreeMap::new();
    // Emitted class name -> structural signature, for duplicate collapsing.
    let mut signatures: BTreeMap<String, String> = BTreeMap::new();
    let mut config_declared: BTreeSet<String> = BTreeSet::new();

    let explicit = config
        .package(package)
        .map(|p| p.model_schemas.as_slice())
        .unwrap_or(&[]);

    for entry in explicit {
        let schema = entry
            .schema
            .as_deref()
            .and_then(|n| doc.components.schemas.get(n))
            .cloned();
        let model = ModelDefinition::from_config(entry, schema);
        config_declared.insert(model.name.clone());
        if models.iter().any(|m| m.name == model.name) {
            continue;
        }
        if let (Some(schema_name), Some(schema)) = (&model.schema_name, &model.schema) {
            aliases.insert(schema_name.clone(), model.name.clone());
            signatures.insert(
                model.name.clone(),
                signature_for(Some(schema_name.as_str()), schema, doc),
            );
        }
        models.push(model);
    }

    // A package with no model config seeds one model per response-typed
    // binding. Paged responses are synthesized elsewhere; they seed their
    // item model here so the paged class has a real element type.
    if explicit.is_empty() {
        for binding in bindings {
            let Some(mapping) = &binding.mapping else {
                continue;
            };
            if mapping.response_type.is_none() {
                continue;
            }
            if mapping.pagination != PaginationMode::None {
                seed_paged_item(doc, binding, mapping, &mut models, &mut aliases, &mut signatures);
                continue;
            }
            let Some(response_type) = &mapping.response_type else {
                continue;
            };
            let Some((schema_name, schema)) = response_model_schema(doc, &binding.details) else {
                continue;
            };
            let name = if is_identifier(response_type) {
                response_type.clone()
            } else if let Some(schema_name) = &schema_name {
                to_pascal_case(&singularize(schema_name))
            } else {
                continue;
            };
            if models.iter().any(|m| m.name == name) {
                continue;
            }
            if let Some(schema_name) = &schema_name {
                aliases.insert(schema_name.clone(), name.clone());
            }
            signatures.insert(
                name.clone(),
                signature_for(schema_name.as_deref(), &schema, doc),
            );
            models.push(ModelDefinition {
                name,
                schema_name: schema_name.clone(),
                is_enum: !schema.enum_values.is_empty(),
                schema: Some(schema),
                ..ModelDefinition::default()
            });
        }
    }

    // Closure: pull in every schema transitively referenced by the seeds.
    let mut queue: Vec<(Schema, Vec<String>)> = models
        .iter()
        .filter_map(|m| m.schema.clone().map(|s| (s, m.exclude_fields.clone())))
        .collect();
    let mut qi = 0;
    while qi < queue.len() {
        let (schema, excludes) = queue[qi].clone();
        qi += 1;
        let mut refs = Vec::new();
        collect_refs(&schema, &excludes, &mut refs);
        for r in refs {
            if aliases.contains_key(&r) {
                continue;
            }
            let Some(target) = doc.components.schemas.get(&r) else {
                // Unresolvable refs degrade to a generic type downstream.
                continue;
            };
            let sig = signature_for(Some(r.as_str()), target, doc);
            if let Some((existing, _)) = signatures.iter().find(|(_, s)| **s == sig) {
                // Structural duplicate: alias, emit nothing.
                aliases.insert(r.clone(), existing.clone());
                continue;
            }
            let mut name = to_pascal_case(&r);
            if name.is_empty() {
                name = "Model".to_string();
            }
            if signatures.contains_key(&name) || models.iter().any(|m| m.name == name) {
                let base = name.clone();
                let mut n = 2;
                loop {
                    name = format!("{}{}", base, n);
                    if !signatures.contains_key(&name) && !models.iter().any(|m| m.name == name) {
                        break;
                    }
                    n += 1;
                }
            }
            aliases.insert(r.clone(), name.clone());
            signatures.insert(name.clone(), sig);
            models.push(ModelDefinition::schema_backed(name, r.clone(), target.clone()));
            queue.push((target.clone(), Vec::new()));
        }
    }

    let models = topo_sort(models, &aliases);
    PackageModels {
        models,
        aliases,
        config_declared,
    }
}

/// Seed the element model of a paged response: the named schema behind the
/// configured items field of the response's data wrapper.
fn seed_paged_item(
    doc: &Document,
    binding: &OperationBinding,
    mapping: &kiln_config::OperationMapping,
    models: &mut Vec<ModelDefinition>,
    aliases: &mut BTreeMap<String, String>,
    signatures: &mut BTreeMap<String, String>,
) {
    let Some((_, data)) = response_model_schema(doc, &binding.details) else {
        return;
    };
    let items_field = crate::pagination::PageRole::Items.field_name(Some(mapping));
    let Some(prop) = data.properties.get(&items_field) else {
        return;
    };
    let resolved_prop = doc.resolve(prop);
    let Some(items) = &resolved_prop.items else {
        return;
    };
    let Some(item_name) = doc.schema_name_of(items).map(str::to_string) else {
        return;
    };
    if aliases.contains_key(&item_name) {
        return;
    }
    let name = to_pascal_case(&singularize(&item_name));
    if models.iter().any(|m| m.name == name) {
        aliases.insert(item_name, name);
        return;
    }
    let item_schema = doc.resolve(items).clone();
    aliases.insert(item_name.clone(), name.clone());
    signatures.insert(
        name.clone(),
        signature_for(Some(item_name.as_str()), &item_schema, doc),
    );
    models.push(ModelDefinition::schema_backed(name, item_name, item_schema));
}

/// The schema a method's response model comes from: the response's `data`
/// field when the response is a `{code, msg, data}` wrapper, else the whole
/// response schema. Array schemas resolve to their item schema.
pub fn response_model_schema(
    doc: &Document,
    details: &OperationDetails,
) -> Option<(Option<String>, Schema)> {
    let response = details.response_schema.as_ref()?;
    let resolved = doc.resolve(response);
    let (name, node) = match resolved.properties.get("data") {
        Some(data) => named_resolved(doc, data),
        None => (
            doc.schema_name_of(response).map(str::to_string),
            resolved.clone(),
        ),
    };
    if node.kind() == SchemaKind::Array {
        if let Some(items) = &node.items {
            return Some(named_resolved(doc, items));
        }
    }
    Some((name, node))
}

fn named_resolved(doc: &Document, schema: &Schema) -> (Option<String>, Schema) {
    match doc.schema_name_of(schema) {
        Some(name) => (Some(name.to_string()), doc.resolve(schema).clone()),
        None => (None, schema.clone()),
    }
}

/// Canonical encoding of a schema's shape, used to collapse structural
/// duplicates. Cycles collapse to a fixed marker so two schemas that differ
/// only in their own names still compare equal.
pub fn structural_signature(schema: &Schema, doc: &Document) -> String {
    signature_for(None, schema, doc)
}

fn signature_for(name: Option<&str>, schema: &Schema, doc: &Document) -> String {
    let mut visiting = BTreeSet::new();
    if let Some(name) = name {
        visiting.insert(name.to_string());
    }
    signature(schema, doc, &mut visiting)
}

fn signature(schema: &Schema, doc: &Document, visiting: &mut BTreeSet<String>) -> String {
    match schema.kind() {
        SchemaKind::Ref(r) => {
            let Some(target_name) = ref_name(r) else {
                return "any".into();
            };
            let Some(target) = doc.components.schemas.get(target_name) else {
                return format!("ref?{}", target_name);
            };
            if !visiting.insert(target_name.to_string()) {
                return "<cycle>".into();
            }
            let sig = signature(target, doc, visiting);
            visiting.remove(target_name);
            sig
        }
        SchemaKind::Enum => {
            let mut values = schema.enum_strings();
            values.sort();
            format!("enum({})", values.join("|"))
        }
        SchemaKind::Primitive(t) => match &schema.format {
            Some(f) => format!("{}:{}", t, f),
            None => t.to_string(),
        },
        SchemaKind::Array => match &schema.items {
            Some(items) => format!("list({})", signature(items, doc, visiting)),
            None => "list(any)".into(),
        },
        SchemaKind::Object => {
            let mut props: Vec<(&String, &Schema)> = schema.properties.iter().collect();
            props.sort_by_key(|(n, _)| n.as_str());
            let fields: Vec<String> = props
                .iter()
                .map(|(n, s)| {
                    let marker = if schema.is_required(n) { '!' } else { '?' };
                    format!("{}{}:{}", n, marker, signature(s, doc, visiting))
                })
                .collect();
            let mut sig = format!("obj{{{}}}", fields.join(","));
            if let Some(ap) = &schema.additional_properties {
                sig.push_str(&format!("+map({})", signature(ap, doc, visiting)));
            }
            sig
        }
        SchemaKind::Composed => {
            let mut parts = Vec::new();
            for (key, branches) in [
                ("all", &schema.all_of),
                ("any", &schema.any_of),
                ("one", &schema.one_of),
            ] {
                if branches.is_empty() {
                    continue;
                }
                let sigs: Vec<String> = branches
                    .iter()
                    .map(|b| signature(b, doc, visiting))
                    .collect();
                parts.push(format!("{}({})", key, sigs.join(",")));
            }
            parts.join("+")
        }
        SchemaKind::Unknown => "any".into(),
    }
}

/// Schema names referenced by a node's rendered surface: properties (minus
/// excluded ones), array items, composition branches, and map values.
fn collect_refs(schema: &Schema, excludes: &[String], out: &mut Vec<String>) {
    if let Some(r) = &schema.ref_path {
        if let Some(name) = ref_name(r) {
            out.push(name.to_string());
        }
    }
    for (prop_name, prop) in &schema.properties {
        if excludes.iter().any(|e| e == prop_name) {
            continue;
        }
        collect_refs(prop, &[], out);
    }
    if let Some(items) = &schema.items {
        collect_refs(items, &[], out);
    }
    for branch in schema.composition() {
        collect_refs(branch, &[], out);
    }
    if let Some(ap) = &schema.additional_properties {
        collect_refs(ap, &[], out);
    }
}

/// Order models so a model never precedes a class it references as a field
/// type. Cycles break at the first repeated visit.
fn topo_sort(models: Vec<ModelDefinition>, aliases: &BTreeMap<String, String>) -> Vec<ModelDefinition> {
    let index: BTreeMap<&str, usize> = models
        .iter()
        .enumerate()
        .map(|(i, m)| (m.name.as_str(), i))
        .collect();
    let deps: Vec<Vec<usize>> = models
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let mut refs = Vec::new();
            if let Some(schema) = &m.schema {
                collect_refs(schema, &m.exclude_fields, &mut refs);
            }
            refs.iter()
                .filter_map(|r| aliases.get(r))
                .filter_map(|class| index.get(class.as_str()))
                .copied()
                .filter(|&d| d != i)
                .collect()
        })
        .collect();

    fn visit(
        i: usize,
        deps: &[Vec<usize>],
        visited: &mut [bool],
        on_stack: &mut [bool],
        order: &mut Vec<usize>,
    ) {
        if visited[i] || on_stack[i] {
            return;
        }
        on_stack[i] = true;
        for &d in &deps[i] {
            visit(d, deps, visited, on_stack, order);
        }
        on_stack[i] = false;
        visited[i] = true;
        order.push(i);
    }

    let mut visited = vec![false; models.len()];
    let mut on_stack = vec![false; models.len()];
    let mut order = Vec::new();
    for i in 0..models.len() {
        visit(i, &deps, &mut visited, &mut on_stack, &mut order);
    }
    order.into_iter().map(|i| models[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::bind;

    fn doc(json: &str) -> Document {
        Document::from_json(json).unwrap()
    }

    fn config(toml: &str) -> Config {
        toml.parse().unwrap()
    }

    #[test]
    fn test_structural_duplicates_collapse_to_alias() {
        let doc = doc(r##"{
            "paths": {"/v1/things": {"get": {}}},
            "components": {"schemas": {
                "Container": {"type": "object", "properties": {
                    "a": {"$ref": "#/components/schemas/ThingA"},
                    "b": {"$ref": "#/components/schemas/ThingB"}
                }},
                "ThingA": {"type": "object", "required": ["id"], "properties": {
                    "id": {"type": "string"}, "count": {"type": "integer"}
                }},
                "ThingB": {"type": "object", "required": ["id"], "properties": {
                    "count": {"type": "integer"}, "id": {"type": "string"}
                }}
            }}
        }"##);
        let config = config(
            r#"
            [sdk]
            package = "acme"

            [[packages]]
            name = "things"

            [[packages.models]]
            name = "Container"
            schema = "Container"
            "#,
        );

        let resolved = resolve_models(&doc, &config, &[]);
        let things = &resolved["things"];

        let names: Vec<&str> = things.models.iter().map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"ThingA"));
        assert!(
            !names.contains(&"ThingB"),
            "structurally identical schema must not produce a second class"
        );
        assert_eq!(things.class_for_schema("ThingB"), Some("ThingA"));
    }

    #[test]
    fn test_cycle_terminates_and_emits_both_models() {
        let doc = doc(r##"{
            "paths": {"/v1/things": {"get": {}}},
            "components": {"schemas": {
                "A": {"type": "object", "properties": {"b": {"$ref": "#/components/schemas/B"}, "tag": {"type": "string"}}},
                "B": {"type": "object", "properties": {"a": {"$ref": "#/components/schemas/A"}, "label": {"type": "integer"}}}
            }}
        }"##);
        let config = config(
            r#"
            [sdk]
            package = "acme"

            [[packages]]
            name = "things"

            [[packages.models]]
            name = "A"
            schema = "A"
            "#,
        );

        let resolved = resolve_models(&doc, &config, &[]);
        let things = &resolved["things"];
        let names: Vec<&str> = things.models.iter().map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"A"));
        assert!(names.contains(&"B"));
    }

    #[test]
    fn test_topological_order_puts_referenced_models_first() {
        let doc = doc(r##"{
            "paths": {"/v1/things": {"get": {}}},
            "components": {"schemas": {
                "Outer": {"type": "object", "properties": {"inner": {"$ref": "#/components/schemas/Inner"}}},
                "Inner": {"type": "object", "properties": {"id": {"type": "string"}}}
            }}
        }"##);
        let config = config(
            r#"
            [sdk]
            package = "things"
            [[packages]]
            name = "things"
            [[packages.models]]
            name = "Outer"
            schema = "Outer"
            "#,
        );

        let resolved = resolve_models(&doc, &config, &[]);
        let names: Vec<&str> = resolved["things"]
            .models
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["Inner", "Outer"]);
    }

    #[test]
    fn test_auto_seed_from_response_type() {
        let doc = doc(r##"{
            "paths": {"/v1/bots/{bot_id}": {"get": {
                "responses": {"200": {"content": {"application/json": {"schema": {
                    "type": "object",
                    "properties": {
                        "code": {"type": "integer"},
                        "data": {"$ref": "#/components/schemas/Bot"}
                    }
                }}}}}
            }}},
            "components": {"schemas": {
                "Bot": {"type": "object", "properties": {"bot_id": {"type": "string"}}}
            }}
        }"##);
        let config = config(
            r#"
            [sdk]
            package = "acme"

            [[packages]]
            name = "bots"

            [[mappings]]
            path = "/v1/bots/{bot_id}"
            method = "get"
            sdk_methods = ["bots.retrieve"]
            response_type = "Bot"
            "#,
        );

        let bindings = bind(&doc, &config).unwrap();
        let resolved = resolve_models(&doc, &config, &bindings);
        let bots = &resolved["bots"];
        assert!(bots.declares("Bot"));
        assert_eq!(bots.class_for_schema("Bot"), Some("Bot"));
    }

    #[test]
    fn test_excluded_fields_do_not_pull_in_models() {
        let doc = doc(r##"{
            "paths": {"/v1/things": {"get": {}}},
            "components": {"schemas": {
                "Container": {"type": "object", "properties": {
                    "visible": {"type": "string"},
                    "hidden": {"$ref": "#/components/schemas/Secret"}
                }},
                "Secret": {"type": "object", "properties": {"key": {"type": "string"}}}
            }}
        }"##);
        let config = config(
            r#"
            [sdk]
            package = "acme"
            [[packages]]
            name = "things"
            [[packages.models]]
            name = "Container"
            schema = "Container"
            exclude_fields = ["hidden"]
            "#,
        );

        let resolved = resolve_models(&doc, &config, &[]);
        assert!(!resolved["things"].declares("Secret"));
    }

    #[test]
    fn test_declarative_model_survives_without_schema() {
        let doc = doc(r#"{"paths": {"/v1/things": {"get": {}}}}"#);
        let config = config(
            r#"
            [sdk]
            package = "acme"
            [[packages]]
            name = "things"
            [[packages.models]]
            name = "AuditAction"
            declarative = true
            is_enum = true
            enum_values = ["create", "delete"]
            "#,
        );

        let resolved = resolve_models(&doc, &config, &[]);
        let model = &resolved["things"].models[0];
        assert_eq!(model.name, "AuditAction");
        assert!(model.is_enum);
        assert!(model.schema.is_none());
    }

    #[test]
    fn test_signature_ignores_property_order_but_not_required() {
        let doc = Document::default();
        let a: Schema = serde_json::from_str(
            r#"{"type": "object", "required": ["id"], "properties": {"id": {"type": "string"}, "n": {"type": "integer"}}}"#,
        )
        .unwrap();
        let b: Schema = serde_json::from_str(
            r#"{"type": "object", "required": ["id"], "properties": {"n": {"type": "integer"}, "id": {"type": "string"}}}"#,
        )
        .unwrap();
        let c: Schema = serde_json::from_str(
            r#"{"type": "object", "properties": {"n": {"type": "integer"}, "id": {"type": "string"}}}"#,
        )
        .unwrap();

        assert_eq!(structural_signature(&a, &doc), structural_signature(&b, &doc));
        assert_ne!(structural_signature(&a, &doc), structural_signature(&c, &doc));
    }
}
