//! Engine data model: bindings, model definitions, package metadata.

use std::collections::{BTreeMap, BTreeSet};

use kiln_config::{
    Config, FieldOverride, ModelSchema, OperationMapping, PaginationMode, Targets,
};
use kiln_core::to_pascal_case;
use kiln_openapi::{OperationDetails, Schema};

/// One generated method: an operation bound to a package/method name.
///
/// Several bindings may share one [`OperationDetails`] (sync/async pair,
/// multiple SDK methods mapped to one endpoint).
#[derive(Debug, Clone)]
pub struct OperationBinding {
    pub package: String,
    /// Requested name, before collision suffixing.
    pub method_name: String,
    /// Final name in the sync client, when the binding targets it.
    pub sync_name: Option<String>,
    /// Final name in the async client, when the binding targets it.
    pub async_name: Option<String>,
    pub details: OperationDetails,
    pub mapping: Option<OperationMapping>,
    /// Mapping-declared order; bindings carrying one sort ahead of the rest.
    pub order: Option<u32>,
    /// Discovery order, the fallback sort key.
    pub seq: u32,
}

impl OperationBinding {
    pub fn pagination(&self) -> PaginationMode {
        self.mapping
            .as_ref()
            .map(|m| m.pagination)
            .unwrap_or_default()
    }

    pub fn targets(&self) -> Targets {
        self.mapping
            .as_ref()
            .map(|m| m.targets)
            .unwrap_or_default()
    }

    /// The HTTP method actually sent: the mapping override wins.
    pub fn http_method(&self) -> &str {
        self.mapping
            .as_ref()
            .and_then(|m| m.http_method_override.as_deref())
            .unwrap_or(&self.details.method)
    }
}

/// A model to emit in a package: schema-backed or purely declarative.
#[derive(Debug, Clone, Default)]
pub struct ModelDefinition {
    pub name: String,
    /// Document schema this model was derived from, when schema-backed.
    pub schema_name: Option<String>,
    pub schema: Option<Schema>,
    pub is_enum: bool,
    /// Members for declarative enums (schema enums read their own values).
    pub enum_values: Vec<String>,
    pub base_classes: Vec<String>,
    pub field_order: Vec<String>,
    pub exclude_fields: Vec<String>,
    pub field_overrides: Vec<FieldOverride>,
    pub extra_fields: Vec<String>,
    pub builders: Vec<String>,
    pub validators: Vec<String>,
}

impl ModelDefinition {
    /// Build from an explicit config entry, with its resolved schema.
    pub fn from_config(config: &ModelSchema, schema: Option<Schema>) -> Self {
        let is_enum = config.is_enum
            || schema
                .as_ref()
                .is_some_and(|s| !s.enum_values.is_empty());
        Self {
            name: config.name.clone(),
            schema_name: config.schema.clone(),
            schema,
            is_enum,
            enum_values: config.enum_values.clone(),
            base_classes: config.base_classes.clone(),
            field_order: config.field_order.clone(),
            exclude_fields: config.exclude_fields.clone(),
            field_overrides: config.field_overrides.clone(),
            extra_fields: config.extra_fields.clone(),
            builders: config.builders.clone(),
            validators: config.validators.clone(),
        }
    }

    /// Build a plain schema-backed model discovered during closure.
    pub fn schema_backed(name: impl Into<String>, schema_name: impl Into<String>, schema: Schema) -> Self {
        let is_enum = !schema.enum_values.is_empty();
        Self {
            name: name.into(),
            schema_name: Some(schema_name.into()),
            schema: Some(schema),
            is_enum,
            ..Self::default()
        }
    }

    pub fn override_for(&self, field: &str) -> Option<&FieldOverride> {
        self.field_overrides.iter().find(|o| o.name == field)
    }
}

/// The resolved, ordered model set of one package.
#[derive(Debug, Clone, Default)]
pub struct PackageModels {
    /// Topologically ordered: a model never precedes a model it references.
    pub models: Vec<ModelDefinition>,
    /// Schema name -> emitted class name, including collapsed duplicates.
    pub aliases: BTreeMap<String, String>,
    /// Names declared by the package's own model config (generated paged
    /// classes must never collide with these).
    pub config_declared: BTreeSet<String>,
}

impl PackageModels {
    pub fn declares(&self, name: &str) -> bool {
        self.models.iter().any(|m| m.name == name)
    }

    /// The emitted class name for a document schema, when one exists.
    pub fn class_for_schema(&self, schema_name: &str) -> Option<&str> {
        self.aliases.get(schema_name).map(String::as_str)
    }
}

/// Derived metadata for one output package.
#[derive(Debug, Clone)]
pub struct PackageMeta {
    pub name: String,
    /// Output directory relative to the SDK root, e.g. `workflows/runs`.
    pub dir: String,
    pub client_class: String,
    pub async_client_class: String,
    /// Child client links exposed as lazy properties on this package's client.
    pub children: Vec<ChildLink>,
}

/// A parent-to-child client link (`workflows` -> `workflows.runs`).
#[derive(Debug, Clone)]
pub struct ChildLink {
    /// Property name on the parent client.
    pub property: String,
    /// Child package name.
    pub package: String,
}

/// Build metadata for every named package, in the given order.
///
/// Packages without a config entry (defaulted by the binder) get derived
/// names. Child links are inferred from dotted package names.
pub fn package_metas(config: &Config, package_names: &[String]) -> Vec<PackageMeta> {
    package_names
        .iter()
        .map(|name| {
            let (dir, client_class, async_client_class) = match config.package(name) {
                Some(pkg) => (
                    pkg.dir_segments().join("/"),
                    pkg.client_class_name(),
                    pkg.async_client_class_name(),
                ),
                None => {
                    let class = format!("{}Client", to_pascal_case(name));
                    (
                        name.split('.').collect::<Vec<_>>().join("/"),
                        class.clone(),
                        format!("Async{}", class),
                    )
                }
            };
            let prefix = format!("{}.", name);
            let children = package_names
                .iter()
                .filter(|child| {
                    child.starts_with(&prefix) && !child[prefix.len()..].contains('.')
                })
                .map(|child| ChildLink {
                    property: child[prefix.len()..].to_string(),
                    package: child.clone(),
                })
                .collect();
            PackageMeta {
                name: name.clone(),
                dir,
                client_class,
                async_client_class,
                children,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_metas_children() {
        let config = Config::default();
        let names = vec![
            "workflows".to_string(),
            "workflows.runs".to_string(),
            "chat".to_string(),
        ];
        let metas = package_metas(&config, &names);

        let workflows = metas.iter().find(|m| m.name == "workflows").unwrap();
        assert_eq!(workflows.children.len(), 1);
        assert_eq!(workflows.children[0].property, "runs");
        assert_eq!(workflows.children[0].package, "workflows.runs");

        let runs = metas.iter().find(|m| m.name == "workflows.runs").unwrap();
        assert_eq!(runs.dir, "workflows/runs");
        assert_eq!(runs.client_class, "WorkflowsRunsClient");
        assert!(runs.children.is_empty());
    }

    #[test]
    fn test_binding_http_method_override() {
        let binding = OperationBinding {
            package: "chat".into(),
            method_name: "cancel".into(),
            sync_name: None,
            async_name: None,
            details: OperationDetails {
                method: "get".into(),
                ..OperationDetails::default()
            },
            mapping: Some(OperationMapping {
                http_method_override: Some("post".into()),
                ..OperationMapping::default()
            }),
            order: None,
            seq: 0,
        };
        assert_eq!(binding.http_method(), "post");
    }

    #[test]
    fn test_model_from_config_enum_detection() {
        let schema: Schema =
            serde_json::from_str(r#"{"type": "string", "enum": ["a", "b"]}"#).unwrap();
        let model = ModelDefinition::from_config(
            &ModelSchema {
                name: "Status".into(),
                schema: Some("Status".into()),
                ..ModelSchema::default()
            },
            Some(schema),
        );
        assert!(model.is_enum);
    }
}
