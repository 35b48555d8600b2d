//! Package and model configuration.

use kiln_core::to_pascal_case;
use serde::Deserialize;

/// One generated SDK package (a dotted name nests client ownership,
/// e.g. `workflows.runs` hangs off `workflows`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Package {
    pub name: String,
    /// Output directory relative to the SDK root; derived from `name`
    /// (dots become separators) when absent.
    pub source_dir: Option<String>,
    /// Sync client class name; `{PascalName}Client` when absent.
    pub client_class: Option<String>,
    /// Model declarations; an empty list triggers response-type
    /// auto-seeding from this package's bindings.
    #[serde(rename = "models")]
    pub model_schemas: Vec<ModelSchema>,
    /// Verbatim method blocks spliced into the sync client class body.
    pub sync_extra_methods: Vec<String>,
    /// Verbatim method blocks spliced into the async client class body.
    pub async_extra_methods: Vec<String>,
    /// Verbatim module-level blocks (helper functions, stream handlers)
    /// emitted between the models and the clients.
    pub module_code: Vec<String>,
}

impl Package {
    /// Output directory segments for this package.
    pub fn dir_segments(&self) -> Vec<String> {
        match &self.source_dir {
            Some(dir) => dir.split('/').map(str::to_string).collect(),
            None => self.name.split('.').map(str::to_string).collect(),
        }
    }

    /// Sync client class name.
    pub fn client_class_name(&self) -> String {
        self.client_class
            .clone()
            .unwrap_or_else(|| format!("{}Client", to_pascal_case(&self.name)))
    }

    /// Async client class name.
    pub fn async_client_class_name(&self) -> String {
        format!("Async{}", self.client_class_name())
    }

    /// The dotted parent package name, if this is a child package.
    pub fn parent_name(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(parent, _)| parent)
    }

    /// The last segment of the dotted name (the client property name on
    /// the parent).
    pub fn leaf_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// One model declaration inside a package.
///
/// Schema-backed (`schema` names a document schema) or purely declarative
/// (`declarative = true`, e.g. hand-authored enums).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSchema {
    pub name: String,
    /// Document schema name backing this model.
    pub schema: Option<String>,
    /// Allow this model to have no schema at all.
    pub declarative: bool,
    pub is_enum: bool,
    /// Members for declarative enums.
    pub enum_values: Vec<String>,
    /// Base classes as written into the class header.
    pub base_classes: Vec<String>,
    /// Explicit field emission order; unlisted fields follow in schema order.
    pub field_order: Vec<String>,
    /// Schema properties not emitted as fields.
    pub exclude_fields: Vec<String>,
    #[serde(rename = "fields")]
    pub field_overrides: Vec<FieldOverride>,
    /// Verbatim `name: Type = default` lines appended to the class body.
    pub extra_fields: Vec<String>,
    /// Verbatim method blocks appended to the class body.
    pub builders: Vec<String>,
    /// Verbatim validator blocks appended to the class body.
    pub validators: Vec<String>,
}

/// Per-field override on a schema-backed model.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldOverride {
    /// Schema property this override applies to.
    pub name: String,
    /// Emitted field name, when renamed.
    pub rename: Option<String>,
    /// Python type expression override.
    #[serde(rename = "type")]
    pub type_expr: Option<String>,
    /// Python literal default override.
    pub default: Option<String>,
    /// Field doc-comment override.
    pub doc: Option<String>,
}

impl ModelSchema {
    /// The override record for a schema property, if any.
    pub fn override_for(&self, field: &str) -> Option<&FieldOverride> {
        self.field_overrides.iter().find(|o| o.name == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_segments_from_dotted_name() {
        let pkg = Package {
            name: "workflows.runs".into(),
            ..Package::default()
        };
        assert_eq!(pkg.dir_segments(), vec!["workflows", "runs"]);
    }

    #[test]
    fn test_dir_segments_explicit() {
        let pkg = Package {
            name: "chat".into(),
            source_dir: Some("chat/v3".into()),
            ..Package::default()
        };
        assert_eq!(pkg.dir_segments(), vec!["chat", "v3"]);
    }

    #[test]
    fn test_client_class_names() {
        let pkg = Package {
            name: "workflows.runs".into(),
            ..Package::default()
        };
        assert_eq!(pkg.client_class_name(), "WorkflowsRunsClient");
        assert_eq!(pkg.async_client_class_name(), "AsyncWorkflowsRunsClient");

        let custom = Package {
            name: "chat".into(),
            client_class: Some("ChatV3Client".into()),
            ..Package::default()
        };
        assert_eq!(custom.client_class_name(), "ChatV3Client");
        assert_eq!(custom.async_client_class_name(), "AsyncChatV3Client");
    }

    #[test]
    fn test_parent_and_leaf() {
        let child = Package {
            name: "workflows.runs".into(),
            ..Package::default()
        };
        assert_eq!(child.parent_name(), Some("workflows"));
        assert_eq!(child.leaf_name(), "runs");

        let top = Package {
            name: "chat".into(),
            ..Package::default()
        };
        assert_eq!(top.parent_name(), None);
        assert_eq!(top.leaf_name(), "chat");
    }

    #[test]
    fn test_model_schema_parse() {
        let model: ModelSchema = toml::from_str(
            r#"
            name = "Chat"
            schema = "Chat"
            exclude_fields = ["internal_state"]

            [[fields]]
            name = "id"
            doc = "Unique chat id."
            "#,
        )
        .unwrap();

        assert_eq!(model.name, "Chat");
        assert!(model.override_for("id").is_some());
        assert!(model.override_for("missing").is_none());
    }
}
