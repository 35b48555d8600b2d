//! Recursive schema nodes.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// A single schema node from the document.
///
/// OpenAPI schemas are open-ended, so this is one struct with optional
/// facets rather than a strict sum type; [`Schema::kind`] classifies a node
/// into the discriminated view the rest of the engine works with.
/// Property order is preserved as written in the document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    pub format: Option<String>,
    pub description: Option<String>,
    pub properties: IndexMap<String, Schema>,
    pub required: Vec<String>,
    pub items: Option<Box<Schema>>,
    #[serde(rename = "enum")]
    pub enum_values: Vec<serde_json::Value>,
    pub all_of: Vec<Schema>,
    pub any_of: Vec<Schema>,
    pub one_of: Vec<Schema>,
    #[serde(deserialize_with = "bool_or_schema")]
    pub additional_properties: Option<Box<Schema>>,
}

/// Classified view of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind<'a> {
    /// `$ref` to another schema.
    Ref(&'a str),
    /// Inline enum.
    Enum,
    /// `allOf` / `anyOf` / `oneOf` composition.
    Composed,
    /// Array of items.
    Array,
    /// Object with (possibly zero) named properties.
    Object,
    /// `string`, `integer`, `number`, or `boolean`, with optional format.
    Primitive(&'a str),
    /// Nothing recognizable; treated as the most permissive shape.
    Unknown,
}

impl Schema {
    /// Classify this node. Facets are checked in a fixed priority order so
    /// a node carrying several of them classifies the same way every run.
    pub fn kind(&self) -> SchemaKind<'_> {
        if let Some(r) = &self.ref_path {
            return SchemaKind::Ref(r);
        }
        if !self.enum_values.is_empty() {
            return SchemaKind::Enum;
        }
        if !self.all_of.is_empty() || !self.any_of.is_empty() || !self.one_of.is_empty() {
            return SchemaKind::Composed;
        }
        match self.schema_type.as_deref() {
            Some("array") => SchemaKind::Array,
            Some("object") => SchemaKind::Object,
            Some(t @ ("string" | "integer" | "number" | "boolean")) => SchemaKind::Primitive(t),
            _ if !self.properties.is_empty() || self.additional_properties.is_some() => {
                SchemaKind::Object
            }
            _ if self.items.is_some() => SchemaKind::Array,
            _ => SchemaKind::Unknown,
        }
    }

    /// Whether a property is listed in this node's `required` set.
    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }

    /// Enum values as strings; non-string values render via JSON.
    pub fn enum_strings(&self) -> Vec<String> {
        self.enum_values
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }

    /// The composition branches, in declaration order across
    /// `allOf`, `anyOf`, and `oneOf`.
    pub fn composition(&self) -> impl Iterator<Item = &Schema> {
        self.all_of
            .iter()
            .chain(self.any_of.iter())
            .chain(self.one_of.iter())
    }
}

/// Extract the schema name from a `$ref` path
/// (e.g., `#/components/schemas/Chat` -> `Chat`).
pub fn ref_name(ref_path: &str) -> Option<&str> {
    ref_path.rsplit('/').next().filter(|n| !n.is_empty())
}

/// `additionalProperties` may be a boolean or a schema; `true` means an
/// unconstrained value schema, `false` means none.
fn bool_or_schema<'de, D>(deserializer: D) -> Result<Option<Box<Schema>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Schema(Box<Schema>),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None | Some(Raw::Bool(false)) => None,
        Some(Raw::Bool(true)) => Some(Box::default()),
        Some(Raw::Schema(s)) => Some(s),
    })
}
