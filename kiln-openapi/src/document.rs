//! The top-level document and its `$ref` table.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::schema::{Schema, ref_name};

/// An OpenAPI-like document: `paths` plus the named schema table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Document {
    pub paths: IndexMap<String, PathItem>,
    pub components: Components,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Components {
    pub schemas: IndexMap<String, Schema>,
}

/// One path entry with its per-method operations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathItem {
    pub get: Option<OperationObject>,
    pub put: Option<OperationObject>,
    pub post: Option<OperationObject>,
    pub delete: Option<OperationObject>,
    pub patch: Option<OperationObject>,
    /// Parameters shared by every operation under this path.
    pub parameters: Vec<ParameterObject>,
}

impl PathItem {
    /// The operations present on this path, in a fixed method order.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &OperationObject)> {
        [
            ("get", &self.get),
            ("post", &self.post),
            ("put", &self.put),
            ("patch", &self.patch),
            ("delete", &self.delete),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperationObject {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<ParameterObject>,
    pub request_body: Option<RequestBody>,
    pub responses: IndexMap<String, ResponseObject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParameterObject {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub description: Option<String>,
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequestBody {
    pub required: bool,
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResponseObject {
    pub description: Option<String>,
    pub content: IndexMap<String, MediaType>,
}

impl Document {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Resolve a `$ref` path against the schema table.
    pub fn resolve_ref(&self, ref_path: &str) -> Option<&Schema> {
        self.components.schemas.get(ref_name(ref_path)?)
    }

    /// Follow `$ref` indirection until a concrete node is reached.
    ///
    /// Unresolvable or overly deep chains return the last node reached, so
    /// callers degrade to a permissive type instead of failing.
    pub fn resolve<'a>(&'a self, schema: &'a Schema) -> &'a Schema {
        let mut current = schema;
        for _ in 0..16 {
            match &current.ref_path {
                Some(r) => match self.resolve_ref(r) {
                    Some(next) => current = next,
                    None => return current,
                },
                None => return current,
            }
        }
        current
    }

    /// The name a schema resolves to, when its `$ref` target is in the table.
    pub fn schema_name_of<'a>(&self, schema: &'a Schema) -> Option<&'a str> {
        let name = ref_name(schema.ref_path.as_deref()?)?;
        self.components.schemas.contains_key(name).then_some(name)
    }
}

/// Pick a schema from a content map, preferring `application/json`; other
/// media types are considered in sorted order so selection is stable.
pub(crate) fn content_schema(content: &IndexMap<String, MediaType>) -> Option<&Schema> {
    if let Some(media) = content.get("application/json") {
        if media.schema.is_some() {
            return media.schema.as_ref();
        }
    }
    let mut keys: Vec<&String> = content.keys().collect();
    keys.sort();
    keys.into_iter()
        .filter_map(|k| content.get(k))
        .find_map(|media| media.schema.as_ref())
}
