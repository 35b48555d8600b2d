//! Per-operation mapping records.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Declarative override for how one document operation becomes SDK methods.
///
/// Everything is optional; an absent facet falls back to what the operation
/// details imply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationMapping {
    /// Operation path, e.g. `/v3/chat`.
    pub path: String,
    /// Lowercase HTTP method.
    pub method: String,
    /// `package.method` targets; each produces one binding.
    pub sdk_methods: Vec<String>,
    /// Explicit body field names; overrides the full-body field set.
    pub body_fields: Vec<String>,
    /// Explicit query field names; overrides the operation's query params.
    pub query_fields: Vec<String>,
    /// Multipart file field names.
    pub file_fields: Vec<String>,
    /// Field -> Python literal, rendered into the request verbatim.
    pub fixed_values: BTreeMap<String, String>,
    /// Field -> Python literal used as the parameter default.
    pub default_values: BTreeMap<String, String>,
    pub pagination: PaginationMode,
    /// Overrides for the paged response field names
    /// (`items` / `has_more` / `next_page_token` / `total` / `first_id` / `last_id`).
    pub page_fields: BTreeMap<String, String>,
    /// Response model class name override.
    pub response_type: Option<String>,
    pub body_builder: BodyBuilder,
    pub streaming: Option<StreamingConfig>,
    /// HTTP method actually sent, when it differs from the document.
    pub http_method_override: Option<String>,
    /// The operation may be absent from the document; details are then
    /// manufactured from `path` alone.
    pub allow_missing: bool,
    /// Explicit ordering among a package's methods; discovery order when absent.
    pub order: Option<u32>,
    pub targets: Targets,
    /// Manual docstring, used only when the document offers no text.
    pub doc_override: Option<String>,
    /// Drop the document's text for this operation entirely.
    pub ignore_swagger_doc: bool,
}

/// Pagination shape of the operation's response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationMode {
    #[default]
    None,
    Token,
    Number,
    NumberHasMore,
    LastId,
}

/// How the request body/query dict is assembled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyBuilder {
    DumpExcludeNone,
    #[default]
    RemoveNoneValues,
    Raw,
}

/// Which generated client classes the binding lands in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Targets {
    #[default]
    Both,
    Sync,
    Async,
}

impl Targets {
    pub fn includes_sync(self) -> bool {
        matches!(self, Targets::Both | Targets::Sync)
    }

    pub fn includes_async(self) -> bool {
        matches!(self, Targets::Both | Targets::Async)
    }
}

/// Streaming response wrapping.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamingConfig {
    /// Wrap the raw iterator response in a stream type.
    pub wrap: bool,
    /// Event field allow-list passed to the stream wrapper.
    pub fields: Vec<String>,
    /// Event-parsing handler referenced by the wrapper.
    pub handler: Option<String>,
}

/// Reference to one or more document operations, used by ignore rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationRef {
    pub path: String,
    /// Restrict to one method; any method when absent.
    pub method: Option<String>,
    /// Match every operation whose path starts with `path`.
    pub prefix: bool,
}

impl OperationRef {
    /// Whether this rule covers the given operation.
    pub fn matches(&self, path: &str, method: &str) -> bool {
        let path_ok = if self.prefix {
            path.starts_with(&self.path)
        } else {
            path == self.path
        };
        let method_ok = self
            .method
            .as_deref()
            .is_none_or(|m| m.eq_ignore_ascii_case(method));
        path_ok && method_ok
    }
}

impl OperationMapping {
    /// Whether this mapping covers the given operation.
    pub fn matches(&self, path: &str, method: &str) -> bool {
        self.path == path && self.method.eq_ignore_ascii_case(method)
    }

    /// A page-field override, falling back to the given default.
    pub fn page_field(&self, role: &str, default: &str) -> String {
        self.page_fields
            .get(role)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}
