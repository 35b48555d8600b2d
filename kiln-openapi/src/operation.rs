//! Flat operation records extracted from the document.

use crate::document::{Document, OperationObject, ParameterObject, PathItem, content_schema};
use crate::schema::Schema;

/// One parameter of an operation.
#[derive(Debug, Clone, Default)]
pub struct Parameter {
    pub name: String,
    pub required: bool,
    pub schema: Option<Schema>,
    pub description: Option<String>,
}

/// Everything the engine needs to know about one `(path, method)` pair.
///
/// Derived once per run from the document and treated as read-only after.
#[derive(Debug, Clone, Default)]
pub struct OperationDetails {
    pub path: String,
    /// Lowercase HTTP method.
    pub method: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub path_params: Vec<Parameter>,
    pub query_params: Vec<Parameter>,
    pub header_params: Vec<Parameter>,
    pub body_schema: Option<Schema>,
    pub response_schema: Option<Schema>,
}

impl Document {
    /// Extract every operation, sorted by `(path, method)`.
    pub fn operations(&self) -> Vec<OperationDetails> {
        let mut paths: Vec<(&String, &PathItem)> = self.paths.iter().collect();
        paths.sort_by(|a, b| a.0.cmp(b.0));

        let mut out = Vec::new();
        for (path, item) in paths {
            let mut ops: Vec<(&'static str, &OperationObject)> = item.operations().collect();
            ops.sort_by_key(|(method, _)| *method);
            for (method, op) in ops {
                out.push(extract(path, method, op, &item.parameters));
            }
        }
        out
    }
}

fn extract(
    path: &str,
    method: &str,
    op: &OperationObject,
    shared_params: &[ParameterObject],
) -> OperationDetails {
    let mut details = OperationDetails {
        path: path.to_string(),
        method: method.to_string(),
        operation_id: op.operation_id.clone(),
        summary: op.summary.clone(),
        description: op.description.clone(),
        ..OperationDetails::default()
    };

    for p in shared_params.iter().chain(op.parameters.iter()) {
        let param = Parameter {
            name: p.name.clone(),
            // Path parameters are always required regardless of what the
            // document claims.
            required: p.required || p.location == "path",
            schema: p.schema.clone(),
            description: p.description.clone(),
        };
        match p.location.as_str() {
            "path" => details.path_params.push(param),
            "header" => details.header_params.push(param),
            _ => details.query_params.push(param),
        }
    }

    if let Some(body) = &op.request_body {
        details.body_schema = content_schema(&body.content).cloned();
    }
    details.response_schema = response_schema(op).cloned();

    details
}

/// The success response schema: `200`, then `201`, then any `2xx` in sorted
/// order, then `default`. An operation without one yields a bodiless
/// success response downstream rather than being dropped.
fn response_schema(op: &OperationObject) -> Option<&Schema> {
    for code in ["200", "201"] {
        if let Some(resp) = op.responses.get(code) {
            if let Some(schema) = content_schema(&resp.content) {
                return Some(schema);
            }
        }
    }
    let mut codes: Vec<&String> = op
        .responses
        .keys()
        .filter(|c| c.starts_with('2') || c.as_str() == "default")
        .collect();
    codes.sort();
    codes
        .into_iter()
        .filter_map(|c| op.responses.get(c))
        .find_map(|resp| content_schema(&resp.content))
}
