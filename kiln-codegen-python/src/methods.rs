//! Client method rendering: signatures, request construction, streaming.

use kiln_codegen::pagination::PagedKind;
use kiln_codegen::{CodeBuilder, OperationBinding};
use kiln_config::{BodyBuilder, StreamingConfig};
use kiln_openapi::Parameter;

use crate::context::PackageContext;
use crate::docstrings::method_docstring;
use crate::naming::safe_name;
use crate::type_mapper::optional;

/// Query parameter names that drive pagination; they always sort to the
/// end of the signature.
static PAGE_PARAM_NAMES: &[&str] = &[
    "page_num",
    "page_size",
    "page_token",
    "limit",
    "offset",
    "before_id",
    "after_id",
];

fn is_page_param(name: &str) -> bool {
    PAGE_PARAM_NAMES.contains(&name)
}

/// Expanded multi-line signatures kick in above this many parameters
/// (`self` and `**kwargs` not counted).
const COMPACT_SIGNATURE_LIMIT: usize = 3;

/// One rendered method parameter.
#[derive(Debug, Clone)]
pub struct Param {
    /// Python argument name (reserved words escaped).
    pub name: String,
    /// Name on the wire: dict key in the request body or query.
    pub wire_name: String,
    pub type_expr: String,
    pub default: Option<String>,
    pub doc: Option<String>,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Path,
    Query,
    Body,
    File,
    /// Whole-body pass-through dict.
    RawBody,
}

/// Build the parameter list for a binding, in signature order: path params
/// first, then query params (required, optional, optional-with-default,
/// paging last), then body and file fields.
pub fn build_params(ctx: &PackageContext, binding: &OperationBinding) -> Vec<Param> {
    let mapper = ctx.mapper();
    let mapping = binding.mapping.as_ref();
    let details = &binding.details;
    let empty = Default::default();
    let defaults = mapping.map(|m| &m.default_values).unwrap_or(&empty);
    let fixed: Vec<&str> = mapping
        .map(|m| m.fixed_values.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let mut params = Vec::new();

    for p in &details.path_params {
        params.push(Param {
            name: safe_name(&p.name),
            wire_name: p.name.clone(),
            type_expr: mapper.type_for_opt(p.schema.as_ref()),
            default: None,
            doc: p.description.clone(),
            kind: ParamKind::Path,
        });
    }

    // Explicit query field list wins over the operation's own parameter set.
    let query: Vec<Parameter> = match mapping.filter(|m| !m.query_fields.is_empty()) {
        Some(m) => m
            .query_fields
            .iter()
            .map(|name| {
                details
                    .query_params
                    .iter()
                    .find(|p| p.name == *name)
                    .cloned()
                    .unwrap_or_else(|| Parameter {
                        name: name.clone(),
                        ..Parameter::default()
                    })
            })
            .collect(),
        None => details.query_params.clone(),
    };
    let mut query: Vec<(usize, Parameter)> = query
        .into_iter()
        .filter(|p| !fixed.contains(&p.name.as_str()))
        .enumerate()
        .collect();
    let group = |p: &Parameter| -> u8 {
        if is_page_param(&p.name) {
            3
        } else if defaults.contains_key(&p.name) {
            2
        } else if p.required {
            0
        } else {
            1
        }
    };
    query.sort_by_key(|(i, p)| (group(p), *i));
    for (_, p) in query {
        let base = mapper.type_for_opt(p.schema.as_ref());
        let default = match defaults.get(&p.name) {
            Some(d) => Some(d.clone()),
            None if p.required => None,
            None => Some("None".to_string()),
        };
        let type_expr = if p.required && default.is_none() {
            base
        } else {
            optional(&base)
        };
        params.push(Param {
            name: safe_name(&p.name),
            wire_name: p.name.clone(),
            type_expr,
            default,
            doc: p.description.clone(),
            kind: ParamKind::Query,
        });
    }

    // Body: explicit field list, else the schema's own properties, else a
    // whole-body pass-through dict.
    if let Some(body) = &details.body_schema {
        let resolved = ctx.doc.resolve(body).clone();
        let field_names: Vec<String> = match mapping.filter(|m| !m.body_fields.is_empty()) {
            Some(m) => m.body_fields.clone(),
            None => resolved.properties.keys().cloned().collect(),
        };
        if field_names.is_empty() {
            params.push(Param {
                name: "body".to_string(),
                wire_name: "body".to_string(),
                type_expr: "Dict[str, Any]".to_string(),
                default: None,
                doc: None,
                kind: ParamKind::RawBody,
            });
        } else {
            for name in field_names {
                if fixed.contains(&name.as_str()) {
                    continue;
                }
                let prop = resolved.properties.get(&name);
                let required = resolved.is_required(&name);
                let base = prop
                    .map(|p| mapper.type_for(p))
                    .unwrap_or_else(|| "Any".to_string());
                let default = match defaults.get(&name) {
                    Some(d) => Some(d.clone()),
                    None if required => None,
                    None => Some("None".to_string()),
                };
                let type_expr = if required && default.is_none() {
                    base
                } else {
                    optional(&base)
                };
                params.push(Param {
                    name: safe_name(&name),
                    wire_name: name.clone(),
                    type_expr,
                    default,
                    doc: prop.and_then(|p| p.description.clone()),
                    kind: ParamKind::Body,
                });
            }
        }
    }

    if let Some(m) = mapping {
        for name in &m.file_fields {
            params.push(Param {
                name: safe_name(name),
                wire_name: name.clone(),
                type_expr: "Any".to_string(),
                default: None,
                doc: None,
                kind: ParamKind::File,
            });
        }
    }

    params
}

/// Render one method into the current class body.
pub fn render_method(
    b: &mut CodeBuilder,
    ctx: &PackageContext,
    binding: &OperationBinding,
    method_name: &str,
    is_async: bool,
) {
    let params = build_params(ctx, binding);
    let return_type = return_type(ctx, binding, is_async);
    let class_name = if is_async {
        &ctx.meta.async_client_class
    } else {
        &ctx.meta.client_class
    };

    render_signature(b, method_name, &params, &return_type, is_async);
    b.push_indent();

    if let Some(doc) = method_docstring(ctx, binding, &params, class_name, method_name) {
        b.push_docstring(&doc);
    }

    if delegates_to_private_create(ctx, binding, method_name, is_async) {
        let mut args: Vec<String> = params
            .iter()
            .map(|p| format!("{}={}", p.name, p.name))
            .collect();
        args.push(format!(
            "stream={}",
            if method_name == "stream" { "True" } else { "False" }
        ));
        args.push("**kwargs".to_string());
        let awaited = if is_async { "await " } else { "" };
        b.push_line(&format!(
            "return {}self._create({})",
            awaited,
            args.join(", ")
        ));
        b.push_dedent();
        return;
    }

    render_request(b, ctx, binding, &params, &return_type, is_async);
    b.push_dedent();
}

fn render_signature(
    b: &mut CodeBuilder,
    method_name: &str,
    params: &[Param],
    return_type: &str,
    is_async: bool,
) {
    let def_kw = if is_async { "async def" } else { "def" };
    let rendered: Vec<String> = params.iter().map(render_param).collect();

    if params.is_empty() {
        b.push_line(&format!(
            "{} {}(self, **kwargs) -> {}:",
            def_kw, method_name, return_type
        ));
        return;
    }
    if params.len() <= COMPACT_SIGNATURE_LIMIT {
        b.push_line(&format!(
            "{} {}(self, *, {}, **kwargs) -> {}:",
            def_kw,
            method_name,
            rendered.join(", "),
            return_type
        ));
        return;
    }
    b.push_line(&format!("{} {}(", def_kw, method_name));
    b.push_indent();
    b.push_line("self,");
    b.push_line("*,");
    for p in &rendered {
        b.push_line(&format!("{},", p));
    }
    b.push_line("**kwargs,");
    b.push_dedent();
    b.push_line(&format!(") -> {}:", return_type));
}

fn render_param(p: &Param) -> String {
    match &p.default {
        Some(d) => format!("{}: {} = {}", p.name, p.type_expr, d),
        None => format!("{}: {}", p.name, p.type_expr),
    }
}

fn render_request(
    b: &mut CodeBuilder,
    ctx: &PackageContext,
    binding: &OperationBinding,
    params: &[Param],
    return_type: &str,
    is_async: bool,
) {
    let mapping = binding.mapping.as_ref();
    let builder = mapping.map(|m| m.body_builder).unwrap_or_default();
    let streaming = mapping
        .and_then(|m| m.streaming.as_ref())
        .filter(|s| s.wrap);

    b.push_line(&format!(
        "url = f\"{{self._base_url}}{}\"",
        binding.details.path
    ));
    b.push_line("headers: Optional[dict] = kwargs.get(\"headers\")");

    // Fixed literals join the dict their field list assigns them to.
    let in_query = |name: &str| {
        mapping.is_some_and(|m| m.query_fields.iter().any(|f| f.as_str() == name))
    };
    let mut query_entries: Vec<(String, String)> = params
        .iter()
        .filter(|p| p.kind == ParamKind::Query)
        .map(|p| (p.wire_name.clone(), p.name.clone()))
        .collect();
    let mut body_entries: Vec<(String, String)> = params
        .iter()
        .filter(|p| p.kind == ParamKind::Body)
        .map(|p| (p.wire_name.clone(), p.name.clone()))
        .collect();
    if let Some(m) = mapping {
        for (field, literal) in &m.fixed_values {
            if in_query(field) {
                query_entries.push((field.clone(), literal.clone()));
            } else {
                body_entries.push((field.clone(), literal.clone()));
            }
        }
    }
    let file_entries: Vec<(String, String)> = params
        .iter()
        .filter(|p| p.kind == ParamKind::File)
        .map(|p| (p.wire_name.clone(), p.name.clone()))
        .collect();
    let raw_body = params.iter().any(|p| p.kind == ParamKind::RawBody);

    if !query_entries.is_empty() {
        render_dict(b, "params", &query_entries, builder);
    }
    if raw_body {
        match builder {
            BodyBuilder::Raw => {}
            BodyBuilder::RemoveNoneValues => {
                b.push_line("body = remove_none_values(body)");
            }
            BodyBuilder::DumpExcludeNone => {
                b.push_line("body = dump_exclude_none(body)");
            }
        }
    } else if !body_entries.is_empty() {
        render_dict(b, "body", &body_entries, builder);
    }
    if !file_entries.is_empty() {
        let rendered: Vec<String> = file_entries
            .iter()
            .map(|(k, v)| format!("\"{}\": {}", k, v))
            .collect();
        b.push_line(&format!("files = {{{}}}", rendered.join(", ")));
    }

    let has_body = raw_body || !body_entries.is_empty();
    let mut call_kwargs = vec!["headers=headers".to_string()];
    if !query_entries.is_empty() {
        call_kwargs.push("params=params".to_string());
    }
    if has_body {
        call_kwargs.push("body=body".to_string());
    }
    if !file_entries.is_empty() {
        call_kwargs.push("files=files".to_string());
    }

    let http_method = binding.http_method().to_lowercase();
    let requester_call = |cast: &str, stream: bool| {
        let call_fn = if is_async {
            "await self._requester.arequest"
        } else {
            "self._requester.request"
        };
        format!(
            "{}(\"{}\", url, {}, {}, {})",
            call_fn,
            http_method,
            if stream { "True" } else { "False" },
            cast,
            call_kwargs.join(", ")
        )
    };

    if let Some(stream_config) = streaming {
        b.push_line(&format!("resp = {}", requester_call("None", true)));
        b.push_line(&format!(
            "return {}({})",
            if is_async { "AsyncStream" } else { "Stream" },
            stream_wrapper_args(stream_config)
        ));
        return;
    }

    let cast = cast_expr(return_type);
    b.push_line(&format!("return {}", requester_call(&cast, false)));
}

fn stream_wrapper_args(config: &StreamingConfig) -> String {
    let fields = if config.fields.is_empty() {
        vec!["event".to_string(), "data".to_string()]
    } else {
        config.fields.clone()
    };
    let rendered: Vec<String> = fields.iter().map(|f| format!("\"{}\"", f)).collect();
    let mut args = format!("resp, fields=[{}]", rendered.join(", "));
    if let Some(handler) = &config.handler {
        args.push_str(&format!(", handler={}", handler));
    }
    args
}

fn render_dict(b: &mut CodeBuilder, var: &str, entries: &[(String, String)], builder: BodyBuilder) {
    let (open, close) = match builder {
        BodyBuilder::DumpExcludeNone => (format!("{} = dump_exclude_none({{", var), "})"),
        BodyBuilder::RemoveNoneValues => (format!("{} = remove_none_values({{", var), "})"),
        BodyBuilder::Raw => (format!("{} = {{", var), "}"),
    };
    b.push_line(&open);
    b.push_indent();
    for (key, value) in entries {
        b.push_line(&format!("\"{}\": {},", key, value));
    }
    b.push_dedent();
    b.push_line(close);
}

/// The rendered return type of a binding's method.
pub fn return_type(ctx: &PackageContext, binding: &OperationBinding, is_async: bool) -> String {
    let streaming = binding
        .mapping
        .as_ref()
        .and_then(|m| m.streaming.as_ref())
        .is_some_and(|s| s.wrap);
    if streaming {
        return if is_async { "AsyncStream" } else { "Stream" }.to_string();
    }
    if let Some(rt) = binding.mapping.as_ref().and_then(|m| m.response_type.clone()) {
        return rt;
    }
    if PagedKind::from_mode(binding.pagination()).is_some() {
        return "Dict[str, Any]".to_string();
    }
    match kiln_codegen::response_model_schema(ctx.doc, &binding.details) {
        None => "None".to_string(),
        Some((Some(name), schema)) => match ctx.models.class_for_schema(&name) {
            Some(class) => class.to_string(),
            None => ctx.mapper().type_for(&schema),
        },
        Some((None, schema)) => ctx.mapper().type_for(&schema),
    }
}

/// The cast argument handed to the requester: a bare class name casts the
/// response data, anything else leaves it raw.
fn cast_expr(return_type: &str) -> String {
    let is_class = kiln_core::is_identifier(return_type)
        && return_type.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && return_type != "None";
    if is_class {
        return_type.to_string()
    } else {
        "None".to_string()
    }
}

/// Sibling `create`/`stream` methods delegate to a config-supplied private
/// `_create` instead of duplicating request construction.
fn delegates_to_private_create(
    ctx: &PackageContext,
    _binding: &OperationBinding,
    method_name: &str,
    is_async: bool,
) -> bool {
    if method_name != "create" && method_name != "stream" {
        return false;
    }
    let has_both = ["create", "stream"].iter().all(|wanted| {
        ctx.bindings.iter().any(|b| {
            let name = if is_async { &b.async_name } else { &b.sync_name };
            name.as_deref() == Some(wanted)
        })
    });
    if !has_both {
        return false;
    }
    let extras = if is_async {
        ctx.async_extra_methods()
    } else {
        ctx.sync_extra_methods()
    };
    extras.iter().any(|block| block.contains("def _create("))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_codegen::{bind, package_metas, resolve_models};
    use kiln_config::Config;
    use kiln_openapi::Document;

    fn render_first(doc_json: &str, config_toml: &str, is_async: bool) -> String {
        let doc = Document::from_json(doc_json).unwrap();
        let config: Config = config_toml.parse().unwrap();
        let bindings = bind(&doc, &config).unwrap();
        let models = resolve_models(&doc, &config, &bindings);
        let package = bindings[0].package.clone();
        let metas = package_metas(&config, &[package.clone()]);
        let ctx = PackageContext {
            doc: &doc,
            config: &config,
            meta: &metas[0],
            metas: &metas,
            models: &models[&package],
            bindings: bindings.iter().collect(),
        };
        let mut b = CodeBuilder::python();
        let binding = &bindings[0];
        let name = if is_async {
            binding.async_name.clone().unwrap()
        } else {
            binding.sync_name.clone().unwrap()
        };
        render_method(&mut b, &ctx, binding, &name, is_async);
        b.build()
    }

    const CHAT_DOC: &str = r#"{
        "paths": {"/v3/chat": {"post": {
            "summary": "Create a chat.",
            "requestBody": {"content": {"application/json": {"schema": {
                "type": "object",
                "required": ["bot_id"],
                "properties": {
                    "bot_id": {"type": "string"},
                    "user_id": {"type": "string"}
                }
            }}}}
        }}}
    }"#;

    const CHAT_CONFIG: &str = r#"
        [sdk]
        package = "acme"

        [[packages]]
        name = "chat"

        [[mappings]]
        path = "/v3/chat"
        method = "post"
        sdk_methods = ["chat.create"]
    "#;

    #[test]
    fn test_sync_method_rendering() {
        let code = render_first(CHAT_DOC, CHAT_CONFIG, false);
        assert!(code.contains("def create(self, *, bot_id: str, user_id: Optional[str] = None, **kwargs) -> None:"));
        assert!(code.contains("\"\"\"Create a chat.\"\"\""));
        assert!(code.contains("url = f\"{self._base_url}/v3/chat\""));
        assert!(code.contains("headers: Optional[dict] = kwargs.get(\"headers\")"));
        assert!(code.contains("body = remove_none_values({"));
        assert!(code.contains("\"bot_id\": bot_id,"));
        assert!(code.contains("return self._requester.request(\"post\", url, False, None, headers=headers, body=body)"));
    }

    #[test]
    fn test_async_method_awaits() {
        let code = render_first(CHAT_DOC, CHAT_CONFIG, true);
        assert!(code.contains("async def create("));
        assert!(code.contains("return await self._requester.arequest("));
    }

    #[test]
    fn test_path_params_come_first_and_interpolate() {
        let doc = r#"{
            "paths": {"/v1/bots/{bot_id}": {"get": {
                "parameters": [
                    {"name": "bot_id", "in": "path", "schema": {"type": "string"}},
                    {"name": "verbose", "in": "query", "schema": {"type": "boolean"}}
                ]
            }}}
        }"#;
        let config = r#"
            [sdk]
            package = "acme"

            [[packages]]
            name = "bots"

            [[mappings]]
            path = "/v1/bots/{bot_id}"
            method = "get"
            sdk_methods = ["bots.retrieve"]
        "#;
        let code = render_first(doc, config, false);
        assert!(code.contains("def retrieve(self, *, bot_id: str, verbose: Optional[bool] = None, **kwargs) -> None:"));
        assert!(code.contains("url = f\"{self._base_url}/v1/bots/{bot_id}\""));
        assert!(code.contains("params = remove_none_values({"));
        assert!(code.contains("\"verbose\": verbose,"));
    }

    #[test]
    fn test_expanded_signature_above_threshold() {
        let doc = r#"{
            "paths": {"/v1/search": {"get": {
                "parameters": [
                    {"name": "q", "in": "query", "required": true, "schema": {"type": "string"}},
                    {"name": "lang", "in": "query", "schema": {"type": "string"}},
                    {"name": "page_num", "in": "query", "schema": {"type": "integer"}},
                    {"name": "page_size", "in": "query", "schema": {"type": "integer"}}
                ]
            }}}
        }"#;
        let config = r#"
            [sdk]
            package = "acme"

            [[packages]]
            name = "search"

            [[mappings]]
            path = "/v1/search"
            method = "get"
            sdk_methods = ["search.query"]
        "#;
        let code = render_first(doc, config, false);
        assert!(code.contains("def query(\n"));
        assert!(code.contains("    self,\n"));
        assert!(code.contains("    *,\n"));
        assert!(code.contains("    **kwargs,\n"));
        // paging params sort last
        let q = code.find("q: str").unwrap();
        let page = code.find("page_num").unwrap();
        assert!(q < page);
    }

    #[test]
    fn test_fixed_values_render_as_literals() {
        let config = r#"
            [sdk]
            package = "acme"

            [[packages]]
            name = "chat"

            [[mappings]]
            path = "/v3/chat"
            method = "post"
            sdk_methods = ["chat.create"]

            [mappings.fixed_values]
            stream = "False"
        "#;
        let code = render_first(CHAT_DOC, config, false);
        assert!(code.contains("\"stream\": False,"));
        assert!(!code.contains("stream: "), "fixed fields never become parameters");
    }

    #[test]
    fn test_streaming_wrap() {
        let config = r#"
            [sdk]
            package = "acme"

            [[packages]]
            name = "chat"

            [[mappings]]
            path = "/v3/chat"
            method = "post"
            sdk_methods = ["chat.stream"]

            [mappings.streaming]
            wrap = true
            fields = ["event", "data"]
            handler = "_chat_stream_handler"
        "#;
        let code = render_first(CHAT_DOC, config, false);
        assert!(code.contains("resp = self._requester.request(\"post\", url, True, None,"));
        assert!(code.contains(
            "return Stream(resp, fields=[\"event\", \"data\"], handler=_chat_stream_handler)"
        ));
    }

    #[test]
    fn test_http_method_override_applies_and_suppresses_doc() {
        let doc = r#"{
            "paths": {"/v1/tasks": {"get": {"summary": "Fetch tasks."}}}
        }"#;
        let config = r#"
            [sdk]
            package = "acme"

            [[packages]]
            name = "tasks"

            [[mappings]]
            path = "/v1/tasks"
            method = "get"
            sdk_methods = ["tasks.poll"]
            http_method_override = "post"
        "#;
        let code = render_first(doc, config, false);
        assert!(code.contains("self._requester.request(\"post\", url"));
        assert!(!code.contains("Fetch tasks."));
    }
}
