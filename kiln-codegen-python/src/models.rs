//! Model and paged-response class rendering.

use std::collections::BTreeMap;

use kiln_codegen::pagination::{PagedKind, PageRole, parse_paged_base, pick_field};
use kiln_codegen::{CodeBuilder, ModelDefinition, extract_rich_text, looks_like_rich_text};
use kiln_openapi::Schema;

use crate::context::{PackageContext, PagedClassPlan};
use crate::imports::identifiers_in;
use crate::naming::{enum_member_name, safe_name};
use crate::type_mapper::optional;

/// Render every model of the package, dependency order, then the
/// synthesized paged classes. Returns one source section per class.
pub fn render_models(ctx: &PackageContext, paged: &[PagedClassPlan]) -> Vec<String> {
    let order: BTreeMap<&str, usize> = ctx
        .models
        .models
        .iter()
        .enumerate()
        .map(|(i, m)| (m.name.as_str(), i))
        .collect();

    let mut sections = Vec::new();
    for (index, model) in ctx.models.models.iter().enumerate() {
        let mut b = CodeBuilder::python();
        if model.is_enum {
            render_enum(&mut b, model);
        } else {
            render_class(&mut b, model, ctx, index, &order);
        }
        sections.push(b.build());
    }
    for plan in paged {
        let mut b = CodeBuilder::python();
        render_paged_class(&mut b, plan);
        sections.push(b.build());
    }
    sections
}

fn render_enum(b: &mut CodeBuilder, model: &ModelDefinition) {
    let is_int = model
        .schema
        .as_ref()
        .is_some_and(|s| s.schema_type.as_deref() == Some("integer"));
    let bases = if model.base_classes.is_empty() {
        if is_int {
            "int, Enum".to_string()
        } else {
            "str, Enum".to_string()
        }
    } else {
        model.base_classes.join(", ")
    };
    b.push_line(&format!("class {}({}):", model.name, bases));
    b.push_indent();
    if let Some(doc) = class_doc(model) {
        b.push_docstring(&doc);
    }
    let values = if model.enum_values.is_empty() {
        model
            .schema
            .as_ref()
            .map(|s| s.enum_strings())
            .unwrap_or_default()
    } else {
        model.enum_values.clone()
    };
    if values.is_empty() && model.extra_fields.is_empty() {
        b.push_line("pass");
    }
    for value in &values {
        let rendered = if is_int {
            value.clone()
        } else {
            format!("\"{}\"", value)
        };
        b.push_line(&format!("{} = {}", enum_member_name(value), rendered));
    }
    for line in &model.extra_fields {
        b.push_line(line);
    }
    b.push_dedent();
}

fn render_class(
    b: &mut CodeBuilder,
    model: &ModelDefinition,
    ctx: &PackageContext,
    index: usize,
    order: &BTreeMap<&str, usize>,
) {
    let mapper = ctx.mapper();
    let bases = if model.base_classes.is_empty() {
        vec!["BaseModel".to_string()]
    } else {
        model.base_classes.clone()
    };
    b.push_line(&format!("class {}({}):", model.name, bases.join(", ")));
    b.push_indent();

    if let Some(doc) = class_doc(model) {
        b.push_docstring(&doc);
    }

    // (emitted name, unquoted type expression)
    let mut emitted: Vec<(String, String)> = Vec::new();
    for (prop_name, prop) in ordered_fields(model) {
        let override_ = model.override_for(&prop_name);
        let name = safe_name(
            override_
                .and_then(|o| o.rename.as_deref())
                .unwrap_or(&prop_name),
        );
        let required = model
            .schema
            .as_ref()
            .is_some_and(|s| s.is_required(&prop_name));
        let base_type = match override_.and_then(|o| o.type_expr.clone()) {
            Some(t) => t,
            None => mapper.type_for(prop),
        };
        let type_expr = if required {
            base_type
        } else {
            optional(&base_type)
        };
        let default = match override_.and_then(|o| o.default.clone()) {
            Some(d) => Some(d),
            None if required => None,
            None => Some("None".to_string()),
        };
        let rendered_type = quote_forward_refs(&type_expr, index, order);
        let mut line = format!("{}: {}", name, rendered_type);
        if let Some(d) = &default {
            line.push_str(&format!(" = {}", d));
        }
        b.push_line(&line);
        let doc = override_
            .and_then(|o| o.doc.clone())
            .or_else(|| prop.description.clone());
        if let Some(doc) = doc {
            b.push_docstring(&plain_doc(&doc));
        }
        emitted.push((name, type_expr));
    }
    for line in &model.extra_fields {
        b.push_line(line);
        if let Some((name, type_expr)) = parse_extra_field(line) {
            emitted.push((name, type_expr));
        }
    }

    let empty_body = emitted.is_empty()
        && b.as_str().trim_end().ends_with(':')
        && model.builders.is_empty()
        && model.validators.is_empty();

    // A paged base class wires the uniform accessor surface onto whatever
    // fields the model declares.
    let mut has_accessors = false;
    for base in &bases {
        if let Some((kind, item_type)) = parse_paged_base(base) {
            render_paged_accessors(b, kind, &item_type, &emitted);
            has_accessors = true;
            break;
        }
    }

    if empty_body && !has_accessors {
        b.push_line("pass");
    }

    for block in model.validators.iter().chain(model.builders.iter()) {
        b.ensure_blank();
        b.push_lines(block);
    }
    b.push_dedent();
}

fn render_paged_class(b: &mut CodeBuilder, plan: &PagedClassPlan) {
    let base = format!("{}[{}]", plan.kind.base_class(), plan.item_type);
    b.push_line(&format!("class {}(BaseModel, {}):", plan.name, base));
    b.push_indent();

    let mut emitted: Vec<(String, String)> = Vec::new();
    for (field, role) in &plan.fields {
        let (type_expr, default) = match role {
            PageRole::Items => (format!("List[{}]", plan.item_type), None),
            PageRole::HasMore => ("bool".to_string(), None),
            PageRole::NextPageToken | PageRole::FirstId | PageRole::LastId => {
                ("Optional[str]".to_string(), Some("None"))
            }
            PageRole::Total => ("Optional[int]".to_string(), Some("None")),
        };
        let mut line = format!("{}: {}", field, type_expr);
        if let Some(d) = default {
            line.push_str(&format!(" = {}", d));
        }
        b.push_line(&line);
        emitted.push((field.clone(), type_expr));
    }

    render_paged_accessors(b, plan.kind, &plan.item_type, &emitted);
    b.push_dedent();
}

/// Emit the accessor surface of a paged kind, reading the backing fields by
/// name (exact, then prefix); an unbacked accessor returns a fixed `None`.
fn render_paged_accessors(
    b: &mut CodeBuilder,
    kind: PagedKind,
    item_type: &str,
    fields: &[(String, String)],
) {
    let names: Vec<String> = fields.iter().map(|(n, _)| n.clone()).collect();
    for (accessor, role) in kind.accessors() {
        let backing = match role {
            PageRole::Items => pick_field(&names, "items")
                .map(str::to_string)
                .or_else(|| {
                    fields
                        .iter()
                        .find(|(_, t)| t.starts_with("List["))
                        .map(|(n, _)| n.clone())
                }),
            other => pick_field(&names, other.key()).map(str::to_string),
        };
        let return_type = match role {
            PageRole::Items => format!("List[{}]", item_type),
            PageRole::HasMore => "Optional[bool]".to_string(),
            PageRole::Total => "Optional[int]".to_string(),
            PageRole::NextPageToken | PageRole::FirstId | PageRole::LastId => {
                "Optional[str]".to_string()
            }
        };
        b.ensure_blank();
        b.push_line(&format!("def {}(self) -> {}:", accessor, return_type));
        b.push_indent();
        match backing {
            Some(field) => b.push_line(&format!("return self.{}", field)),
            None => b.push_line("return None"),
        };
        b.push_dedent();
    }
}

/// Fields in emission order: `field_order` names first, then the remaining
/// schema properties in document order, excluded fields dropped.
fn ordered_fields(model: &ModelDefinition) -> Vec<(String, &Schema)> {
    let Some(schema) = &model.schema else {
        return Vec::new();
    };
    let excluded = |name: &str| model.exclude_fields.iter().any(|e| e == name);
    let mut out: Vec<(String, &Schema)> = Vec::new();
    for name in &model.field_order {
        if let Some(prop) = schema.properties.get(name) {
            if !excluded(name) {
                out.push((name.clone(), prop));
            }
        }
    }
    for (name, prop) in &schema.properties {
        if !excluded(name) && !model.field_order.contains(name) {
            out.push((name.clone(), prop));
        }
    }
    out
}

fn class_doc(model: &ModelDefinition) -> Option<String> {
    let doc = model.schema.as_ref()?.description.clone()?;
    let doc = plain_doc(&doc);
    (!doc.is_empty()).then_some(doc)
}

/// Field and class docs may arrive as undecoded rich-text payloads.
fn plain_doc(text: &str) -> String {
    if looks_like_rich_text(text) {
        extract_rich_text(text).unwrap_or_else(|| text.to_string())
    } else {
        text.to_string()
    }
}

/// Quote a type annotation that references a class defined later in the
/// file (a cycle broken by the dependency ordering).
fn quote_forward_refs(expr: &str, index: usize, order: &BTreeMap<&str, usize>) -> String {
    let forward = identifiers_in(expr)
        .into_iter()
        .any(|id| order.get(id.as_str()).is_some_and(|&i| i > index));
    if forward {
        format!("\"{}\"", expr)
    } else {
        expr.to_string()
    }
}

/// Best-effort parse of a verbatim `name: Type = default` extra field line.
fn parse_extra_field(line: &str) -> Option<(String, String)> {
    let (name, rest) = line.split_once(':')?;
    let type_expr = rest.split('=').next()?.trim();
    Some((name.trim().to_string(), type_expr.to_string()))
}
