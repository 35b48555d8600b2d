//! Docstring sourcing.
//!
//! Precedence: document-derived text first (with rich-text payloads
//! decoded), unless pagination or an HTTP-method override makes the
//! document text misleading; a manual override only applies when the
//! document offers nothing.

use kiln_codegen::{OperationBinding, extract_rich_text, looks_like_rich_text};
use kiln_config::PaginationMode;

use crate::context::PackageContext;
use crate::methods::Param;

/// The docstring for one rendered method, if any source provides text.
pub fn method_docstring(
    ctx: &PackageContext,
    binding: &OperationBinding,
    params: &[Param],
    class_name: &str,
    method_name: &str,
) -> Option<String> {
    let mapping = binding.mapping.as_ref();
    let suppressed = binding.pagination() != PaginationMode::None
        || mapping.is_some_and(|m| m.http_method_override.is_some() || m.ignore_swagger_doc);

    if !suppressed {
        if let Some(mut text) = document_text(binding) {
            let param_lines: Vec<String> = params
                .iter()
                .filter_map(|p| {
                    p.doc
                        .as_ref()
                        .map(|d| format!(":param {}: {}", p.name, decode(d)))
                })
                .collect();
            if !param_lines.is_empty() {
                text.push_str("\n\n");
                text.push_str(&param_lines.join("\n"));
            }
            return Some(text);
        }
    }

    if let Some(doc) = mapping.and_then(|m| m.doc_override.clone()) {
        return Some(doc);
    }
    let key = format!("{}.{}.{}", ctx.meta.name, class_name, method_name);
    ctx.config.comment_override(&key).map(str::to_string)
}

/// Summary and description from the document, rich-text payloads decoded.
fn document_text(binding: &OperationBinding) -> Option<String> {
    let summary = binding
        .details
        .summary
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(decode);
    let description = binding
        .details
        .description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(decode);

    match (summary, description) {
        (Some(s), Some(d)) if s != d => Some(format!("{}\n\n{}", s, d)),
        (Some(s), _) => Some(s),
        (None, Some(d)) => Some(d),
        (None, None) => None,
    }
}

fn decode(text: &str) -> String {
    if looks_like_rich_text(text) {
        extract_rich_text(text).unwrap_or_else(|| text.to_string())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_codegen::{PackageModels, package_metas};
    use kiln_config::{Config, OperationMapping};
    use kiln_openapi::{Document, OperationDetails};

    fn binding(details: OperationDetails, mapping: Option<OperationMapping>) -> OperationBinding {
        OperationBinding {
            package: "chat".into(),
            method_name: "create".into(),
            sync_name: Some("create".into()),
            async_name: Some("create".into()),
            details,
            mapping,
            order: None,
            seq: 0,
        }
    }

    fn with_ctx(config: &Config, f: impl FnOnce(&PackageContext)) {
        let doc = Document::default();
        let metas = package_metas(config, &["chat".to_string()]);
        let models = PackageModels::default();
        let ctx = PackageContext {
            doc: &doc,
            config,
            meta: &metas[0],
            metas: &metas,
            models: &models,
            bindings: Vec::new(),
        };
        f(&ctx);
    }

    #[test]
    fn test_document_text_wins_over_manual_override() {
        let config: Config = r#"
            [sdk]
            package = "acme"

            [comments]
            "chat.ChatClient.create" = "manual text"
        "#
        .parse()
        .unwrap();
        with_ctx(&config, |ctx| {
            let b = binding(
                OperationDetails {
                    summary: Some("Create a chat.".into()),
                    ..OperationDetails::default()
                },
                None,
            );
            let doc = method_docstring(ctx, &b, &[], "ChatClient", "create").unwrap();
            assert_eq!(doc, "Create a chat.");
        });
    }

    #[test]
    fn test_manual_override_used_when_document_silent() {
        let config: Config = r#"
            [sdk]
            package = "acme"

            [comments]
            "chat.ChatClient.create" = "manual text"
        "#
        .parse()
        .unwrap();
        with_ctx(&config, |ctx| {
            let b = binding(OperationDetails::default(), None);
            let doc = method_docstring(ctx, &b, &[], "ChatClient", "create").unwrap();
            assert_eq!(doc, "manual text");
        });
    }

    #[test]
    fn test_pagination_suppresses_document_text() {
        let config: Config = "[sdk]\npackage = \"acme\"".parse().unwrap();
        with_ctx(&config, |ctx| {
            let mapping = OperationMapping {
                pagination: PaginationMode::Token,
                doc_override: Some("List things, page by page.".into()),
                ..OperationMapping::default()
            };
            let b = binding(
                OperationDetails {
                    summary: Some("Returns every thing at once.".into()),
                    ..OperationDetails::default()
                },
                Some(mapping),
            );
            let doc = method_docstring(ctx, &b, &[], "ChatClient", "list").unwrap();
            assert_eq!(doc, "List things, page by page.");
        });
    }

    #[test]
    fn test_rich_text_description_is_decoded() {
        let config: Config = "[sdk]\npackage = \"acme\"".parse().unwrap();
        with_ctx(&config, |ctx| {
            let b = binding(
                OperationDetails {
                    description: Some(r#"{"ops":[{"insert":"Create"},{"insert":"chat"}]}"#.into()),
                    ..OperationDetails::default()
                },
                None,
            );
            let doc = method_docstring(ctx, &b, &[], "ChatClient", "create").unwrap();
            assert_eq!(doc, "Create chat");
        });
    }

    #[test]
    fn test_no_source_yields_none() {
        let config: Config = "[sdk]\npackage = \"acme\"".parse().unwrap();
        with_ctx(&config, |ctx| {
            let b = binding(OperationDetails::default(), None);
            assert!(method_docstring(ctx, &b, &[], "ChatClient", "create").is_none());
        });
    }
}
