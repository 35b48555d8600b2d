//! Root client and export aggregation.

use kiln_codegen::{CodeBuilder, PackageMeta};
use kiln_config::Config;
use kiln_core::SourceTree;

/// Curated ordering of root client properties, mirroring the API surface as
/// it grew; deliberately not alphabetical. Packages absent from the table
/// follow in config order.
static CLIENT_PROPERTY_ORDER: &[&str] = &[
    "bots",
    "chat",
    "conversations",
    "audio",
    "files",
    "workflows",
    "workspaces",
    "datasets",
    "templates",
    "users",
    "variables",
];

/// Render the root `__init__.py`: package re-exports, `__all__`, and the
/// lazily-wired sync/async root clients.
pub fn render_root(config: &Config, metas: &[PackageMeta], tree: &SourceTree) -> String {
    let sdk = &config.sdk.package;
    let top_level: Vec<&PackageMeta> = order_properties(
        metas.iter().filter(|m| !m.name.contains('.')).collect(),
    );

    // Every public class across the generated files is re-exported.
    let mut exports: Vec<(String, Vec<String>)> = Vec::new();
    for meta in metas {
        let path = format!("{}/{}/__init__.py", sdk, meta.dir);
        let Some(content) = tree.get(&path) else {
            continue;
        };
        let classes = public_classes(content);
        if !classes.is_empty() {
            exports.push((format!("{}.{}", sdk, meta.dir.replace('/', ".")), classes));
        }
    }
    exports.sort_by(|a, b| a.0.cmp(&b.0));

    let client_class = &config.sdk.client_class;
    let async_client_class = format!("Async{}", client_class);

    let mut b = CodeBuilder::python();
    b.push_line("from typing import Optional");
    b.push_blank();
    b.push_line(&format!("from {}.request import Requester", sdk));
    for (module, classes) in &exports {
        b.push_line(&format!("from {} import {}", module, classes.join(", ")));
    }
    b.push_blank();

    let mut all_names: Vec<String> = vec![client_class.clone(), async_client_class.clone()];
    all_names.push("Requester".to_string());
    for (_, classes) in &exports {
        all_names.extend(classes.iter().cloned());
    }
    all_names.sort();
    all_names.dedup();
    b.push_line("__all__ = [");
    b.push_indent();
    for name in &all_names {
        b.push_line(&format!("\"{}\",", name));
    }
    b.push_dedent();
    b.push_line("]");
    b.push_blank();
    b.push_blank();

    render_root_client(&mut b, config, &top_level, false);
    b.push_blank();
    b.push_blank();
    render_root_client(&mut b, config, &top_level, true);

    b.build()
}

fn render_root_client(
    b: &mut CodeBuilder,
    config: &Config,
    top_level: &[&PackageMeta],
    is_async: bool,
) {
    let class = if is_async {
        format!("Async{}", config.sdk.client_class)
    } else {
        config.sdk.client_class.clone()
    };
    b.push_line(&format!("class {}(object):", class));
    b.push_indent();

    b.push_line(&format!(
        "def __init__(self, base_url: str = \"{}\", requester: Optional[Requester] = None):",
        config.sdk.base_url
    ));
    b.push_indent();
    b.push_line("self._base_url = base_url");
    b.push_line("self._requester = requester or Requester()");
    for meta in top_level {
        let child_class = client_class_of(meta, is_async);
        b.push_line(&format!(
            "self._{}: Optional[{}] = None",
            meta.name, child_class
        ));
    }
    b.push_dedent();

    for meta in top_level {
        let child_class = client_class_of(meta, is_async);
        b.ensure_blank();
        b.push_line("@property");
        b.push_line(&format!("def {}(self) -> {}:", meta.name, child_class));
        b.push_indent();
        b.push_line(&format!("if self._{} is None:", meta.name));
        b.push_indent();
        b.push_line(&format!(
            "self._{} = {}(self._base_url, self._requester)",
            meta.name, child_class
        ));
        b.push_dedent();
        b.push_line(&format!("return self._{}", meta.name));
        b.push_dedent();
    }

    b.push_dedent();
}

fn client_class_of(meta: &PackageMeta, is_async: bool) -> String {
    if is_async {
        meta.async_client_class.clone()
    } else {
        meta.client_class.clone()
    }
}

/// Table-ordered packages first, the rest in their given (config) order.
fn order_properties(metas: Vec<&PackageMeta>) -> Vec<&PackageMeta> {
    let mut ordered: Vec<&PackageMeta> = Vec::new();
    for wanted in CLIENT_PROPERTY_ORDER {
        if let Some(meta) = metas.iter().copied().find(|m| m.name == *wanted) {
            ordered.push(meta);
        }
    }
    for meta in metas.iter().copied() {
        if !CLIENT_PROPERTY_ORDER.contains(&meta.name.as_str()) {
            ordered.push(meta);
        }
    }
    ordered
}

/// Top-level `class X(...)` names, underscore-prefixed ones skipped.
fn public_classes(source: &str) -> Vec<String> {
    let mut out = Vec::new();
    for line in source.lines() {
        if let Some(rest) = line.strip_prefix("class ") {
            let name: String = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            if !name.is_empty() && !name.starts_with('_') && !out.contains(&name) {
                out.push(name);
            }
        }
    }
    out
}
