//! The Python generator: composes binding, resolution, rendering, import
//! normalization, and root aggregation into one `SourceTree`.

use eyre::Result;
use kiln_codegen::{PackageModels, bind, package_metas, resolve_models, validate};
use kiln_config::Config;
use kiln_core::{AssetSource, SourceTree};
use kiln_openapi::Document;

use crate::assets::RUNTIME_ASSETS;
use crate::client::render_client;
use crate::context::{PackageContext, plan_paged_classes};
use crate::imports::{ImportTable, normalize_imports};
use crate::models::render_models;
use crate::root::render_root;

/// Generates a complete Python SDK from a document and mapping config.
pub struct Generator<'a> {
    doc: &'a Document,
    config: &'a Config,
}

impl<'a> Generator<'a> {
    pub fn new(doc: &'a Document, config: &'a Config) -> Self {
        Self { doc, config }
    }

    /// Run the whole pipeline and return the output tree.
    ///
    /// Fails only on pre-flight validation problems or an empty generation
    /// set; everything during rendering degrades instead of failing.
    pub fn generate(&self) -> Result<SourceTree> {
        validate(self.doc, self.config)?;
        let bindings = bind(self.doc, self.config)?;
        let model_sets = resolve_models(self.doc, self.config, &bindings);

        // Config-declared packages first, binder-discovered ones after.
        let mut package_names: Vec<String> = self
            .config
            .packages
            .iter()
            .map(|p| p.name.clone())
            .collect();
        for binding in &bindings {
            if !package_names.contains(&binding.package) {
                package_names.push(binding.package.clone());
            }
        }
        let metas = package_metas(self.config, &package_names);
        let table = ImportTable::for_sdk(&self.config.sdk.package);
        let empty_models = PackageModels::default();

        let mut tree = SourceTree::new();
        for meta in &metas {
            let models = model_sets.get(&meta.name).unwrap_or(&empty_models);
            let ctx = PackageContext {
                doc: self.doc,
                config: self.config,
                meta,
                metas: &metas,
                models,
                bindings: bindings.iter().filter(|b| b.package == meta.name).collect(),
            };
            let source = render_package(&ctx);
            let source = normalize_imports(&source, &table);
            tree.insert(
                format!("{}/{}/__init__.py", self.config.sdk.package, meta.dir),
                source,
            );
        }

        for name in RUNTIME_ASSETS.names() {
            if let Some(content) = RUNTIME_ASSETS.asset(name) {
                tree.insert(format!("{}/{}", self.config.sdk.package, name), content);
            }
        }

        let root = render_root(self.config, &metas, &tree);
        tree.insert(format!("{}/__init__.py", self.config.sdk.package), root);

        Ok(tree)
    }
}

/// One package file: models, synthesized paged classes, module-level helper
/// blocks, then the sync and async clients, separated by two blank lines.
fn render_package(ctx: &PackageContext) -> String {
    let paged = plan_paged_classes(ctx);
    let mut sections = render_models(ctx, &paged);
    for block in ctx.module_code() {
        sections.push(format!("{}\n", block.trim_end()));
    }
    sections.push(render_client(ctx, false));
    sections.push(render_client(ctx, true));
    sections.join("\n\n")
}
