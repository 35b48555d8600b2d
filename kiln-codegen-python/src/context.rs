//! Per-package rendering context and paged-class planning.

use kiln_codegen::pagination::{PagedKind, PageRole};
use kiln_codegen::resolver::response_model_schema;
use kiln_codegen::{OperationBinding, PackageMeta, PackageModels};
use kiln_config::{Config, Package};
use kiln_openapi::Document;

use crate::type_mapper::TypeMapper;

/// Everything the renderers need to know about one package.
pub struct PackageContext<'a> {
    pub doc: &'a Document,
    pub config: &'a Config,
    pub meta: &'a PackageMeta,
    pub metas: &'a [PackageMeta],
    pub models: &'a PackageModels,
    pub bindings: Vec<&'a OperationBinding>,
}

impl PackageContext<'_> {
    pub fn mapper(&self) -> TypeMapper<'_> {
        TypeMapper::new(self.doc, &self.models.aliases)
    }

    pub fn package_config(&self) -> Option<&Package> {
        self.config.package(&self.meta.name)
    }

    pub fn meta_for(&self, package: &str) -> Option<&PackageMeta> {
        self.metas.iter().find(|m| m.name == package)
    }

    pub fn sync_extra_methods(&self) -> &[String] {
        self.package_config()
            .map(|p| p.sync_extra_methods.as_slice())
            .unwrap_or(&[])
    }

    pub fn async_extra_methods(&self) -> &[String] {
        self.package_config()
            .map(|p| p.async_extra_methods.as_slice())
            .unwrap_or(&[])
    }

    pub fn module_code(&self) -> &[String] {
        self.package_config()
            .map(|p| p.module_code.as_slice())
            .unwrap_or(&[])
    }
}

/// A paged response class to synthesize for a package.
#[derive(Debug, Clone)]
pub struct PagedClassPlan {
    pub name: String,
    pub kind: PagedKind,
    /// Python type of one page item.
    pub item_type: String,
    /// `(field name, role)` pairs, in emission order.
    pub fields: Vec<(String, PageRole)>,
}

/// Plan the paged classes for a package's bindings.
///
/// A class whose name the package's own model config already declares is
/// skipped: generated code never collides with a hand-authored override.
pub fn plan_paged_classes(ctx: &PackageContext) -> Vec<PagedClassPlan> {
    let mapper = ctx.mapper();
    let mut plans: Vec<PagedClassPlan> = Vec::new();
    for binding in &ctx.bindings {
        let Some(mapping) = &binding.mapping else {
            continue;
        };
        let Some(kind) = PagedKind::from_mode(mapping.pagination) else {
            continue;
        };
        let Some(name) = &mapping.response_type else {
            continue;
        };
        if ctx.models.config_declared.contains(name) {
            continue;
        }
        if plans.iter().any(|p| p.name == *name) {
            continue;
        }
        let fields: Vec<(String, PageRole)> = kind
            .roles()
            .iter()
            .map(|role| (role.field_name(Some(mapping)), *role))
            .collect();
        let item_type = paged_item_type(ctx, binding, &fields, &mapper);
        plans.push(PagedClassPlan {
            name: name.clone(),
            kind,
            item_type,
            fields,
        });
    }
    plans
}

/// Item type of a paged response: the element type of the configured items
/// field inside the response's data schema.
fn paged_item_type(
    ctx: &PackageContext,
    binding: &OperationBinding,
    fields: &[(String, PageRole)],
    mapper: &TypeMapper,
) -> String {
    let Some((_, data)) = response_model_schema(ctx.doc, &binding.details) else {
        return "Any".to_string();
    };
    let items_field = fields
        .iter()
        .find(|(_, role)| *role == PageRole::Items)
        .map(|(name, _)| name.as_str())
        .unwrap_or("items");
    match data.properties.get(items_field) {
        Some(prop) => {
            let resolved = ctx.doc.resolve(prop);
            match &resolved.items {
                Some(items) => mapper.type_for(items),
                None => "Any".to_string(),
            }
        }
        None => "Any".to_string(),
    }
}
