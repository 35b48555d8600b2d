//! Package client class rendering (sync and async variants).

use kiln_codegen::CodeBuilder;

use crate::context::PackageContext;
use crate::methods::render_method;

/// Render one package client class.
pub fn render_client(ctx: &PackageContext, is_async: bool) -> String {
    let class = if is_async {
        &ctx.meta.async_client_class
    } else {
        &ctx.meta.client_class
    };
    let mut b = CodeBuilder::python();
    b.push_line(&format!("class {}(object):", class));
    b.push_indent();

    b.push_line("def __init__(self, base_url: str, requester: Requester):");
    b.push_indent();
    b.push_line("self._base_url = base_url");
    b.push_line("self._requester = requester");
    for child in &ctx.meta.children {
        let child_class = child_class_name(ctx, &child.package, is_async);
        b.push_line(&format!(
            "self._{}: Optional[\"{}\"] = None",
            child.property, child_class
        ));
    }
    b.push_dedent();

    // Child clients hang off lazy properties; the import happens inside the
    // property body to keep the modules cycle-free.
    for child in &ctx.meta.children {
        let child_class = child_class_name(ctx, &child.package, is_async);
        let module = format!("{}.{}", ctx.config.sdk.package, child.package);
        b.ensure_blank();
        b.push_line("@property");
        b.push_line(&format!(
            "def {}(self) -> \"{}\":",
            child.property, child_class
        ));
        b.push_indent();
        b.push_line(&format!("if self._{} is None:", child.property));
        b.push_indent();
        b.push_line(&format!("from {} import {}", module, child_class));
        b.push_line(&format!(
            "self._{} = {}(self._base_url, self._requester)",
            child.property, child_class
        ));
        b.push_dedent();
        b.push_line(&format!("return self._{}", child.property));
        b.push_dedent();
    }

    for binding in &ctx.bindings {
        let name = if is_async {
            binding.async_name.as_deref()
        } else {
            binding.sync_name.as_deref()
        };
        let Some(name) = name else {
            continue;
        };
        b.ensure_blank();
        render_method(&mut b, ctx, binding, name, is_async);
    }

    let extras = if is_async {
        ctx.async_extra_methods()
    } else {
        ctx.sync_extra_methods()
    };
    for block in extras {
        b.ensure_blank();
        b.push_lines(block);
    }

    b.push_dedent();
    b.build()
}

fn child_class_name(ctx: &PackageContext, package: &str, is_async: bool) -> String {
    match ctx.meta_for(package) {
        Some(meta) => {
            if is_async {
                meta.async_client_class.clone()
            } else {
                meta.client_class.clone()
            }
        }
        None => {
            let base = kiln_core::to_pascal_case(package);
            if is_async {
                format!("Async{}Client", base)
            } else {
                format!("{}Client", base)
            }
        }
    }
}
