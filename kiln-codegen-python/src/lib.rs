//! Python SDK renderer for the kiln SDK generator.
//!
//! Consumes the engine's bindings and model sets and emits the Python
//! source tree: per-package model/client files, runtime support files, and
//! the root package surface. Rendering is speculative; the import
//! normalizer fixes each file's import block once the full text exists.

mod assets;
mod client;
mod context;
mod docstrings;
mod generator;
mod imports;
mod methods;
mod models;
mod naming;
mod root;
mod type_mapper;

pub use assets::RUNTIME_ASSETS;
pub use context::{PackageContext, PagedClassPlan, plan_paged_classes};
pub use generator::Generator;
pub use imports::{ImportTable, normalize_imports};
pub use naming::{enum_member_name, is_reserved, safe_name};
pub use type_mapper::{TypeMapper, optional};
