//! Language-agnostic generation engine for the kiln SDK generator.
//!
//! This crate turns `(Document, Config)` into the structures a language
//! renderer consumes:
//!
//! - [`validate`] - pre-flight config/document cross-checks
//! - [`binder`] - operation-to-method binding with collision suffixing
//! - [`resolver`] - per-package model sets with structural dedup and
//!   dependency ordering
//! - [`pagination`] - paged-response shapes and accessor wiring
//! - [`richtext`] - rich-text description extraction
//! - [`builder`] - indentation-aware code assembly
//!
//! Everything here is a pure function of its inputs; no I/O, no shared
//! mutable state, deterministic iteration everywhere.

pub mod binder;
pub mod builder;
pub mod pagination;
pub mod resolver;
pub mod richtext;
pub mod types;
pub mod validate;

pub use binder::bind;
pub use builder::{CodeBuilder, Indent};
pub use resolver::{resolve_models, response_model_schema, structural_signature};
pub use richtext::{extract_rich_text, looks_like_rich_text};
pub use types::{
    ChildLink, ModelDefinition, OperationBinding, PackageMeta, PackageModels, package_metas,
};
pub use validate::validate;
