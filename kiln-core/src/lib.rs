//! Core utilities and types for the kiln SDK generator.
//!
//! This crate provides the fundamental pieces shared across the kiln
//! ecosystem: naming/case conversion, the singular/plural lexicon used when
//! deriving model names, the embedded-asset capability, and the in-memory
//! output tree produced by generators.

mod assets;
mod lexicon;
mod naming;
mod source_tree;

// Embedded asset access
pub use assets::{AssetSource, StaticAssets};
// Plural/singular lexicon
pub use lexicon::{pluralize, singularize};
// String utilities
pub use naming::{is_identifier, to_camel_case, to_constant_case, to_pascal_case, to_snake_case};
pub use source_tree::SourceTree;
