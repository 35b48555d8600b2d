//! Mapping configuration for the kiln SDK generator.
//!
//! The config is the declarative half of a generation run: which packages
//! exist, how document operations map onto SDK methods, which operations
//! are ignored, and manual doc overrides. Parsed from TOML; parse and shape
//! errors carry miette source spans.

mod config;
mod error;
mod mapping;
mod package;

pub use config::{Config, SdkConfig};
pub use error::{Error, Result, SourceContext};
pub use mapping::{
    BodyBuilder, OperationMapping, OperationRef, PaginationMode, StreamingConfig, Targets,
};
pub use package::{FieldOverride, ModelSchema, Package};
