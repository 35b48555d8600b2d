//! Top-level config parsing and shape validation.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use kiln_core::is_identifier;
use serde::Deserialize;

use crate::error::{Error, Result, SourceContext};
use crate::mapping::{OperationMapping, OperationRef};
use crate::package::Package;

/// The whole generator configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub sdk: SdkConfig,
    pub packages: Vec<Package>,
    pub mappings: Vec<OperationMapping>,
    pub ignores: Vec<OperationRef>,
    /// Manual doc overrides keyed by fully-qualified `module.Class.member`.
    pub comments: BTreeMap<String, String>,
}

/// Settings for the generated SDK as a whole.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SdkConfig {
    /// Python import package the SDK lives in.
    pub package: String,
    /// Root client class name.
    pub client_class: String,
    /// Default `base_url` baked into client constructors.
    pub base_url: String,
    /// Skip operations without a mapping instead of generating defaults.
    pub generate_only_mapped: bool,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            package: "sdk".to_string(),
            client_class: "Client".to_string(),
            base_url: "https://api.example.com".to_string(),
            generate_only_mapped: false,
        }
    }
}

impl Config {
    /// Parse and validate a config from TOML text.
    pub fn parse(text: &str, filename: &str) -> Result<Self> {
        let ctx = SourceContext::new(text, filename);
        let config: Config = toml::from_str(text).map_err(|e| ctx.parse_error(e))?;
        config.validate(&ctx)?;
        Ok(config)
    }

    /// The package config with the given name.
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// The manual doc override for a `module.Class.member` key.
    pub fn comment_override(&self, key: &str) -> Option<&str> {
        self.comments.get(key).map(String::as_str)
    }

    /// Every mapping covering the given operation, in declaration order.
    pub fn mappings_for(&self, path: &str, method: &str) -> Vec<&OperationMapping> {
        self.mappings
            .iter()
            .filter(|m| m.matches(path, method))
            .collect()
    }

    /// Whether an ignore rule covers the given operation.
    pub fn is_ignored(&self, path: &str, method: &str) -> bool {
        self.ignores.iter().any(|i| i.matches(path, method))
    }

    fn validate(&self, ctx: &SourceContext) -> Result<()> {
        if !is_identifier(&self.sdk.package) {
            return Err(ctx.validation_error(format!(
                "sdk package '{}' is not a valid Python package name",
                self.sdk.package
            )));
        }

        let mut seen = BTreeSet::new();
        for pkg in &self.packages {
            if pkg.name.is_empty() || !pkg.name.split('.').all(is_identifier) {
                return Err(ctx.validation_error(format!(
                    "package name '{}' is not a dotted identifier",
                    pkg.name
                )));
            }
            if !seen.insert(pkg.name.as_str()) {
                return Err(
                    ctx.validation_error(format!("duplicate package name '{}'", pkg.name))
                );
            }
            if let Some(parent) = pkg.parent_name() {
                if self.package(parent).is_none() {
                    return Err(ctx.validation_error(format!(
                        "package '{}' has no declared parent package '{}'",
                        pkg.name, parent
                    )));
                }
            }
            for model in &pkg.model_schemas {
                if model.schema.is_none() && !model.declarative && !model.is_enum {
                    return Err(ctx.validation_error(format!(
                        "model '{}.{}' names no schema and is not declarative",
                        pkg.name, model.name
                    )));
                }
            }
        }

        for mapping in &self.mappings {
            for target in &mapping.sdk_methods {
                let Some((package, method)) = target.rsplit_once('.') else {
                    return Err(ctx.validation_error(format!(
                        "sdk method '{}' is not of the form 'package.method'",
                        target
                    )));
                };
                if !is_identifier(method) || !package.split('.').all(is_identifier) {
                    return Err(ctx.validation_error(format!(
                        "sdk method '{}' is not of the form 'package.method'",
                        target
                    )));
                }
                if self.package(package).is_none() {
                    return Err(ctx.validation_error(format!(
                        "sdk method '{}' names undeclared package '{}'",
                        target, package
                    )));
                }
            }
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, "kiln.toml")
    }
}
