//! Inspector configuration
//!
//! Loaded from a TOML file and/or overridden by the host at `initialize`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Custom request understood by cdt-gdb-adapter for raw memory reads
pub const DEFAULT_MEMORY_REQUEST: &str = "cdt-gdb-adapter/Memory";

/// Evaluate context used for address and size queries
pub const DEFAULT_EVALUATE_CONTEXT: &str = "watch";

/// Indexed children per group when a scope is paged
pub const DEFAULT_VARIABLE_PAGE_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectorConfig {
    #[serde(default = "default_memory_request")]
    pub memory_request: String,

    #[serde(default = "default_evaluate_context")]
    pub evaluate_context: String,

    #[serde(default = "default_variable_page_size")]
    pub variable_page_size: usize,
}

fn default_memory_request() -> String {
    DEFAULT_MEMORY_REQUEST.to_string()
}

fn default_evaluate_context() -> String {
    DEFAULT_EVALUATE_CONTEXT.to_string()
}

fn default_variable_page_size() -> usize {
    DEFAULT_VARIABLE_PAGE_SIZE
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            memory_request: default_memory_request(),
            evaluate_context: default_evaluate_context(),
            variable_page_size: default_variable_page_size(),
        }
    }
}

impl InspectorConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: InspectorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_request.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "memoryRequest must not be empty".to_string(),
            ));
        }
        if self.evaluate_context.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "evaluateContext must not be empty".to_string(),
            ));
        }
        if self.variable_page_size == 0 {
            return Err(ConfigError::Invalid(
                "variablePageSize must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Keys the host sends at `initialize`; absent keys keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_request: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluate_context: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_page_size: Option<usize>,
}

impl InspectorConfig {
    /// Copy of this config with every key present in `overrides` replaced
    pub fn merged(&self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let config = InspectorConfig {
            memory_request: overrides
                .memory_request
                .clone()
                .unwrap_or_else(|| self.memory_request.clone()),
            evaluate_context: overrides
                .evaluate_context
                .clone()
                .unwrap_or_else(|| self.evaluate_context.clone()),
            variable_page_size: overrides
                .variable_page_size
                .unwrap_or(self.variable_page_size),
        };
        config.validate()?;
        Ok(config)
    }
}
