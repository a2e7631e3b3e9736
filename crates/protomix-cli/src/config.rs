//! `protomix.toml`: handle shapes and interface declarations.
//!
//! ```toml
//! [[handle]]
//! tag = "widget"
//! string_field = "widgetName"
//! number_field = "widgetId"
//!
//! [interfaces.resizable]
//! resize = "function"
//! element = "htmlelement"
//! ```

use indexmap::IndexMap;
use protomix_kernel::{Classifier, FieldShape, Interface, KernelError, TypeTag};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "protomix.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file: {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid interface \"{name}\": {source}")]
    Interface {
        name: String,
        #[source]
        source: KernelError,
    },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, rename = "handle")]
    pub handles: Vec<HandleConfig>,

    /// Interface name -> (property -> type name), in declaration order.
    #[serde(default)]
    pub interfaces: IndexMap<String, IndexMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandleConfig {
    pub tag: String,
    pub string_field: String,
    pub number_field: String,
}

impl Config {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::ParseToml {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load `path`. A missing file at the default location is an empty
    /// config; a missing explicit path is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
            tracing::debug!("no {DEFAULT_CONFIG_PATH}, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&text, path)?;
        tracing::debug!(
            path = %path.display(),
            handles = config.handles.len(),
            interfaces = config.interfaces.len(),
            "config loaded"
        );
        Ok(config)
    }

    /// The default classifier extended with the configured handle shapes.
    pub fn classifier(&self) -> Result<Classifier, ConfigError> {
        let mut classifier = Classifier::default();
        for handle in &self.handles {
            if handle.tag.is_empty()
                || handle.string_field.is_empty()
                || handle.number_field.is_empty()
            {
                return Err(ConfigError::Invalid(
                    "[[handle]] entries need non-empty tag, string_field and number_field"
                        .to_string(),
                ));
            }
            classifier = classifier.with_predicate(FieldShape::new(
                TypeTag::parse(&handle.tag),
                handle.string_field.clone(),
                handle.number_field.clone(),
            ));
        }
        Ok(classifier)
    }

    pub fn interface(&self, name: &str) -> Result<Interface, ConfigError> {
        let properties = self.interfaces.get(name).ok_or_else(|| {
            ConfigError::Invalid(format!("interface \"{name}\" is not declared"))
        })?;
        Interface::new(name, properties.iter().map(|(k, v)| (k.clone(), v.as_str())))
            .map_err(|source| ConfigError::Interface {
                name: name.to_string(),
                source,
            })
    }

    pub fn declared_interfaces(&self) -> Result<Vec<Interface>, ConfigError> {
        self.interfaces
            .keys()
            .map(|name| self.interface(name))
            .collect()
    }
}
