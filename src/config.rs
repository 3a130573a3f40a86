//! Knowledge-base configuration, persisted as TOML.
//!
//! Every field has a default, so a partial (or empty) TOML document is valid.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::{Iri, vocab};

/// Namespace bare names resolve against when none is configured.
pub const DEFAULT_NAMESPACE: &str = "http://localhost/";

/// Errors from configuration loading and validation.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(ontokit::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(
        code(ontokit::config::parse),
        help("Check the TOML syntax and the spelling of enum values (e.g. classification = \"lazy\").")
    )]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(ontokit::config::invalid), help("{message}"))]
    Invalid { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// When the classification cache recomputes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMode {
    /// Recompute on the first query after a mutation.
    #[default]
    Lazy,
    /// Recompute right after every successful mutation.
    Eager,
}

/// What to do when a label names several classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguityPolicy {
    /// Treat the matches as their disjunction.
    #[default]
    Union,
    /// Take the match with the smallest IRI.
    First,
    /// Fail with an ambiguous-label error.
    Reject,
}

/// Configuration for a [`crate::kb::KnowledgeBase`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbConfig {
    /// Namespace bare names are declared in.
    #[serde(default = "default_namespace")]
    pub default_namespace: String,
    /// IRI of the ontology document (used when saving).
    #[serde(default)]
    pub ontology_iri: Option<String>,
    #[serde(default)]
    pub classification: ClassificationMode,
    #[serde(default)]
    pub label_ambiguity: AmbiguityPolicy,
    /// Annotation property whose values feed the label index.
    #[serde(default = "default_label_property")]
    pub label_property: String,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.into()
}
fn default_label_property() -> String {
    vocab::RDFS_LABEL.into()
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            default_namespace: default_namespace(),
            ontology_iri: None,
            classification: ClassificationMode::default(),
            label_ambiguity: AmbiguityPolicy::default(),
            label_property: default_label_property(),
        }
    }
}

impl KbConfig {
    /// A config with the given default namespace and ontology IRI.
    pub fn with_namespace(namespace: &str, ontology_iri: &str) -> Self {
        Self {
            default_namespace: namespace.to_string(),
            ontology_iri: Some(ontology_iri.to_string()),
            ..Default::default()
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid {
            message: format!("config cannot be serialized: {e}"),
        })
    }

    /// Check that namespaces and IRIs are usable.
    pub fn validate(&self) -> ConfigResult<()> {
        if !Iri::looks_absolute(&self.default_namespace)
            || !Iri::new(self.default_namespace.as_str()).is_valid()
        {
            return Err(ConfigError::Invalid {
                message: format!(
                    "default_namespace must be an absolute IRI, got \"{}\"",
                    self.default_namespace
                ),
            });
        }
        if !self.default_namespace.ends_with(['/', '#']) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "default_namespace must end with '/' or '#', got \"{}\"",
                    self.default_namespace
                ),
            });
        }
        if !Iri::looks_absolute(&self.label_property) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "label_property must be an absolute IRI, got \"{}\"",
                    self.label_property
                ),
            });
        }
        if let Some(ref iri) = self.ontology_iri {
            if !Iri::new(iri.as_str()).is_valid() {
                return Err(ConfigError::Invalid {
                    message: format!("ontology_iri is not a valid IRI: \"{iri}\""),
                });
            }
        }
        Ok(())
    }
}
