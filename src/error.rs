// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for lazy instrumentation dispatch.
//!
//! Only [`ConfigurationError`] is ever returned to the code that sets the
//! loader up. Everything that can go wrong after an initializer has claimed
//! its gate ([`ResolutionError`], [`PluginError`], panics) is folded into an
//! [`ActivationError`], logged, and swallowed by the initializer. Disposal
//! failures ([`DisposalError`]) are collected into a shutdown report.

use std::any::Any;

use thiserror::Error;

use crate::types::Signal;

/// Errors raised while wiring up the loader. These are programming or
/// deployment mistakes and are fatal to setup.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Trigger '{trigger}' is already bound to initializer '{existing}' (rejected '{rejected}')")]
    DuplicateBinding {
        trigger: String,
        existing: String,
        rejected: String,
    },

    #[error("Type already registered: {0}")]
    DuplicateType(String),

    #[error("Invalid type name: {0}")]
    InvalidTypeName(String),

    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("Plugin registered twice: {0}")]
    DuplicatePlugin(String),

    #[error("Plugin '{plugin}' failed to initialize: {source}")]
    PluginInitialization {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("IO error reading config: {0}")]
    IoError(String),

    #[error("YAML parsing error: {0}")]
    YamlError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl ConfigurationError {
    /// Create an invalid value error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ConfigurationError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigurationError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

/// Errors that can occur while turning a component descriptor into a live
/// instrumentation instance.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("Invalid type name: '{0}'")]
    InvalidTypeName(String),

    #[error("Type not found: {0}")]
    TypeNotFound(String),

    #[error("Type name '{name}' is ambiguous, candidates: {}", candidates.join("; "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },

    #[error("Type {type_name} is not a usable instrumentation: {reason}")]
    Incompatible { type_name: String, reason: String },

    #[error("Constructor of {type_name} takes {expected} argument(s), got {actual}")]
    ArgumentCount {
        type_name: String,
        expected: usize,
        actual: usize,
    },

    #[error("Argument {index} of {type_name} must be {expected}, got {actual}")]
    ArgumentType {
        type_name: String,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Constructor of {type_name} failed: {source}")]
    Construction {
        type_name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// A plugin rejected or failed to mutate an options object.
#[derive(Error, Debug)]
#[error("Plugin '{plugin}' failed to configure {signal} options: {source}")]
pub struct PluginError {
    pub plugin: String,
    pub signal: Signal,
    #[source]
    pub source: anyhow::Error,
}

/// Errors that can occur while disposing a tracked instrumentation.
#[derive(Error, Debug)]
pub enum DisposalError {
    #[error("Failed to dispose {instrumentation}: {source}")]
    Failed {
        instrumentation: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Dispose of {instrumentation} panicked: {message}")]
    Panicked {
        instrumentation: String,
        message: String,
    },
}

impl DisposalError {
    /// Name of the instrumentation that failed to dispose.
    pub fn instrumentation(&self) -> &str {
        match self {
            Self::Failed { instrumentation, .. } => instrumentation,
            Self::Panicked { instrumentation, .. } => instrumentation,
        }
    }
}

/// Why an initializer that won its gate did not produce an instrumentation.
#[derive(Error, Debug)]
pub enum ActivationError {
    #[error("Resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Plugin chain failed: {0}")]
    Plugin(#[from] PluginError),

    #[error("Initializer panicked: {0}")]
    Panicked(String),

    #[error("Activation failed: {0}")]
    Other(#[from] anyhow::Error),
}

impl ActivationError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolution(_) => "resolution",
            Self::Plugin(_) => "plugin",
            Self::Panicked(_) => "panic",
            Self::Other(_) => "other",
        }
    }
}

/// Result type alias using anyhow for flexible error handling.
pub type Result<T> = anyhow::Result<T>;

/// Extract a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
