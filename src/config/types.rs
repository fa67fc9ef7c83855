// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.
//!
//! Defines the structure of the loader config file and of the resolved
//! configuration, supporting JSON and YAML formats.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Signal;

/// Loader configuration as written in a config file.
///
/// Every field is optional; anything left out falls back to the defaults in
/// [`ResolvedConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Plugin names, in the order the chain runs them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,

    /// Default for every tracing instrumentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traces_instrumentation_enabled: Option<bool>,

    /// Default for every metrics instrumentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_instrumentation_enabled: Option<bool>,

    /// Initializers that are never registered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled_instrumentations: Option<Vec<String>>,

    /// Per-initializer settings, keyed by initializer name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrumentations: Option<HashMap<String, InstrumentationConfig>>,

    /// Diagnostic logging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<TelemetrySettings>,
}

/// Settings for a single initializer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// The `telemetry` section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySettings {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// `tracing_subscriber` filter directive, e.g. `lazy_instr::loader=debug`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Colored output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ansi: Option<bool>,
}

/// Fully resolved configuration with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub plugins: Vec<String>,
    pub traces_enabled: bool,
    pub metrics_enabled: bool,
    /// Upper-cased names of disabled initializers.
    pub disabled: Vec<String>,
    /// Explicit per-initializer switches, keyed by upper-cased name.
    pub overrides: HashMap<String, bool>,
    pub telemetry: TelemetrySettings,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            plugins: Vec::new(),
            traces_enabled: true,
            metrics_enabled: true,
            disabled: Vec::new(),
            overrides: HashMap::new(),
            telemetry: TelemetrySettings::default(),
        }
    }
}

impl ResolvedConfig {
    /// Whether the named initializer producing `signal` should be registered.
    ///
    /// An explicit per-initializer switch wins. Otherwise the initializer is
    /// enabled unless it is listed as disabled or its signal is switched off.
    /// Names are compared case-insensitively.
    pub fn is_enabled(&self, name: &str, signal: Signal) -> bool {
        let key = name.to_uppercase();
        if let Some(&enabled) = self.overrides.get(&key) {
            return enabled;
        }
        if self.disabled.contains(&key) {
            return false;
        }
        match signal {
            Signal::Traces => self.traces_enabled,
            Signal::Metrics => self.metrics_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_config_deserialize_json() {
        let json = r#"{
            "plugins": ["record-exceptions", "filter-health"],
            "tracesInstrumentationEnabled": true,
            "disabledInstrumentations": ["Grpc"],
            "instrumentations": {"AspNet": {"enabled": false}},
            "telemetry": {"level": "debug"}
        }"#;

        let config: LoaderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.plugins,
            Some(vec!["record-exceptions".to_string(), "filter-health".to_string()])
        );
        assert_eq!(config.traces_instrumentation_enabled, Some(true));
        assert_eq!(config.metrics_instrumentation_enabled, None);
        assert_eq!(config.disabled_instrumentations, Some(vec!["Grpc".to_string()]));
        let instrumentations = config.instrumentations.unwrap();
        assert_eq!(instrumentations["AspNet"].enabled, Some(false));
        assert_eq!(config.telemetry.unwrap().level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_loader_config_deserialize_yaml() {
        let yaml = r#"
plugins:
  - record-exceptions
metricsInstrumentationEnabled: false
telemetry:
  filter: lazy_instr=trace
  ansi: true
"#;

        let config: LoaderConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.plugins, Some(vec!["record-exceptions".to_string()]));
        assert_eq!(config.metrics_instrumentation_enabled, Some(false));
        let telemetry = config.telemetry.unwrap();
        assert_eq!(telemetry.filter.as_deref(), Some("lazy_instr=trace"));
        assert_eq!(telemetry.ansi, Some(true));
    }

    #[test]
    fn test_empty_config_serializes_to_empty_object() {
        let json = serde_json::to_string(&LoaderConfig::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_resolved_defaults_enable_everything() {
        let config = ResolvedConfig::default();
        assert!(config.plugins.is_empty());
        assert!(config.is_enabled("AspNet", Signal::Traces));
        assert!(config.is_enabled("Runtime", Signal::Metrics));
    }

    #[test]
    fn test_is_enabled_precedence() {
        let mut config = ResolvedConfig {
            traces_enabled: false,
            disabled: vec!["GRPC".to_string()],
            ..Default::default()
        };
        config.overrides.insert("ASPNET".to_string(), true);
        config.overrides.insert("RUNTIME".to_string(), false);

        // Explicit switch beats the signal default.
        assert!(config.is_enabled("AspNet", Signal::Traces));
        assert!(!config.is_enabled("Http", Signal::Traces));
        assert!(!config.is_enabled("grpc", Signal::Metrics));
        assert!(!config.is_enabled("Runtime", Signal::Metrics));
        assert!(config.is_enabled("Process", Signal::Metrics));
    }
}
