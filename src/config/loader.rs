// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading from files.
//!
//! Handles loading the loader config from JSON and YAML files.

use std::path::Path;

use crate::error::ConfigurationError;

use super::types::LoaderConfig;

/// Load a configuration file (JSON or YAML).
///
/// The format follows the extension: `.yaml`/`.yml` is YAML, anything else
/// is JSON.
pub fn load_config_file(path: &Path) -> Result<LoaderConfig, ConfigurationError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigurationError::NotFound(path.display().to_string()),
        _ => ConfigurationError::from(e),
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigurationError::from),
        _ => serde_json::from_str(&content).map_err(ConfigurationError::from),
    }
}

/// Load an optional config file. `None` yields no file config.
pub fn load_optional_config_file(
    path: Option<&Path>,
) -> Result<Option<LoaderConfig>, ConfigurationError> {
    path.map(load_config_file).transpose()
}

/// Get an example configuration.
pub fn get_example_config() -> LoaderConfig {
    use super::types::{InstrumentationConfig, TelemetrySettings};

    LoaderConfig {
        plugins: Some(vec!["record-exceptions".to_string()]),
        traces_instrumentation_enabled: Some(true),
        metrics_instrumentation_enabled: Some(true),
        disabled_instrumentations: Some(Vec::new()),
        instrumentations: Some(
            [(
                "AspNet".to_string(),
                InstrumentationConfig {
                    enabled: Some(true),
                },
            )]
            .into_iter()
            .collect(),
        ),
        telemetry: Some(TelemetrySettings {
            level: Some("warn".to_string()),
            filter: None,
            ansi: Some(false),
        }),
    }
}
