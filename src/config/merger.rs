// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration merging.
//!
//! Handles merging the config file and environment variables with proper
//! precedence.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::ConfigurationError;

use super::types::{LoaderConfig, ResolvedConfig};

/// Path of the config file.
pub const CONFIG_FILE_ENV: &str = "OTEL_AUTO_CONFIG_FILE";

/// Plugin names, separated by `:` (or `,` when no `:` is present).
pub const PLUGINS_ENV: &str = "OTEL_AUTO_PLUGINS";

/// Default for every tracing instrumentation.
pub const TRACES_ENABLED_ENV: &str = "OTEL_AUTO_TRACES_INSTRUMENTATION_ENABLED";

/// Default for every metrics instrumentation.
pub const METRICS_ENABLED_ENV: &str = "OTEL_AUTO_METRICS_INSTRUMENTATION_ENABLED";

const ENV_PREFIX: &str = "OTEL_AUTO_";
const ENABLED_SUFFIX: &str = "_INSTRUMENTATION_ENABLED";

/// Options read from environment variables. These override the config file.
#[derive(Debug, Clone, Default)]
pub struct EnvOptions {
    pub config_file: Option<PathBuf>,
    pub plugins: Option<Vec<String>>,
    pub traces_enabled: Option<bool>,
    pub metrics_enabled: Option<bool>,
    /// Per-initializer switches, keyed by upper-cased name.
    pub instrumentations: HashMap<String, bool>,
}

impl EnvOptions {
    /// Read options from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_vars(std::env::vars())
    }

    /// Read options from an explicit set of variables.
    ///
    /// Unrelated variables are ignored. Empty values count as unset.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();

        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            if !key.starts_with(ENV_PREFIX) || value.is_empty() {
                continue;
            }

            match key {
                CONFIG_FILE_ENV => options.config_file = Some(PathBuf::from(value)),
                PLUGINS_ENV => options.plugins = Some(parse_list(value)),
                TRACES_ENABLED_ENV => options.traces_enabled = Some(parse_bool(key, value)?),
                METRICS_ENABLED_ENV => options.metrics_enabled = Some(parse_bool(key, value)?),
                _ => {
                    if let Some(name) = instrumentation_switch(key) {
                        options
                            .instrumentations
                            .insert(name.to_uppercase(), parse_bool(key, value)?);
                    }
                }
            }
        }

        Ok(options)
    }
}

/// Extract `{NAME}` from `OTEL_AUTO_{TRACES|METRICS}_{NAME}_INSTRUMENTATION_ENABLED`.
fn instrumentation_switch(key: &str) -> Option<&str> {
    let rest = key.strip_prefix(ENV_PREFIX)?.strip_suffix(ENABLED_SUFFIX)?;
    let name = rest
        .strip_prefix("TRACES_")
        .or_else(|| rest.strip_prefix("METRICS_"))?;
    (!name.is_empty()).then_some(name)
}

/// Split a plugin list, dropping empty entries.
///
/// If the value contains a `:` it is the separator, so assembly-qualified
/// names like `Acme.Plugin, Acme` survive intact. Otherwise `,` separates.
pub fn parse_list(value: &str) -> Vec<String> {
    let separator = if value.contains(':') { ':' } else { ',' };
    value
        .split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a boolean setting (`true`/`false`/`1`/`0`, case-insensitive).
pub fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigurationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(ConfigurationError::invalid_value(
            field,
            format!("expected true, false, 1 or 0, got '{}'", other),
        )),
    }
}

/// Default configuration values.
pub fn default_config() -> ResolvedConfig {
    ResolvedConfig::default()
}

/// Merge the config file and environment with precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables
/// 2. Config file
/// 3. Default values
pub fn merge_config(file: Option<LoaderConfig>, env: &EnvOptions) -> ResolvedConfig {
    let mut result = default_config();

    if let Some(config) = file {
        apply_file_config(&mut result, config);
    }

    apply_env_options(&mut result, env);

    result
}

fn apply_file_config(result: &mut ResolvedConfig, config: LoaderConfig) {
    if let Some(plugins) = config.plugins {
        result.plugins = plugins;
    }

    if let Some(enabled) = config.traces_instrumentation_enabled {
        result.traces_enabled = enabled;
    }

    if let Some(enabled) = config.metrics_instrumentation_enabled {
        result.metrics_enabled = enabled;
    }

    if let Some(disabled) = config.disabled_instrumentations {
        for name in disabled {
            let name = name.to_uppercase();
            if !result.disabled.contains(&name) {
                result.disabled.push(name);
            }
        }
    }

    if let Some(instrumentations) = config.instrumentations {
        for (name, settings) in instrumentations {
            if let Some(enabled) = settings.enabled {
                result.overrides.insert(name.to_uppercase(), enabled);
            }
        }
    }

    if let Some(telemetry) = config.telemetry {
        result.telemetry = telemetry;
    }
}

fn apply_env_options(result: &mut ResolvedConfig, env: &EnvOptions) {
    // The plugin list is replaced, never appended to.
    if let Some(ref plugins) = env.plugins {
        result.plugins = plugins.clone();
    }

    if let Some(enabled) = env.traces_enabled {
        result.traces_enabled = enabled;
    }

    if let Some(enabled) = env.metrics_enabled {
        result.metrics_enabled = enabled;
    }

    for (name, &enabled) in &env.instrumentations {
        result.overrides.insert(name.clone(), enabled);
    }
}
