// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Loader configuration.
//!
//! Handles loading and merging of configuration from:
//! - An optional config file (JSON or YAML), named by `OTEL_AUTO_CONFIG_FILE`
//! - `OTEL_AUTO_*` environment variables
//!
//! Configuration is merged with precedence (environment > file > defaults).

mod loader;
mod merger;
mod types;

pub use loader::{get_example_config, load_config_file, load_optional_config_file};

pub use merger::{
    default_config, merge_config, parse_bool, parse_list, EnvOptions, CONFIG_FILE_ENV,
    METRICS_ENABLED_ENV, PLUGINS_ENV, TRACES_ENABLED_ENV,
};

pub use types::{InstrumentationConfig, LoaderConfig, ResolvedConfig, TelemetrySettings};

use crate::error::ConfigurationError;

/// Load and merge all configuration sources.
///
/// The config file is taken from `env.config_file`; a named file that does
/// not exist is an error.
pub fn load_config(env: &EnvOptions) -> Result<ResolvedConfig, ConfigurationError> {
    let file = load_optional_config_file(env.config_file.as_deref())?;
    Ok(merge_config(file, env))
}

/// Load configuration from the process environment.
pub fn load_config_from_env() -> Result<ResolvedConfig, ConfigurationError> {
    load_config(&EnvOptions::from_env()?)
}
