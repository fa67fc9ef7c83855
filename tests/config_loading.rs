// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading through to a built loader.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use lazy_instr::config::{load_config, EnvOptions, CONFIG_FILE_ENV};
use lazy_instr::initializers::{AspNetInitializer, PendingInitializer, MVC_TRIGGER};
use lazy_instr::loader::Initializer;
use lazy_instr::plugins::{Plugin, PluginCatalog, PluginManager};
use lazy_instr::{Bootstrap, ConfigurationError, Signal, TriggerId};

struct Named(&'static str);

impl Plugin for Named {
    fn name(&self) -> &str {
        self.0
    }
}

fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn bootstrap_with_plugins(env: &EnvOptions) -> Result<Bootstrap, ConfigurationError> {
    let mut bootstrap = Bootstrap::new(load_config(env)?);
    for name in ["first", "second", "third"] {
        bootstrap
            .plugins_mut()
            .register(name, move || Ok(Arc::new(Named(name)) as Arc<dyn Plugin>))?;
    }
    bootstrap.with_default_initializers();
    bootstrap.initializer(PendingInitializer::new(
        "Runtime",
        Signal::Metrics,
        vec![TriggerId::from("System.Runtime")],
        |_services| Initializer::new("Runtime", |_ctx| Ok(())),
    ));
    Ok(bootstrap)
}

#[test]
fn test_yaml_file_selects_initializers() {
    let temp = TempDir::new().unwrap();
    let path = write(
        &temp,
        "loader.yaml",
        "plugins:\n  - second\n  - first\ndisabledInstrumentations:\n  - aspnet\n",
    );

    let env = EnvOptions::from_vars([(CONFIG_FILE_ENV, path.as_str())]).unwrap();
    let bootstrap = bootstrap_with_plugins(&env).unwrap();
    assert_eq!(bootstrap.config().plugins, vec!["second", "first"]);

    let loader = bootstrap.build().unwrap();
    assert_eq!(loader.initializer_names(), vec!["Runtime"]);
    assert!(!loader.is_bound(MVC_TRIGGER));
}

#[test]
fn test_env_overrides_json_file() {
    let temp = TempDir::new().unwrap();
    let path = write(
        &temp,
        "loader.json",
        r#"{
            "plugins": ["first"],
            "metricsInstrumentationEnabled": false,
            "instrumentations": {"AspNet": {"enabled": false}}
        }"#,
    );

    let env = EnvOptions::from_vars([
        (CONFIG_FILE_ENV, path.as_str()),
        ("OTEL_AUTO_PLUGINS", "third:first"),
        ("OTEL_AUTO_TRACES_ASPNET_INSTRUMENTATION_ENABLED", "true"),
    ])
    .unwrap();

    let config = load_config(&env).unwrap();
    assert_eq!(config.plugins, vec!["third", "first"]);
    assert!(config.is_enabled(AspNetInitializer::NAME, Signal::Traces));
    assert!(!config.is_enabled("Runtime", Signal::Metrics));

    let loader = bootstrap_with_plugins(&env).unwrap().build().unwrap();
    assert_eq!(loader.initializer_names(), vec![AspNetInitializer::NAME]);
}

#[test]
fn test_unknown_plugin_in_env_fails_setup() {
    let env = EnvOptions::from_vars([("OTEL_AUTO_PLUGINS", "first,missing")]).unwrap();
    let err = bootstrap_with_plugins(&env).unwrap().build().unwrap_err();
    assert!(matches!(err, ConfigurationError::UnknownPlugin(ref name) if name == "missing"));
}

#[test]
fn test_invalid_switch_fails_setup() {
    let err = EnvOptions::from_vars([("OTEL_AUTO_METRICS_INSTRUMENTATION_ENABLED", "enabled")])
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
}

#[test]
fn test_missing_config_file_fails_setup() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.yaml");
    let env = EnvOptions::from_vars([(CONFIG_FILE_ENV, missing.to_str().unwrap())]).unwrap();
    assert!(matches!(load_config(&env), Err(ConfigurationError::NotFound(_))));
}

#[test]
fn test_plugin_catalog_order_matches_config() {
    let env = EnvOptions::from_vars([("OTEL_AUTO_PLUGINS", "third:second:first")]).unwrap();
    let config = load_config(&env).unwrap();

    let bootstrap = bootstrap_with_plugins(&env).unwrap();
    assert_eq!(bootstrap.config(), &config);

    let mut catalog = PluginCatalog::new();
    for name in ["first", "second", "third"] {
        catalog
            .register(name, move || Ok(Arc::new(Named(name)) as Arc<dyn Plugin>))
            .unwrap();
    }
    let manager: PluginManager = catalog.build_manager(&config.plugins).unwrap();
    assert_eq!(manager.names(), vec!["third", "second", "first"]);
}
