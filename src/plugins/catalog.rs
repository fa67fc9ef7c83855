// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Named plugin factories, resolved from configuration.
//!
//! The configured plugin list is just names. Each name must have a factory
//! in the catalog; an unknown name stops setup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::error::ConfigurationError;

use super::manager::{Plugin, PluginManager};

/// Creates a plugin instance.
pub type PluginFactory = Arc<dyn Fn() -> anyhow::Result<Arc<dyn Plugin>> + Send + Sync>;

/// Catalog of plugins that configuration may refer to by name.
#[derive(Default)]
pub struct PluginCatalog {
    factories: HashMap<String, PluginFactory>,
}

impl PluginCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a plugin factory under a name.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<&mut Self, ConfigurationError>
    where
        F: Fn() -> anyhow::Result<Arc<dyn Plugin>> + Send + Sync + 'static,
    {
        if self.factories.contains_key(name) {
            return Err(ConfigurationError::DuplicatePlugin(name.to_string()));
        }
        self.factories.insert(name.to_string(), Arc::new(factory));
        Ok(self)
    }

    /// Check whether a plugin name is known.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// All known plugin names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiate the named plugins, in the given order, as a plugin chain.
    pub fn build_manager<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<PluginManager, ConfigurationError> {
        let mut builder = PluginManager::builder();

        for name in names {
            let name = name.as_ref();
            let factory = self
                .factories
                .get(name)
                .ok_or_else(|| ConfigurationError::UnknownPlugin(name.to_string()))?;
            let plugin = factory().map_err(|source| ConfigurationError::PluginInitialization {
                plugin: name.to_string(),
                source,
            })?;
            builder.register_shared(plugin);
        }

        let manager = builder.build()?;
        if !manager.is_empty() {
            info!(plugins = ?manager.names(), "Plugin chain ready");
        }
        Ok(manager)
    }
}

impl fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginCatalog")
            .field("plugins", &self.names())
            .finish()
    }
}
