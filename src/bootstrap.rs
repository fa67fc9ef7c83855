// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Startup wiring: configuration, plugins, types, and initializers in, a
//! ready [`LazyInstrumentationLoader`] out.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{load_config_from_env, ResolvedConfig};
use crate::error::ConfigurationError;
use crate::initializers::{AspNetInitializer, InitializerServices, PendingInitializer};
use crate::loader::{LazyInstrumentationLoader, LoaderBuilder};
use crate::plugins::PluginCatalog;
use crate::resolver::TypeResolver;
use crate::types::TriggerId;

/// Collects everything the loader needs and builds it in one step.
///
/// # Example
///
/// ```rust,ignore
/// use lazy_instr::bootstrap::Bootstrap;
///
/// let mut bootstrap = Bootstrap::from_env()?;
/// bootstrap.resolver_mut().register(ASPNET_INSTRUMENTATION_TYPE, AspNetInstrumentation::new)?;
/// bootstrap.plugins_mut().register("record-exceptions", || Ok(Arc::new(RecordExceptions)))?;
/// bootstrap.with_default_initializers();
///
/// let loader = bootstrap.build()?;
/// ```
pub struct Bootstrap {
    config: ResolvedConfig,
    resolver: TypeResolver,
    plugins: PluginCatalog,
    initializers: Vec<PendingInitializer>,
    observed: Vec<TriggerId>,
}

impl Bootstrap {
    pub fn new(config: ResolvedConfig) -> Self {
        Self {
            config,
            resolver: TypeResolver::new(),
            plugins: PluginCatalog::new(),
            initializers: Vec::new(),
            observed: Vec::new(),
        }
    }

    /// Start from the configuration found in the environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Ok(Self::new(load_config_from_env()?))
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Types that initializers may resolve.
    pub fn resolver_mut(&mut self) -> &mut TypeResolver {
        &mut self.resolver
    }

    /// Plugins that the configuration may name.
    pub fn plugins_mut(&mut self) -> &mut PluginCatalog {
        &mut self.plugins
    }

    /// Add an initializer. Whether it is registered is decided at build time.
    pub fn initializer(&mut self, pending: PendingInitializer) -> &mut Self {
        self.initializers.push(pending);
        self
    }

    /// Add the built-in initializers.
    pub fn with_default_initializers(&mut self) -> &mut Self {
        self.initializer(AspNetInitializer::pending())
    }

    /// Record a trigger that has already happened.
    pub fn mark_observed(&mut self, trigger: impl Into<TriggerId>) -> &mut Self {
        self.observed.push(trigger.into());
        self
    }

    /// Diagnostic logging settings from the configuration.
    #[cfg(feature = "telemetry")]
    pub fn telemetry_config(&self) -> Result<crate::telemetry::TelemetryConfig, ConfigurationError> {
        crate::telemetry::TelemetryConfig::from_settings(&self.config.telemetry)
    }

    /// Resolve plugins, register enabled initializers, and build the loader.
    ///
    /// Fails on an unknown or failing plugin and on conflicting trigger
    /// bindings. Nothing has fired if this returns an error.
    pub fn build(self) -> Result<LazyInstrumentationLoader, ConfigurationError> {
        let plugins = self.plugins.build_manager(&self.config.plugins)?;
        let services = InitializerServices::new(Arc::new(self.resolver), Arc::new(plugins));

        let mut builder = LoaderBuilder::new();
        for pending in self.initializers {
            if !self.config.is_enabled(pending.name(), pending.signal()) {
                info!(
                    initializer = %pending.name(),
                    signal = %pending.signal(),
                    "Instrumentation disabled by configuration"
                );
                continue;
            }

            debug!(initializer = %pending.name(), triggers = pending.triggers().len(), "Registering initializer");
            let (initializer, triggers) = pending.build(&services);
            builder.add(initializer, &triggers)?;
        }

        for trigger in self.observed {
            builder.mark_observed(trigger);
        }

        Ok(builder.build())
    }
}
