// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Plugin trait and the ordered plugin chain.
//!
//! This module defines the core abstractions for configuration plugins:
//! - [`Plugin`] trait that all plugins implement
//! - [`OptionsPlugin`] adapter for plugins that only care about one options type
//! - [`PluginManager`] which runs the chain in registration order

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{ConfigurationError, PluginError};
use crate::types::Signal;

/// An externally supplied extension that adjusts instrumentation options
/// before the instrumentation is constructed.
///
/// Options arrive type-erased. A plugin downcasts to the option types it
/// knows and leaves everything else alone.
///
/// # Example
///
/// ```rust,ignore
/// use lazy_instr::plugins::Plugin;
///
/// struct RecordExceptions;
///
/// impl Plugin for RecordExceptions {
///     fn name(&self) -> &str {
///         "record-exceptions"
///     }
///
///     fn configure_traces_options(&self, options: &mut dyn Any) -> anyhow::Result<()> {
///         if let Some(options) = options.downcast_mut::<AspNetTraceInstrumentationOptions>() {
///             options.record_exception = true;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// Name used in logs and error reports.
    fn name(&self) -> &str;

    /// Called once when the plugin chain is built.
    fn initializing(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Adjust options of a tracing instrumentation.
    fn configure_traces_options(&self, _options: &mut dyn Any) -> anyhow::Result<()> {
        Ok(())
    }

    /// Adjust options of a metrics instrumentation.
    fn configure_metrics_options(&self, _options: &mut dyn Any) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Plugin built from a closure over one concrete options type.
///
/// Options of any other type pass through untouched.
pub struct OptionsPlugin<O, F> {
    name: String,
    signal: Signal,
    configure: F,
    _options: PhantomData<fn(&mut O)>,
}

impl<O, F> OptionsPlugin<O, F>
where
    O: Any,
    F: Fn(&mut O) -> anyhow::Result<()> + Send + Sync,
{
    /// Plugin for a tracing options type.
    pub fn traces(name: impl Into<String>, configure: F) -> Self {
        Self::new(name, Signal::Traces, configure)
    }

    /// Plugin for a metrics options type.
    pub fn metrics(name: impl Into<String>, configure: F) -> Self {
        Self::new(name, Signal::Metrics, configure)
    }

    fn new(name: impl Into<String>, signal: Signal, configure: F) -> Self {
        Self {
            name: name.into(),
            signal,
            configure,
            _options: PhantomData,
        }
    }

    fn apply(&self, signal: Signal, options: &mut dyn Any) -> anyhow::Result<()> {
        if signal != self.signal {
            return Ok(());
        }
        match options.downcast_mut::<O>() {
            Some(options) => (self.configure)(options),
            None => Ok(()),
        }
    }
}

impl<O, F> Plugin for OptionsPlugin<O, F>
where
    O: Any,
    F: Fn(&mut O) -> anyhow::Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn configure_traces_options(&self, options: &mut dyn Any) -> anyhow::Result<()> {
        self.apply(Signal::Traces, options)
    }

    fn configure_metrics_options(&self, options: &mut dyn Any) -> anyhow::Result<()> {
        self.apply(Signal::Metrics, options)
    }
}

/// Ordered chain of plugins.
///
/// Plugins run strictly in registration order; each sees the options as left
/// by the previous one. The first failure stops the chain and the options
/// are dropped.
#[derive(Clone, Default)]
pub struct PluginManager {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginManager {
    /// A chain with no plugins; options pass through unchanged.
    pub fn empty() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Start building a chain.
    pub fn builder() -> PluginManagerBuilder {
        PluginManagerBuilder::new()
    }

    /// Number of plugins in the chain.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin names, in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Run every plugin over `options` for the given signal.
    pub fn configure<O: Any>(&self, signal: Signal, mut options: O) -> Result<O, PluginError> {
        for plugin in &self.plugins {
            let result = match signal {
                Signal::Traces => plugin.configure_traces_options(&mut options),
                Signal::Metrics => plugin.configure_metrics_options(&mut options),
            };

            if let Err(source) = result {
                return Err(PluginError {
                    plugin: plugin.name().to_string(),
                    signal,
                    source,
                });
            }

            trace!(plugin = %plugin.name(), %signal, "Plugin configured options");
        }

        Ok(options)
    }

    /// Run the chain over tracing options.
    pub fn configure_traces_options<O: Any>(&self, options: O) -> Result<O, PluginError> {
        self.configure(Signal::Traces, options)
    }

    /// Run the chain over metrics options.
    pub fn configure_metrics_options<O: Any>(&self, options: O) -> Result<O, PluginError> {
        self.configure(Signal::Metrics, options)
    }
}

impl fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugins", &self.names())
            .finish()
    }
}

/// Builder for constructing a [`PluginManager`].
#[derive(Default)]
pub struct PluginManagerBuilder {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginManagerBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Append a plugin to the chain.
    pub fn register<P: Plugin + 'static>(&mut self, plugin: P) -> &mut Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Append a shared plugin to the chain.
    pub fn register_shared(&mut self, plugin: Arc<dyn Plugin>) -> &mut Self {
        self.plugins.push(plugin);
        self
    }

    /// Validate names, run every plugin's `initializing` hook, and freeze
    /// the chain.
    pub fn build(self) -> Result<PluginManager, ConfigurationError> {
        let mut seen = HashSet::new();
        for plugin in &self.plugins {
            if !seen.insert(plugin.name().to_string()) {
                return Err(ConfigurationError::DuplicatePlugin(plugin.name().to_string()));
            }
        }

        for plugin in &self.plugins {
            plugin
                .initializing()
                .map_err(|source| ConfigurationError::PluginInitialization {
                    plugin: plugin.name().to_string(),
                    source,
                })?;
            debug!(plugin = %plugin.name(), "Plugin initialized");
        }

        Ok(PluginManager {
            plugins: self.plugins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct TestOptions {
        x: u32,
        seen_by: Vec<String>,
    }

    fn set_x(name: &str, value: u32) -> impl Plugin {
        let label = name.to_string();
        OptionsPlugin::traces(name, move |options: &mut TestOptions| {
            options.x = value;
            options.seen_by.push(label.clone());
            Ok(())
        })
    }

    #[test]
    fn test_empty_chain_passes_options_through() {
        let manager = PluginManager::empty();
        let options = manager
            .configure_traces_options(TestOptions {
                x: 7,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(options.x, 7);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_plugins_run_in_registration_order() {
        let mut builder = PluginManager::builder();
        builder.register(set_x("p1", 1));
        builder.register(set_x("p2", 2));
        let manager = builder.build().unwrap();

        let options = manager.configure_traces_options(TestOptions::default()).unwrap();
        assert_eq!(options.x, 2);
        assert_eq!(options.seen_by, vec!["p1", "p2"]);
        assert_eq!(manager.names(), vec!["p1", "p2"]);
    }

    #[test]
    fn test_failure_aborts_remaining_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let after = calls.clone();

        let mut builder = PluginManager::builder();
        builder.register(set_x("p1", 1));
        builder.register(OptionsPlugin::traces("broken", |_: &mut TestOptions| {
            anyhow::bail!("invalid sampler")
        }));
        builder.register(OptionsPlugin::traces("p3", move |_: &mut TestOptions| {
            after.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        let manager = builder.build().unwrap();

        let err = manager
            .configure_traces_options(TestOptions::default())
            .unwrap_err();
        assert_eq!(err.plugin, "broken");
        assert_eq!(err.signal, Signal::Traces);
        assert!(err.to_string().contains("invalid sampler"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_options_plugin_ignores_other_types_and_signals() {
        let mut builder = PluginManager::builder();
        builder.register(set_x("traces-only", 5));
        let manager = builder.build().unwrap();

        let options = manager.configure_metrics_options(TestOptions::default()).unwrap();
        assert_eq!(options.x, 0);

        let other = manager.configure_traces_options(String::from("untouched")).unwrap();
        assert_eq!(other, "untouched");
    }

    #[test]
    fn test_custom_plugin_sees_both_signals() {
        struct Counting(Mutex<Vec<Signal>>);

        impl Plugin for Counting {
            fn name(&self) -> &str {
                "counting"
            }

            fn configure_traces_options(&self, _options: &mut dyn Any) -> anyhow::Result<()> {
                self.0.lock().unwrap().push(Signal::Traces);
                Ok(())
            }

            fn configure_metrics_options(&self, _options: &mut dyn Any) -> anyhow::Result<()> {
                self.0.lock().unwrap().push(Signal::Metrics);
                Ok(())
            }
        }

        let plugin = Arc::new(Counting(Mutex::new(Vec::new())));
        let mut builder = PluginManager::builder();
        builder.register_shared(plugin.clone());
        let manager = builder.build().unwrap();

        manager.configure_traces_options(1u8).unwrap();
        manager.configure_metrics_options(2u8).unwrap();
        assert_eq!(
            *plugin.0.lock().unwrap(),
            vec![Signal::Traces, Signal::Metrics]
        );
    }

    #[test]
    fn test_build_runs_initializing_hooks() {
        struct Init(Arc<AtomicUsize>);

        impl Plugin for Init {
            fn name(&self) -> &str {
                "init"
            }

            fn initializing(&self) -> anyhow::Result<()> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let count = Arc::new(AtomicUsize::new(0));
        let mut builder = PluginManager::builder();
        builder.register(Init(count.clone()));
        builder.build().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_build_reports_initialization_failure() {
        struct Failing;

        impl Plugin for Failing {
            fn name(&self) -> &str {
                "failing"
            }

            fn initializing(&self) -> anyhow::Result<()> {
                anyhow::bail!("exporter endpoint missing")
            }
        }

        let mut builder = PluginManager::builder();
        builder.register(Failing);
        let err = builder.build().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::PluginInitialization { ref plugin, .. } if plugin == "failing"
        ));
    }

    #[test]
    fn test_build_rejects_duplicate_names() {
        let mut builder = PluginManager::builder();
        builder.register(set_x("same", 1));
        builder.register(set_x("same", 2));
        let err = builder.build().unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicatePlugin(_)));
    }
}
