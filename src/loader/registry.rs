// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Trigger bindings and the lazy instrumentation loader.
//!
//! Bindings are collected in a [`LoaderBuilder`] and frozen by
//! [`LoaderBuilder::build`]. The resulting [`LazyInstrumentationLoader`] never
//! mutates its binding map, so `invoke` is a plain hash lookup plus one atomic
//! operation on the bound initializer.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::error::ConfigurationError;
use crate::types::TriggerId;

use super::initializer::{FireOutcome, Initializer, TriggerContext};
use super::lifespan::{LifespanManager, LifespanTracker, ShutdownReport};

/// Builder for constructing a [`LazyInstrumentationLoader`].
///
/// # Example
///
/// ```rust,ignore
/// use lazy_instr::loader::{Initializer, LoaderBuilder};
///
/// let mut builder = LoaderBuilder::new();
/// builder.add(Initializer::new("Web", build_web), &["MVC-First-Call", "WebAPI-First-Call"])?;
/// let loader = builder.build();
///
/// // Called by the interception layer:
/// loader.invoke("MVC-First-Call");
/// ```
#[derive(Default)]
pub struct LoaderBuilder {
    bindings: HashMap<TriggerId, Arc<Initializer>>,
    initializers: Vec<Arc<Initializer>>,
    observed: Vec<TriggerId>,
    lifespan: Option<Arc<LifespanTracker>>,
}

impl LoaderBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a trigger to an initializer.
    ///
    /// A trigger can have only one initializer. A second binding for the same
    /// trigger is rejected and the first one stays in place.
    pub fn register(
        &mut self,
        trigger: impl Into<TriggerId>,
        initializer: Arc<Initializer>,
    ) -> Result<&mut Self, ConfigurationError> {
        let trigger = trigger.into();
        self.check_unbound(&trigger, &initializer)?;
        self.remember(&initializer);

        debug!(trigger = %trigger, initializer = %initializer.name(), "Bound trigger");
        self.bindings.insert(trigger, initializer);
        Ok(self)
    }

    /// Bind one initializer to several triggers.
    ///
    /// Either every binding is made or, if any trigger is already taken,
    /// none is.
    pub fn add<T: AsRef<str>>(
        &mut self,
        initializer: Initializer,
        triggers: &[T],
    ) -> Result<Arc<Initializer>, ConfigurationError> {
        let initializer = Arc::new(initializer);
        let triggers: Vec<TriggerId> = triggers
            .iter()
            .map(|t| TriggerId::from(t.as_ref()))
            .collect();

        let mut seen = HashSet::new();
        for trigger in &triggers {
            self.check_unbound(trigger, &initializer)?;
            if !seen.insert(trigger) {
                return Err(ConfigurationError::DuplicateBinding {
                    trigger: trigger.to_string(),
                    existing: initializer.name().to_string(),
                    rejected: initializer.name().to_string(),
                });
            }
        }

        for trigger in triggers {
            self.register(trigger, initializer.clone())?;
        }
        self.remember(&initializer);
        Ok(initializer)
    }

    /// Record a trigger that already happened before the loader existed,
    /// e.g. an assembly that was loaded before the hook was installed.
    /// Its initializer fires as soon as the loader is built.
    pub fn mark_observed(&mut self, trigger: impl Into<TriggerId>) -> &mut Self {
        self.observed.push(trigger.into());
        self
    }

    /// Use a specific lifespan tracker instead of a fresh one.
    pub fn with_lifespan(&mut self, lifespan: Arc<LifespanTracker>) -> &mut Self {
        self.lifespan = Some(lifespan);
        self
    }

    /// Whether a trigger already has a binding.
    pub fn is_bound(&self, trigger: &str) -> bool {
        self.bindings.contains_key(trigger)
    }

    /// Freeze the bindings and fire anything already observed.
    pub fn build(self) -> LazyInstrumentationLoader {
        let loader = LazyInstrumentationLoader {
            bindings: self.bindings,
            initializers: self.initializers,
            lifespan: self.lifespan.unwrap_or_default(),
        };

        info!(
            initializers = loader.initializers.len(),
            triggers = loader.bindings.len(),
            "Lazy instrumentation loader ready"
        );

        for trigger in &self.observed {
            loader.invoke(trigger.as_str());
        }

        loader
    }

    fn check_unbound(
        &self,
        trigger: &TriggerId,
        initializer: &Initializer,
    ) -> Result<(), ConfigurationError> {
        match self.bindings.get(trigger) {
            Some(existing) => Err(ConfigurationError::DuplicateBinding {
                trigger: trigger.to_string(),
                existing: existing.name().to_string(),
                rejected: initializer.name().to_string(),
            }),
            None => Ok(()),
        }
    }

    fn remember(&mut self, initializer: &Arc<Initializer>) {
        if !self.initializers.iter().any(|i| Arc::ptr_eq(i, initializer)) {
            self.initializers.push(initializer.clone());
        }
    }
}

impl fmt::Debug for LoaderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut triggers: Vec<&str> = self.bindings.keys().map(TriggerId::as_str).collect();
        triggers.sort_unstable();
        let initializers: Vec<&str> = self.initializers.iter().map(|i| i.name()).collect();

        f.debug_struct("LoaderBuilder")
            .field("initializers", &initializers)
            .field("triggers", &triggers)
            .field("observed", &self.observed)
            .finish()
    }
}

/// Dispatches trigger invocations to their initializers and owns the
/// instances they produce.
///
/// Dropping the loader disposes every tracked instance, if
/// [`shutdown`](Self::shutdown) has not already done so.
pub struct LazyInstrumentationLoader {
    bindings: HashMap<TriggerId, Arc<Initializer>>,
    initializers: Vec<Arc<Initializer>>,
    lifespan: Arc<LifespanTracker>,
}

impl LazyInstrumentationLoader {
    /// Start building a loader.
    pub fn builder() -> LoaderBuilder {
        LoaderBuilder::new()
    }

    /// Signal that a trigger source has been reached.
    ///
    /// Returns `None` if nothing is bound to the trigger. Never fails: the
    /// caller is host application code.
    pub fn invoke(&self, trigger: &str) -> Option<FireOutcome> {
        let Some((trigger, initializer)) = self.bindings.get_key_value(trigger) else {
            trace!(trigger = %trigger, "No initializer bound to trigger");
            return None;
        };

        let lifespan: &dyn LifespanManager = &*self.lifespan;
        Some(initializer.fire(&TriggerContext::new(trigger, lifespan)))
    }

    /// Signal that an assembly has been loaded into the process.
    pub fn on_assembly_loaded(&self, assembly_name: &str) -> Option<FireOutcome> {
        self.invoke(assembly_name)
    }

    /// Whether a trigger has a binding.
    pub fn is_bound(&self, trigger: &str) -> bool {
        self.bindings.contains_key(trigger)
    }

    /// The initializer bound to a trigger.
    pub fn initializer_for(&self, trigger: &str) -> Option<&Arc<Initializer>> {
        self.bindings.get(trigger)
    }

    /// Find an initializer by name.
    pub fn initializer(&self, name: &str) -> Option<&Arc<Initializer>> {
        self.initializers.iter().find(|i| i.name() == name)
    }

    /// Names of all registered initializers, in registration order.
    pub fn initializer_names(&self) -> Vec<&str> {
        self.initializers.iter().map(|i| i.name()).collect()
    }

    /// All bound triggers, sorted.
    pub fn triggers(&self) -> Vec<&str> {
        let mut triggers: Vec<&str> = self.bindings.keys().map(TriggerId::as_str).collect();
        triggers.sort_unstable();
        triggers
    }

    /// Number of live instrumentation instances.
    pub fn tracked_count(&self) -> usize {
        self.lifespan.len()
    }

    /// The tracker holding produced instances.
    pub fn lifespan(&self) -> &Arc<LifespanTracker> {
        &self.lifespan
    }

    /// Dispose every produced instance.
    pub fn shutdown(&self) -> ShutdownReport {
        self.lifespan.shutdown_all()
    }
}

impl Drop for LazyInstrumentationLoader {
    fn drop(&mut self) {
        if !self.lifespan.is_shut_down() {
            self.lifespan.shutdown_all();
        }
    }
}

impl fmt::Debug for LazyInstrumentationLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyInstrumentationLoader")
            .field("initializers", &self.initializer_names())
            .field("triggers", &self.triggers())
            .field("tracked", &self.tracked_count())
            .finish()
    }
}

/// Shuts a shared loader down when dropped.
///
/// Hand this to whatever runs at process exit.
pub struct ShutdownGuard {
    loader: Arc<LazyInstrumentationLoader>,
}

impl ShutdownGuard {
    /// Guard a shared loader.
    pub fn new(loader: Arc<LazyInstrumentationLoader>) -> Self {
        Self { loader }
    }

    /// The guarded loader.
    pub fn loader(&self) -> &Arc<LazyInstrumentationLoader> {
        &self.loader
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.loader.shutdown();
    }
}
