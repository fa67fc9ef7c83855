// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Concrete initializers.
//!
//! An initializer is described up front as a [`PendingInitializer`]: a name,
//! the triggers it answers to, and a recipe that turns shared services into
//! an [`Initializer`]. The bootstrap decides which pending initializers are
//! enabled and builds only those.

mod aspnet;
mod deferred;

pub use aspnet::{
    AspNetInitializer, AspNetTraceInstrumentationOptions, ASPNET_INSTRUMENTATION_TYPE,
    MVC_TRIGGER, WEBAPI_TRIGGER,
};
pub use deferred::DeferredInstrumentation;

use std::fmt;
use std::sync::Arc;

use crate::loader::Initializer;
use crate::plugins::PluginManager;
use crate::resolver::TypeResolver;
use crate::types::{Signal, TriggerId};

/// Shared services every initializer callback may use.
#[derive(Clone, Debug)]
pub struct InitializerServices {
    pub resolver: Arc<TypeResolver>,
    pub plugins: Arc<PluginManager>,
}

impl InitializerServices {
    /// Bundle the shared resolver and plugin chain.
    pub fn new(resolver: Arc<TypeResolver>, plugins: Arc<PluginManager>) -> Self {
        Self { resolver, plugins }
    }
}

type BuildFn = Box<dyn FnOnce(&InitializerServices) -> Initializer + Send>;

/// An initializer that has not been built yet.
pub struct PendingInitializer {
    name: String,
    signal: Signal,
    triggers: Vec<TriggerId>,
    build: BuildFn,
}

impl PendingInitializer {
    /// Describe an initializer by name, signal, and triggers.
    pub fn new<F>(name: impl Into<String>, signal: Signal, triggers: Vec<TriggerId>, build: F) -> Self
    where
        F: FnOnce(&InitializerServices) -> Initializer + Send + 'static,
    {
        Self {
            name: name.into(),
            signal,
            triggers,
            build: Box::new(build),
        }
    }

    /// Initializer name, used in logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Telemetry signal the initializer enables.
    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// Trigger points the initializer is bound to.
    pub fn triggers(&self) -> &[TriggerId] {
        &self.triggers
    }

    /// Build the initializer, returning it with its triggers.
    pub fn build(self, services: &InitializerServices) -> (Initializer, Vec<TriggerId>) {
        ((self.build)(services), self.triggers)
    }
}

impl fmt::Debug for PendingInitializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingInitializer")
            .field("name", &self.name)
            .field("signal", &self.signal)
            .field("triggers", &self.triggers)
            .finish()
    }
}
