// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Generic "resolve, configure, construct, track" initializer.

use std::any::Any;
use std::fmt;

use tracing::debug;

use crate::loader::Initializer;
use crate::resolver::TypeName;
use crate::types::{Arg, Signal, TriggerId};

use super::{InitializerServices, PendingInitializer};

type OptionsFactory<O> = Box<dyn Fn() -> O + Send + Sync>;

/// Builds an initializer for an instrumentation type that is only known by
/// name and takes a single options value.
///
/// When the initializer fires it:
/// 1. resolves the type name through the [`TypeResolver`](crate::resolver::TypeResolver),
/// 2. creates default options,
/// 3. runs the plugin chain over them for the configured signal,
/// 4. constructs the instrumentation with the options,
/// 5. hands the instance to the lifespan tracker.
///
/// A failure at any step stops the sequence; nothing is tracked.
///
/// # Example
///
/// ```rust,ignore
/// let pending = DeferredInstrumentation::new(
///     "Grpc",
///     "Acme.GrpcInstrumentation, Acme.Grpc",
///     GrpcOptions::default,
/// )
/// .bind(&["Grpc.Core"]);
/// ```
pub struct DeferredInstrumentation<O> {
    name: String,
    type_name: String,
    signal: Signal,
    options: OptionsFactory<O>,
}

impl<O: Any + Send + 'static> DeferredInstrumentation<O> {
    /// Describe a tracing instrumentation.
    pub fn new<F>(name: impl Into<String>, type_name: impl Into<String>, options: F) -> Self
    where
        F: Fn() -> O + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            signal: Signal::Traces,
            options: Box::new(options),
        }
    }

    /// Run the plugin chain for a different signal.
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.signal = signal;
        self
    }

    /// Initializer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instrumentation type resolved on activation.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Turn the description into a live, unfired initializer.
    pub fn build(self, services: &InitializerServices) -> Initializer {
        let Self {
            name,
            type_name,
            signal,
            options,
        } = self;
        let resolver = services.resolver.clone();
        let plugins = services.plugins.clone();

        Initializer::new(name, move |ctx| {
            let resolved = resolver.lookup(&TypeName::parse(&type_name)?)?;
            let options = plugins.configure(signal, options())?;
            let instance = resolved.instantiate(vec![Arg::new(options)])?;

            debug!(
                type_name = %resolved.name(),
                instrumentation = %instance.name(),
                "Constructed instrumentation"
            );
            ctx.track(instance);
            Ok(())
        })
    }

    /// Pair the description with the triggers it should answer to.
    pub fn bind<T: AsRef<str>>(self, triggers: &[T]) -> PendingInitializer {
        let triggers = triggers
            .iter()
            .map(|t| TriggerId::from(t.as_ref()))
            .collect();
        PendingInitializer::new(self.name.clone(), self.signal, triggers, move |services| {
            self.build(services)
        })
    }
}

impl<O> fmt::Debug for DeferredInstrumentation<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredInstrumentation")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("signal", &self.signal)
            .finish()
    }
}
