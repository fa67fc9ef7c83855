// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Lazy instrumentation dispatch.
//!
//! Instrumentation for a framework is expensive to set up and pointless if
//! the framework is never used. This crate defers it: each instrumentation is
//! wrapped in an initializer bound to the triggers (typically framework
//! assembly loads) that make it relevant. The first trigger to fire runs the
//! initializer exactly once; every later one is a cheap no-op.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`types`] - Core types (TriggerId, Signal, Instrumentation, Arg)
//! - [`error`] - Error types and result aliases
//! - [`config`] - Configuration loading and merging
//! - [`loader`] - Initializers, trigger bindings, and lifespan tracking
//! - [`resolver`] - Name-based instrumentation type lookup and construction
//! - [`plugins`] - Ordered plugin chain that adjusts options before construction
//! - [`initializers`] - Concrete initializers (ASP.NET) and the generic deferred one
//! - [`bootstrap`] - Startup wiring from configuration to a ready loader
//! - [`telemetry`] - Diagnostic logging, activation spans, and metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use lazy_instr::bootstrap::Bootstrap;
//! use lazy_instr::initializers::MVC_TRIGGER;
//!
//! let mut bootstrap = Bootstrap::from_env()?;
//! bootstrap.with_default_initializers();
//! let loader = bootstrap.build()?;
//!
//! // From the assembly-load hook:
//! loader.on_assembly_loaded(MVC_TRIGGER);
//!
//! // At process exit:
//! let report = loader.shutdown();
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod initializers;
pub mod loader;
pub mod plugins;
pub mod resolver;
pub mod telemetry;
pub mod types;

// Re-export commonly used types at crate root
pub use bootstrap::Bootstrap;
pub use error::{
    ActivationError, ConfigurationError, DisposalError, PluginError, ResolutionError, Result,
};
pub use loader::{
    FireOutcome, Initializer, LazyInstrumentationLoader, LifespanManager, LifespanTracker,
    LoaderBuilder, ShutdownGuard, ShutdownReport, TriggerContext,
};
pub use plugins::{Plugin, PluginManager};
pub use resolver::{ComponentDescriptor, TypeName, TypeResolver};
pub use types::{Arg, BoxedInstrumentation, Instrumentation, Signal, TriggerId};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
