// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Lazy instrumentation dispatch.
//!
//! An [`Initializer`] is bound to one or more triggers. The first time any of
//! them is invoked the initializer runs; every later invocation is a no-op.
//! Whatever it builds is handed to the [`LifespanTracker`] and disposed at
//! shutdown.
//!
//! # Example
//!
//! ```rust,ignore
//! use lazy_instr::loader::{Initializer, LazyInstrumentationLoader};
//!
//! let mut builder = LazyInstrumentationLoader::builder();
//! builder.add(Initializer::new("Web", |ctx| Ok(())), &["MVC-First-Call"])?;
//! let loader = builder.build();
//!
//! loader.invoke("MVC-First-Call");
//! let report = loader.shutdown();
//! ```

mod initializer;
mod lifespan;
mod registry;

pub use initializer::{FireOutcome, Initializer, InitializerCallback, TriggerContext};
pub use lifespan::{LifespanManager, LifespanTracker, ShutdownReport};
pub use registry::{LazyInstrumentationLoader, LoaderBuilder, ShutdownGuard};
