// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Core types shared by the loader, resolver, and plugin chain.

use serde::{Deserialize, Serialize};
use std::any::{self, Any};
use std::borrow::Borrow;
use std::fmt;

// ============================================================================
// Trigger Identity
// ============================================================================

/// Identity of a trigger source.
///
/// In the assembly-load model this is the name of the framework assembly whose
/// first load makes an instrumentation relevant (e.g. `System.Web.Mvc`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerId(String);

impl TriggerId {
    /// Create a trigger id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TriggerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TriggerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TriggerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TriggerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ============================================================================
// Signals
// ============================================================================

/// Telemetry signal an instrumentation produces. Plugins configure options
/// per signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Traces,
    Metrics,
}

impl Signal {
    /// Lowercase label, as used in logs and config keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Traces => "traces",
            Self::Metrics => "metrics",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Instrumentation Instances
// ============================================================================

/// A live instrumentation component produced by a factory.
///
/// The loader never looks inside an instance. It only keeps it alive and
/// gives it one chance to release its resources at shutdown.
pub trait Instrumentation: Send + Sync {
    /// Human-readable name, used in logs and disposal reports.
    fn name(&self) -> &str;

    /// Release hooks, listeners, and exporters held by this instance.
    fn dispose(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for dyn Instrumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumentation")
            .field("name", &self.name())
            .finish()
    }
}

/// Owned, type-erased instrumentation.
pub type BoxedInstrumentation = Box<dyn Instrumentation>;

// ============================================================================
// Constructor Arguments
// ============================================================================

/// A type-erased positional constructor argument.
pub struct Arg {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl Arg {
    /// Wrap a value as a constructor argument.
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: any::type_name::<T>(),
        }
    }

    /// Name of the wrapped value's type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check whether the argument holds a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Take the value out, or give the argument back if it is not a `T`.
    pub fn downcast<T: Any>(self) -> std::result::Result<T, Arg> {
        let type_name = self.type_name;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Arg { value, type_name }),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arg({})", self.type_name)
    }
}
