// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Initializers and their exactly-once gate.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::{info, trace, warn};

use crate::error::{panic_message, ActivationError};
use crate::types::{BoxedInstrumentation, TriggerId};

use super::lifespan::LifespanManager;

/// What an initializer callback gets to work with.
pub struct TriggerContext<'a> {
    trigger: &'a TriggerId,
    lifespan: &'a dyn LifespanManager,
}

impl<'a> TriggerContext<'a> {
    /// Create a context for one trigger invocation.
    pub fn new(trigger: &'a TriggerId, lifespan: &'a dyn LifespanManager) -> Self {
        Self { trigger, lifespan }
    }

    /// The trigger that caused this invocation.
    pub fn trigger(&self) -> &TriggerId {
        self.trigger
    }

    /// Where built instances go.
    pub fn lifespan(&self) -> &dyn LifespanManager {
        self.lifespan
    }

    /// Hand an instance to the lifespan tracker.
    pub fn track(&self, instance: BoxedInstrumentation) {
        self.lifespan.track(instance);
    }
}

/// Result of a single [`Initializer::fire`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// This call won the gate and the callback succeeded.
    Activated,
    /// This call won the gate and the callback failed; the failure was logged.
    Failed,
    /// Another call already claimed the gate.
    AlreadyFired,
}

impl FireOutcome {
    /// Whether this call ran the callback.
    pub fn ran(&self) -> bool {
        !matches!(self, Self::AlreadyFired)
    }
}

/// Deferred work producing one instrumentation.
pub type InitializerCallback =
    Box<dyn Fn(&TriggerContext<'_>) -> Result<(), ActivationError> + Send + Sync>;

/// A named, fire-once unit of deferred work.
///
/// The gate is claimed with a single compare-and-set before the callback
/// runs. Losing calls return immediately; they never wait for the winner,
/// never retry, and never see its outcome.
///
/// Call counters live on the initializer as plain atomics. Only the winning
/// call touches the shared metrics registry.
pub struct Initializer {
    name: String,
    fired: AtomicBool,
    fires: AtomicU64,
    rejected: AtomicU64,
    callback: InitializerCallback,
}

impl Initializer {
    /// Create an initializer around a callback.
    pub fn new<F>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&TriggerContext<'_>) -> Result<(), ActivationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            fired: AtomicBool::new(false),
            fires: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            callback: Box::new(callback),
        }
    }

    /// Stable name of this initializer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether some call has claimed the gate. The callback may still be running.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Total `fire` calls, winners and losers.
    pub fn fire_count(&self) -> u64 {
        self.fires.load(Ordering::Relaxed)
    }

    /// `fire` calls that found the gate already claimed.
    pub fn rejected_count(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    fn try_claim(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Run the callback if no call has before.
    ///
    /// Never fails and never unwinds into the caller: whatever goes wrong
    /// inside the callback is logged and reported as [`FireOutcome::Failed`].
    /// A panic still reaches the process panic hook, which belongs to the
    /// host and is left untouched.
    pub fn fire(&self, ctx: &TriggerContext<'_>) -> FireOutcome {
        self.fires.fetch_add(1, Ordering::Relaxed);

        if !self.try_claim() {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            trace!(initializer = %self.name, trigger = %ctx.trigger(), "Initializer already fired");
            return FireOutcome::AlreadyFired;
        }

        #[cfg(feature = "telemetry")]
        let span = crate::telemetry::ActivationSpan::start(&self.name, ctx.trigger().as_str());

        let result = {
            #[cfg(feature = "telemetry")]
            let _entered = span.enter();

            panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(ctx)))
                .unwrap_or_else(|payload| Err(ActivationError::Panicked(panic_message(payload.as_ref()))))
        };

        match result {
            Ok(()) => {
                #[cfg(feature = "telemetry")]
                span.finish(None);

                info!(initializer = %self.name, trigger = %ctx.trigger(), "Instrumentation activated");
                FireOutcome::Activated
            }
            Err(err) => {
                #[cfg(feature = "telemetry")]
                span.finish(Some(err.kind()));

                warn!(
                    initializer = %self.name,
                    trigger = %ctx.trigger(),
                    kind = err.kind(),
                    error = %err,
                    "Instrumentation failed to activate"
                );
                FireOutcome::Failed
            }
        }
    }
}

impl fmt::Debug for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Initializer")
            .field("name", &self.name)
            .field("fired", &self.has_fired())
            .field("fires", &self.fire_count())
            .finish()
    }
}
