// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Lifespan tracking for instrumentation instances.
//!
//! Every instrumentation an initializer produces is handed to the tracker,
//! which keeps it alive until shutdown and then disposes it. Disposal is
//! best-effort: one failing instance does not stop the others.

use std::panic::{self, AssertUnwindSafe};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{panic_message, DisposalError};
use crate::types::BoxedInstrumentation;

/// Receiver for freshly built instrumentation instances.
///
/// Initializer callbacks only see this trait, so they can be exercised
/// against a stand-in tracker.
pub trait LifespanManager: Send + Sync {
    /// Take ownership of an instance until shutdown.
    fn track(&self, instance: BoxedInstrumentation);
}

/// Outcome of disposing every tracked instance.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Instances disposed without error.
    pub disposed: usize,

    /// Instances whose disposal failed.
    pub failed: Vec<DisposalError>,
}

impl ShutdownReport {
    /// Whether every disposal succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total disposal attempts.
    pub fn attempted(&self) -> usize {
        self.disposed + self.failed.len()
    }
}

#[derive(Default)]
struct TrackerState {
    instances: Vec<BoxedInstrumentation>,
    closed: bool,
}

/// Holds instrumentation instances and disposes them at shutdown.
///
/// Appends happen at most once per initializer, so a plain mutex is enough.
/// Instances are disposed in reverse tracking order. Once shut down, the
/// tracker disposes any late arrival straight away instead of keeping it.
#[derive(Default)]
pub struct LifespanTracker {
    state: Mutex<TrackerState>,
}

impl LifespanTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instances currently held.
    pub fn len(&self) -> usize {
        self.state.lock().instances.len()
    }

    /// Whether no instances are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`shutdown_all`](Self::shutdown_all) has run.
    pub fn is_shut_down(&self) -> bool {
        self.state.lock().closed
    }

    /// Names of the held instances, in tracking order.
    pub fn instance_names(&self) -> Vec<String> {
        self.state
            .lock()
            .instances
            .iter()
            .map(|i| i.name().to_string())
            .collect()
    }

    /// Dispose every tracked instance.
    ///
    /// Runs at most once; later calls find nothing to dispose and return an
    /// empty report.
    pub fn shutdown_all(&self) -> ShutdownReport {
        // Take the instances out so no lock is held while user code runs.
        let instances = {
            let mut state = self.state.lock();
            state.closed = true;
            std::mem::take(&mut state.instances)
        };

        let mut report = ShutdownReport::default();
        if instances.is_empty() {
            return report;
        }

        info!(count = instances.len(), "Disposing instrumentations");
        for mut instance in instances.into_iter().rev() {
            match dispose(&mut instance) {
                Ok(()) => report.disposed += 1,
                Err(err) => {
                    warn!(instrumentation = %err.instrumentation(), error = %err, "Instrumentation disposal failed");
                    report.failed.push(err);
                }
            }
        }

        info!(
            disposed = report.disposed,
            failed = report.failed.len(),
            "Instrumentations disposed"
        );
        report
    }
}

impl LifespanManager for LifespanTracker {
    fn track(&self, instance: BoxedInstrumentation) {
        let mut instance = {
            let mut state = self.state.lock();
            if !state.closed {
                debug!(instrumentation = %instance.name(), "Tracking instrumentation");
                state.instances.push(instance);
                return;
            }
            instance
        };

        warn!(
            instrumentation = %instance.name(),
            "Instrumentation arrived after shutdown, disposing immediately"
        );
        if let Err(err) = dispose(&mut instance) {
            warn!(instrumentation = %err.instrumentation(), error = %err, "Instrumentation disposal failed");
        }
    }
}

/// Dispose one instance, turning errors and panics into a [`DisposalError`].
///
/// A panic is caught but still passes through the process panic hook,
/// which the host owns.
fn dispose(instance: &mut BoxedInstrumentation) -> Result<(), DisposalError> {
    let name = instance.name().to_string();
    let result = match panic::catch_unwind(AssertUnwindSafe(|| instance.dispose())) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(DisposalError::Failed {
            instrumentation: name,
            source,
        }),
        Err(payload) => Err(DisposalError::Panicked {
            instrumentation: name,
            message: panic_message(payload.as_ref()),
        }),
    };

    #[cfg(feature = "telemetry")]
    crate::telemetry::metrics::record_disposal(result.is_ok());

    result
}
