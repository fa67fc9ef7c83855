// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Span helpers for initializer activations.

use std::time::{Duration, Instant};

use tracing::{info_span, Span};

/// RAII guard timing one initializer activation.
///
/// Records the initializer, trigger, duration, and outcome on the span and
/// in the global metrics.
pub struct ActivationSpan {
    initializer: String,
    start: Instant,
    span: Span,
}

impl ActivationSpan {
    /// Start a new activation span.
    pub fn start(initializer: &str, trigger: &str) -> Self {
        let span = info_span!(
            "activation",
            initializer = %initializer,
            trigger = %trigger,
            duration_ms = tracing::field::Empty,
            success = tracing::field::Empty,
        );

        Self {
            initializer: initializer.to_string(),
            start: Instant::now(),
            span,
        }
    }

    /// Get the underlying tracing span.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Enter the span context.
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    /// Time since the span started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finish the span. `failure` is the error kind, if the activation failed.
    pub fn finish(self, failure: Option<&str>) {
        let duration = self.start.elapsed();

        self.span.record("duration_ms", duration.as_secs_f64() * 1000.0);
        self.span.record("success", failure.is_none());

        super::metrics::GLOBAL_METRICS.record_activation(&self.initializer, duration, failure);
    }
}
