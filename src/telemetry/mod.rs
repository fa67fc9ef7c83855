// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Diagnostics for the loader itself.
//!
//! The loader never reports failures to the host application, so logs and
//! metrics are the only place they show up:
//!
//! - **Logging**: `tracing` events; every contained failure is a `warn!`
//!   carrying `initializer`, `trigger`, and `error` fields
//! - **Activation spans**: one span per winning `fire`, with duration and outcome
//! - **Metrics**: per-initializer fire/activation/failure counters and disposal counts
//!
//! # Usage
//!
//! ```rust,ignore
//! use lazy_instr::telemetry::{init_telemetry, TelemetryConfig, GLOBAL_METRICS};
//!
//! let _guard = init_telemetry(&TelemetryConfig::default());
//!
//! // ... later, from a diagnostics endpoint
//! println!("{}", GLOBAL_METRICS.snapshot().format_report());
//! ```

mod init;
pub mod metrics;
mod spans;

pub use init::{init_telemetry, TelemetryConfig, TelemetryGuard};
pub use metrics::{Histogram, InitializerMetrics, Metrics, MetricsSnapshot, GLOBAL_METRICS};
pub use spans::ActivationSpan;
