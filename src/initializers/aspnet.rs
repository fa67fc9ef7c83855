// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! ASP.NET request tracing.
//!
//! MVC and Web API share one instrumentation. Whichever framework assembly
//! loads first activates it; the other trigger then finds the gate taken.

use super::{DeferredInstrumentation, PendingInitializer};

/// Trigger raised when the MVC framework assembly loads.
pub const MVC_TRIGGER: &str = "System.Web.Mvc";

/// Trigger raised when the Web API framework assembly loads.
pub const WEBAPI_TRIGGER: &str = "System.Web.Http";

/// Assembly-qualified name of the ASP.NET instrumentation type.
pub const ASPNET_INSTRUMENTATION_TYPE: &str =
    "OpenTelemetry.Instrumentation.AspNet.AspNetInstrumentation, OpenTelemetry.Instrumentation.AspNet";

/// Options passed to the ASP.NET instrumentation constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AspNetTraceInstrumentationOptions {
    /// Record exceptions thrown by request handlers as span events.
    pub record_exception: bool,

    /// Request paths that never produce spans.
    pub filtered_paths: Vec<String>,

    /// Request headers copied onto span attributes.
    pub captured_request_headers: Vec<String>,

    /// Response headers copied onto span attributes.
    pub captured_response_headers: Vec<String>,
}

impl AspNetTraceInstrumentationOptions {
    /// Whether requests to `path` are excluded from tracing.
    pub fn is_filtered(&self, path: &str) -> bool {
        self.filtered_paths
            .iter()
            .any(|p| p.eq_ignore_ascii_case(path))
    }
}

/// The ASP.NET initializer, shared by the MVC and Web API triggers.
pub struct AspNetInitializer;

impl AspNetInitializer {
    pub const NAME: &'static str = "AspNet";

    /// Triggers the initializer answers to.
    pub const TRIGGERS: [&'static str; 2] = [MVC_TRIGGER, WEBAPI_TRIGGER];

    /// The unbound instrumentation description.
    pub fn instrumentation() -> DeferredInstrumentation<AspNetTraceInstrumentationOptions> {
        DeferredInstrumentation::new(
            Self::NAME,
            ASPNET_INSTRUMENTATION_TYPE,
            AspNetTraceInstrumentationOptions::default,
        )
    }

    /// The initializer bound to both framework triggers.
    pub fn pending() -> PendingInitializer {
        Self::instrumentation().bind(&Self::TRIGGERS)
    }
}
