// AppStart - app/analytics.rs
//
// Analytics implementation for hosts without an analytics backend: events
// are emitted as structured `tracing` records under the `analytics` target.

use crate::core::locale::Analytics;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl Analytics for TracingAnalytics {
    fn log_event(&self, name: &str, params: &[(&str, &str)]) {
        tracing::info!(target: "analytics", event = name, params = ?params, "Analytics event");
    }
}
