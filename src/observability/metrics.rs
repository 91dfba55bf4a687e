//! Match-outcome metrics.
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatched requests by method, route
//! - `router_unmatched_total` (counter): failed resolutions by method, reason
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; installing a recorder is the
//!   hosting application's choice

use metrics::counter;

/// Count a dispatched request.
pub fn record_dispatch(method: &str, route: &str) {
    counter!(
        "router_requests_total",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
}

/// Count a request that failed to resolve.
pub fn record_unmatched(method: &str, reason: &'static str) {
    counter!(
        "router_unmatched_total",
        "method" => method.to_string(),
        "reason" => reason
    )
    .increment(1);
}
