//! Observability subsystem.
//!
//! Structured logging happens in place through `tracing`; subscriber
//! initialization belongs to the hosting binary. This module only carries
//! the metric recording helpers.

pub mod metrics;
