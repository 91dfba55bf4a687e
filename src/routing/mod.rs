//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (before serving):
//!     pattern string
//!         → pattern.rs (compile: descriptors + anchored regex)
//!         → route.rs (Route with cached matcher, callback, methods)
//!         → router.rs (ordered registry)
//!
//! Incoming request (path, method):
//!     → router.rs (scan processed routes in registration order)
//!     → route.rs (structural match, extract named parameters)
//!     → method check (mismatch is deferred, scan continues)
//!     → dispatch callback through the handler loader
//!
//! Reverse lookup:
//!     name / "Handler@method" / literal segments
//!     → router.rs (find_route) → route.rs (find_url) → Url
//! ```
//!
//! # Design Decisions
//! - Patterns compiled once at registration, matched many times
//! - Registration order is the match priority (first match wins)
//! - A path match with a method mismatch keeps scanning: several routes
//!   commonly share a path and differ only by method
//! - Reverse lookup never fails; it degrades to a literal segment join

pub mod pattern;
pub mod route;
pub mod router;

pub use pattern::{CompiledPattern, ParamSpec, PatternError, DEFAULT_PARAM_PATTERN};
pub use route::{ParamValues, Parameters, Route};
pub use router::{RouteError, Router};
