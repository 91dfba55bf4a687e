//! Callback dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Matched Route (callback descriptor + ordered parameter values)
//!     → handler.rs (Callback variant: named handler, bound instance, closure)
//!     → registry.rs (resolve handler name → instance)
//!     → Handler::call(method, args) → output string
//! ```
//!
//! # Design Decisions
//! - The loader is a trait so hosts can swap in their own resolution scheme
//! - Handler names resolve case-insensitively
//! - "No such handler" and "no such method" are distinct error cases

pub mod handler;
pub mod registry;

pub use handler::{Callback, ClosureFn, DispatchError, Handler, HandlerLoader, DEFAULT_METHOD};
pub use registry::HandlerRegistry;
