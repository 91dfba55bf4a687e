//! Request-side value types consumed by the routing core.
//!
//! # Data Flow
//! ```text
//! Raw request parts (method, target, headers, body)
//!     → request.rs (normalize headers, method, content type; request ID)
//!     → url.rs (path normalization, query string)
//!     → input.rs (query + body input values)
//!     → routing layer reads path()/method(), records loaded routes
//! ```

pub mod input;
pub mod request;
pub mod url;

pub use input::{InputHandler, InputValue};
pub use request::{RequestContext, FORCE_METHOD_KEY, REQUEST_METHODS};
pub use url::Url;
