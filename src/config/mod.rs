//! Declarative route-table configuration.
//!
//! # Data Flow
//! ```text
//! routes.toml
//!     → loader.rs (read + parse)
//!     → validation.rs (semantic checks, all errors collected)
//!     → schema.rs types
//!     → Router::from_config (registration in declaration order)
//! ```

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{RouteConfig, RouterConfig};
pub use validation::{validate_config, ValidationError};
