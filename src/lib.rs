//! URL routing and dispatch engine.
//!
//! Registers path patterns bound to handlers, matches request paths and
//! methods against them in registration order, extracts named parameters,
//! and resolves names back into concrete URLs.
//!
//! ```
//! use url_router::{Callback, RequestContext, Router};
//!
//! let mut router = Router::new();
//! router.set_request(RequestContext::new("get", "/page/22"));
//! router
//!     .get("/page/{id?}", Callback::closure(|args| {
//!         format!("page {}", args[0].as_deref().unwrap_or("index"))
//!     }))
//!     .unwrap()
//!     .set_name("page.show");
//!
//! assert_eq!(router.start().unwrap(), Some("page 22".to_string()));
//! assert_eq!(router.url("page.show").path(), "/page/22/");
//! ```

pub mod config;
pub mod dispatch;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::{load_config, ConfigError, RouteConfig, RouterConfig};
pub use dispatch::{Callback, DispatchError, Handler, HandlerLoader, HandlerRegistry};
pub use http::{InputHandler, InputValue, RequestContext, Url};
pub use routing::{ParamValues, Parameters, Route, RouteError, Router};
