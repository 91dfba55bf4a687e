//! Shared helpers for integration tests.

use std::sync::Arc;

use url_router::{Handler, HandlerRegistry, RouteError, Router, Url};

/// Test handler with a few named methods. `param` echoes its arguments.
pub struct DummyController;

impl Handler for DummyController {
    fn call(&self, method: &str, args: &[Option<String>]) -> Option<String> {
        match method {
            "method1" => Some("method1".to_string()),
            "method2" => Some("method2".to_string()),
            "about" => Some("about".to_string()),
            "param" => Some(
                args.iter()
                    .map(|value| value.as_deref().unwrap_or(""))
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            _ => None,
        }
    }

    fn name(&self) -> &str {
        "DummyController"
    }
}

/// A router wired to a registry containing [`DummyController`].
pub fn dummy_router() -> Router {
    let mut registry = HandlerRegistry::new();
    registry.register("DummyController", || Arc::new(DummyController));

    let mut router = Router::new();
    router.set_loader(Arc::new(registry));
    router
}

/// Point the current request at a path/method and run a dispatch pass,
/// keeping the context (and its loaded-route history) alive across calls.
pub fn dispatch(
    router: &mut Router,
    method: &str,
    path: &str,
) -> Result<Option<String>, RouteError> {
    router.request_mut().set_method(method);
    router.request_mut().set_url(Url::new(path));
    router.start()
}
