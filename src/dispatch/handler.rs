//! Handler and loader contracts.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Method invoked on a named handler when the reference carries no `@method`
/// part.
pub const DEFAULT_METHOD: &str = "invoke";

/// Anonymous callable bound directly to a route.
pub type ClosureFn = dyn Fn(&[Option<String>]) -> String + Send + Sync;

/// Errors raised while resolving or invoking a route callback.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The named handler is not known to the loader.
    #[error("handler \"{0}\" is not registered")]
    HandlerNotFound(String),

    /// The handler exists but has no such method.
    #[error("method \"{method}\" does not exist on handler \"{class}\"")]
    MethodNotFound { class: String, method: String },
}

/// A dispatch target: an object exposing named methods over routed
/// parameter values.
pub trait Handler: Send + Sync {
    /// Invoke a named method with the route's ordered arguments.
    /// Returns `None` when the handler has no such method.
    fn call(&self, method: &str, args: &[Option<String>]) -> Option<String>;

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        "handler"
    }
}

impl fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("name", &self.name()).finish()
    }
}

/// What a route dispatches to. Exactly one variant per route.
#[derive(Clone)]
pub enum Callback {
    /// A handler resolved by name through the loader, with an optional
    /// method (defaults to [`DEFAULT_METHOD`]).
    Handler {
        class: String,
        method: Option<String>,
    },
    /// An already-constructed handler instance plus a method name.
    Bound {
        instance: Arc<dyn Handler>,
        method: String,
    },
    /// An anonymous callable.
    Closure(Arc<ClosureFn>),
}

impl Callback {
    /// Parse a `"Handler@method"` or `"Handler"` reference.
    pub fn parse(reference: &str) -> Self {
        match reference.split_once('@') {
            Some((class, method)) => Callback::Handler {
                class: class.to_string(),
                method: Some(method.to_string()),
            },
            None => Callback::Handler {
                class: reference.to_string(),
                method: None,
            },
        }
    }

    /// Wrap a closure as a callback.
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&[Option<String>]) -> String + Send + Sync + 'static,
    {
        Callback::Closure(Arc::new(f))
    }

    /// Bind a handler instance and method directly.
    pub fn bound(instance: Arc<dyn Handler>, method: impl Into<String>) -> Self {
        Callback::Bound {
            instance,
            method: method.into(),
        }
    }

    /// Handler name, when the callback targets one.
    pub fn class(&self) -> Option<&str> {
        match self {
            Callback::Handler { class, .. } => Some(class),
            Callback::Bound { instance, .. } => Some(instance.name()),
            Callback::Closure(_) => None,
        }
    }

    /// Method name, when the callback names one.
    pub fn method(&self) -> Option<&str> {
        match self {
            Callback::Handler { method, .. } => method.as_deref(),
            Callback::Bound { method, .. } => Some(method),
            Callback::Closure(_) => None,
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Handler { class, method } => match method {
                Some(method) => write!(f, "{class}@{method}"),
                None => write!(f, "{class}"),
            },
            Callback::Bound { instance, method } => {
                write!(f, "{}@{} (bound)", instance.name(), method)
            }
            Callback::Closure(_) => write!(f, "<closure>"),
        }
    }
}

/// Resolves and invokes route callbacks.
///
/// `call_method` and `call_closure` have working defaults; implementors
/// normally only provide handler resolution.
pub trait HandlerLoader: Send + Sync {
    /// Resolve a handler name to an instance.
    fn load_handler(&self, name: &str) -> Result<Arc<dyn Handler>, DispatchError>;

    /// Invoke a method on a resolved handler.
    fn call_method(
        &self,
        handler: &dyn Handler,
        method: &str,
        args: &[Option<String>],
    ) -> Result<String, DispatchError> {
        handler
            .call(method, args)
            .ok_or_else(|| DispatchError::MethodNotFound {
                class: handler.name().to_string(),
                method: method.to_string(),
            })
    }

    /// Invoke an anonymous callable.
    fn call_closure(
        &self,
        closure: &ClosureFn,
        args: &[Option<String>],
    ) -> Result<String, DispatchError> {
        Ok(closure(args))
    }
}
