//! Default handler loader backed by registered factories.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatch::handler::{DispatchError, Handler, HandlerLoader};

type HandlerFactory = Box<dyn Fn() -> Arc<dyn Handler> + Send + Sync>;

/// Maps handler names to factories producing instances.
///
/// Names are compared case-insensitively. A factory runs once per dispatch,
/// mirroring a fresh handler per request; use [`register_instance`] to share
/// one instance instead.
///
/// [`register_instance`]: HandlerRegistry::register_instance
#[derive(Default)]
pub struct HandlerRegistry {
    factories: HashMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a handler name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Arc<dyn Handler> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.into().to_lowercase(), Box::new(factory));
        self
    }

    /// Register a shared instance under a handler name.
    pub fn register_instance(
        &mut self,
        name: impl Into<String>,
        instance: Arc<dyn Handler>,
    ) -> &mut Self {
        self.register(name, move || instance.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }
}

impl HandlerLoader for HandlerRegistry {
    fn load_handler(&self, name: &str) -> Result<Arc<dyn Handler>, DispatchError> {
        match self.factories.get(&name.to_lowercase()) {
            Some(factory) => Ok(factory()),
            None => Err(DispatchError::HandlerNotFound(name.to_string())),
        }
    }
}
