//! Route registry, dispatch loop and reverse lookup.
//!
//! # Responsibilities
//! - Hold the ordered route registry (insertion order = match priority)
//! - Scan processed routes against the current request, with deferred
//!   method-not-allowed handling
//! - Dispatch the winning route's callback through the handler loader
//! - Resolve names, `"Handler@method"` references and literal segments back
//!   into URLs
//!
//! # Design Decisions
//! - One explicitly constructed Router per application; no global registry
//! - Registration happens before serving; `reset` clears everything
//! - Dispatch faults are logged and re-signaled as NotFound at this
//!   boundary rather than leaked as distinct types

use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::dispatch::{Callback, HandlerLoader, HandlerRegistry};
use crate::http::{RequestContext, Url};
use crate::observability::metrics;
use crate::routing::pattern::PatternError;
use crate::routing::route::{ParamValues, Route};

/// Errors surfaced by registration and dispatch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    /// The pattern cannot be compiled; raised at registration time.
    #[error(transparent)]
    MalformedPattern(#[from] PatternError),

    /// No registered route structurally matches the request path.
    #[error("no route matches \"{path}\"")]
    NotFound { path: String },

    /// At least one route matched the path, but none allowed the method.
    #[error("route \"{path}\" does not allow method \"{method}\"")]
    MethodNotAllowed { path: String, method: String },
}

/// The routing engine: registry, matcher and reverse resolver.
pub struct Router {
    routes: Vec<Route>,
    processed: Vec<usize>,
    request: RequestContext,
    loader: Arc<dyn HandlerLoader>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            processed: Vec::new(),
            request: RequestContext::default(),
            loader: Arc::new(HandlerRegistry::new()),
        }
    }

    /// Build a router and register every route of a declarative config,
    /// in declaration order.
    pub fn from_config(config: &RouterConfig) -> Result<Self, RouteError> {
        let mut router = Self::new();
        router.apply_config(config)?;
        Ok(router)
    }

    /// Register every route of a declarative config.
    pub fn apply_config(&mut self, config: &RouterConfig) -> Result<(), RouteError> {
        for entry in &config.routes {
            let mut route = Route::new(&entry.pattern, Callback::parse(&entry.handler))?;
            let methods: Vec<&str> = entry.methods.iter().map(String::as_str).collect();
            route.set_methods(&methods);
            if let Some(name) = &entry.name {
                route.set_name(name.as_str());
            }
            if let Some(expression) = &entry.regex {
                route.set_raw_regex(expression)?;
            }
            for (param, expression) in &entry.where_patterns {
                route.where_param(param, expression)?;
            }
            self.add_route(route);
        }
        tracing::debug!(routes = self.routes.len(), "Config applied");
        Ok(())
    }

    /// Drop all routes, the processed list and the loaded-route history.
    /// The handler loader is kept.
    pub fn reset(&mut self) {
        self.routes.clear();
        self.processed.clear();
        self.request = RequestContext::default();
    }

    pub fn set_loader(&mut self, loader: Arc<dyn HandlerLoader>) -> &mut Self {
        self.loader = loader;
        self
    }

    pub fn set_request(&mut self, request: RequestContext) -> &mut Self {
        self.request = request;
        self
    }

    pub fn request(&self) -> &RequestContext {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut RequestContext {
        &mut self.request
    }

    /// Append a route; insertion order is the match priority. Returns the
    /// stored route for further configuration.
    pub fn add_route(&mut self, route: Route) -> &mut Route {
        let index = self.routes.len();
        self.routes.push(route);
        &mut self.routes[index]
    }

    /// Register a route restricted to the given methods.
    pub fn match_methods(
        &mut self,
        methods: &[&str],
        pattern: &str,
        callback: Callback,
    ) -> Result<&mut Route, RouteError> {
        let mut route = Route::new(pattern, callback)?;
        route.set_methods(methods);
        Ok(self.add_route(route))
    }

    pub fn get(&mut self, pattern: &str, callback: Callback) -> Result<&mut Route, RouteError> {
        self.match_methods(&["get"], pattern, callback)
    }

    pub fn post(&mut self, pattern: &str, callback: Callback) -> Result<&mut Route, RouteError> {
        self.match_methods(&["post"], pattern, callback)
    }

    pub fn put(&mut self, pattern: &str, callback: Callback) -> Result<&mut Route, RouteError> {
        self.match_methods(&["put"], pattern, callback)
    }

    pub fn patch(&mut self, pattern: &str, callback: Callback) -> Result<&mut Route, RouteError> {
        self.match_methods(&["patch"], pattern, callback)
    }

    pub fn delete(&mut self, pattern: &str, callback: Callback) -> Result<&mut Route, RouteError> {
        self.match_methods(&["delete"], pattern, callback)
    }

    pub fn options(&mut self, pattern: &str, callback: Callback) -> Result<&mut Route, RouteError> {
        self.match_methods(&["options"], pattern, callback)
    }

    /// Rebuild the processed subsequence: every route with a matchable
    /// pattern, in registration order.
    pub fn load_routes(&mut self) {
        self.processed = (0..self.routes.len()).collect();
    }

    /// Process the current request: load routes, then match and dispatch.
    pub fn start(&mut self) -> Result<Option<String>, RouteError> {
        self.load_routes();
        self.route_request()
    }

    /// Scan processed routes in order and dispatch the first one matching
    /// both path and method.
    ///
    /// A path match whose method set excludes the request only arms the
    /// method-not-allowed outcome; the scan continues, since another route
    /// may share the path with a different method.
    pub fn route_request(&mut self) -> Result<Option<String>, RouteError> {
        let path = self.request.url().path().to_string();
        let method = self.request.method().to_string();
        let mut method_not_allowed: Option<bool> = None;

        for index in self.processed.clone() {
            if !self.routes[index].match_path(&path) {
                continue;
            }

            if !self.routes[index].allows_method(&method) {
                method_not_allowed.get_or_insert(true);
                continue;
            }

            method_not_allowed = Some(false);
            self.request.add_loaded_route(index);

            let route = &self.routes[index];
            tracing::debug!(
                request_id = %self.request.id(),
                method = %method,
                path = %path,
                route = %route.pattern(),
                callback = ?route.callback(),
                "Route matched"
            );
            metrics::record_dispatch(&method, route.pattern());

            return match route.render(&*self.loader) {
                Ok(output) => Ok(Some(output)),
                Err(e) => {
                    tracing::error!(
                        request_id = %self.request.id(),
                        route = %route.pattern(),
                        error = %e,
                        "Dispatch failed"
                    );
                    Err(RouteError::NotFound { path })
                }
            };
        }

        if method_not_allowed == Some(true) {
            tracing::warn!(method = %method, path = %path, "Method not allowed");
            metrics::record_unmatched(&method, "method_not_allowed");
            return Err(RouteError::MethodNotAllowed { path, method });
        }

        if self.request.loaded_routes().is_empty() {
            tracing::warn!(method = %method, path = %path, "No route matched");
            metrics::record_unmatched(&method, "not_found");
            return Err(RouteError::NotFound { path });
        }

        Ok(None)
    }

    /// The most recently dispatched route, if any.
    pub fn loaded_route(&self) -> Option<&Route> {
        self.request
            .loaded_routes()
            .last()
            .map(|&index| &self.routes[index])
    }

    /// Find a processed route by declared name or, for `"Handler@method"`
    /// references, by callback target. Both compare case-insensitively.
    pub fn find_route(&self, name: &str) -> Option<&Route> {
        for &index in &self.processed {
            let route = &self.routes[index];
            if route.has_name(name) {
                return Some(route);
            }

            if let Some((class, method)) = name.split_once('@') {
                if let (Some(route_class), Some(route_method)) =
                    (route.callback().class(), route.callback().method())
                {
                    if route_class.eq_ignore_ascii_case(class)
                        && route_method.eq_ignore_ascii_case(method)
                    {
                        return Some(route);
                    }
                }
            }
        }
        None
    }

    /// Resolve a URL from a route name, a `"Handler@method"` reference, the
    /// currently loaded route, or literal segments.
    ///
    /// Never fails: an unresolvable name degrades to a slash-joined literal
    /// URL.
    pub fn get_url(
        &self,
        name: Option<&str>,
        params: &ParamValues,
        query: Option<&[(String, String)]>,
    ) -> Url {
        // Explicitly empty name and parameters ask for the root.
        if name == Some("") && matches!(params, ParamValues::Single(v) if v.is_empty()) {
            return Url::root();
        }

        let nothing_supplied =
            name.is_none() && matches!(params, ParamValues::None) && query.is_none();
        let query_params: Vec<(String, String)> = if nothing_supplied {
            self.request.url().params().to_vec()
        } else {
            query.map(<[_]>::to_vec).unwrap_or_default()
        };

        // Nothing asked for: the current request URL.
        if name.is_none() && matches!(params, ParamValues::None) {
            let mut url = self.request.url().clone();
            url.set_params(query_params);
            return url;
        }

        // No name, but a route was dispatched: regenerate it.
        if name.is_none() {
            if let Some(route) = self.loaded_route() {
                return self.build_url(&route.find_url(params), query_params);
            }
        }

        if let Some(name) = name {
            if let Some(route) = self.find_route(name) {
                return self.build_url(&route.find_url(params), query_params);
            }

            // alias@method: the alias part may name a route on its own.
            if let Some((alias, _)) = name.split_once('@') {
                for &index in &self.processed {
                    let route = &self.routes[index];
                    if route.has_name(alias) {
                        return self.build_url(&route.find_url(params), query_params);
                    }
                }
            }
        }

        // Assume a hardcoded URL and join the pieces.
        let mut segments: Vec<String> = Vec::new();
        if let Some(name) = name {
            segments.push(name.to_string());
        }
        match params {
            ParamValues::Single(value) => segments.push(value.clone()),
            ParamValues::Named(pairs) => {
                segments.extend(pairs.iter().map(|(_, value)| value.clone()));
            }
            ParamValues::None => {}
        }
        let joined = segments.join("/");
        let trimmed = joined.trim_matches('/');
        let path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };
        self.build_url(&path, query_params)
    }

    /// Shorthand: resolve a name with no parameters.
    pub fn url(&self, name: &str) -> Url {
        self.get_url(Some(name), &ParamValues::None, None)
    }

    fn build_url(&self, path: &str, query_params: Vec<(String, String)>) -> Url {
        let mut url = self.request.url().clone();
        url.parse(path);
        url.set_params(query_params);
        url
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
