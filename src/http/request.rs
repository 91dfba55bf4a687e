//! Request context consumed by the routing core.
//!
//! # Responsibilities
//! - Carry the normalized request target, method and headers
//! - Generate a request ID as early as possible for tracing
//! - Record which routes were dispatched, for reverse lookup
//!
//! # Design Decisions
//! - Header names are normalized once at construction (lower-case,
//!   underscores to dashes); methods are lower-cased
//! - The `_method` body field may override the transport method

use std::collections::HashMap;

use uuid::Uuid;

use crate::http::input::InputHandler;
use crate::http::url::Url;

/// Request methods the router recognizes.
pub const REQUEST_METHODS: [&str; 7] =
    ["get", "post", "put", "patch", "options", "delete", "head"];

/// Methods whose requests may carry a body.
const POST_BACK_METHODS: [&str; 4] = ["post", "put", "patch", "delete"];

/// Body field that overrides the transport method.
pub const FORCE_METHOD_KEY: &str = "_method";

/// The current request as seen by the router.
#[derive(Debug, Clone)]
pub struct RequestContext {
    id: Uuid,
    method: String,
    url: Url,
    host: Option<String>,
    headers: HashMap<String, String>,
    content_type: Option<String>,
    input: InputHandler,
    loaded_routes: Vec<usize>,
}

impl RequestContext {
    /// Context from a method and request target (path plus optional query
    /// string).
    pub fn new(method: &str, target: &str) -> Self {
        let url = Url::new(target);
        let input = InputHandler::from_query(url.params());
        Self {
            id: Uuid::new_v4(),
            method: method.to_lowercase(),
            url,
            host: None,
            headers: HashMap::new(),
            content_type: None,
            input,
            loaded_routes: Vec::new(),
        }
    }

    /// Attach headers, normalizing names and deriving host and content type.
    pub fn set_headers(&mut self, headers: &[(&str, &str)]) -> &mut Self {
        for (name, value) in headers {
            let name = name.to_lowercase().replace('_', "-");
            self.headers.insert(name, value.to_string());
        }

        if let Some(host) = self.headers.get("host") {
            // Strip any port from the hostname.
            let host = host.split(':').next().unwrap_or(host);
            self.host = Some(host.to_string());
        }

        if let Some(content_type) = self.headers.get("content-type") {
            let content_type = content_type
                .split(';')
                .next()
                .unwrap_or(content_type)
                .trim()
                .to_lowercase();
            self.content_type = Some(content_type);
        }

        self
    }

    /// Parse a request body into the input handler. A `_method` field in the
    /// body overrides the transport method.
    pub fn attach_body(&mut self, body: &str) -> &mut Self {
        self.input = InputHandler::parse(self.url.params(), Some(body), self.is_post_back());
        if let Some(forced) = self.input.value(FORCE_METHOD_KEY, None, &["post"]) {
            self.method = forced.to_lowercase();
        }
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn set_method(&mut self, method: &str) -> &mut Self {
        self.method = method.to_lowercase();
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn set_url(&mut self, url: Url) -> &mut Self {
        self.input = InputHandler::from_query(url.params());
        self.url = url;
        self
    }

    /// The normalized request path.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn set_host(&mut self, host: &str) -> &mut Self {
        let host = host.split(':').next().unwrap_or(host);
        self.host = Some(host.to_string());
        self
    }

    /// A header value by name (any casing, `_` and `-` equivalent).
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase().replace('_', "-");
        self.headers.get(&name).map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn input(&self) -> &InputHandler {
        &self.input
    }

    /// True when the method may carry a request body.
    pub fn is_post_back(&self) -> bool {
        POST_BACK_METHODS.contains(&self.method.as_str())
    }

    /// Record a dispatched route by registry index.
    pub fn add_loaded_route(&mut self, index: usize) -> &mut Self {
        self.loaded_routes.push(index);
        self
    }

    pub fn loaded_routes(&self) -> &[usize] {
        &self.loaded_routes
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new("get", "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_is_lowercased() {
        let context = RequestContext::new("GET", "/page/");
        assert_eq!(context.method(), "get");
    }

    #[test]
    fn test_header_names_are_normalized() {
        let mut context = RequestContext::new("get", "/");
        context.set_headers(&[("X_Forwarded_For", "10.0.0.1"), ("Accept", "text/html")]);

        assert_eq!(context.header("x-forwarded-for"), Some("10.0.0.1"));
        assert_eq!(context.header("X_FORWARDED_FOR"), Some("10.0.0.1"));
        assert_eq!(context.header("accept"), Some("text/html"));
    }

    #[test]
    fn test_host_port_is_stripped() {
        let mut context = RequestContext::new("get", "/");
        context.set_headers(&[("Host", "example.com:8080")]);
        assert_eq!(context.host(), Some("example.com"));
    }

    #[test]
    fn test_content_type_parameters_are_stripped() {
        let mut context = RequestContext::new("get", "/");
        context.set_headers(&[("Content-Type", "Application/JSON; charset=utf-8")]);
        assert_eq!(context.content_type(), Some("application/json"));
    }

    #[test]
    fn test_method_override_from_body() {
        let mut context = RequestContext::new("post", "/form/");
        context.attach_body("_method=PUT&name=jane");
        assert_eq!(context.method(), "put");
        assert_eq!(
            context.input().value("name", None, &["post"]),
            Some("jane".to_string())
        );
    }

    #[test]
    fn test_body_not_parsed_for_get() {
        let mut context = RequestContext::new("get", "/");
        context.attach_body("_method=PUT");
        assert_eq!(context.method(), "get");
    }

    #[test]
    fn test_loaded_routes_accumulate() {
        let mut context = RequestContext::new("get", "/");
        context.add_loaded_route(2).add_loaded_route(0);
        assert_eq!(context.loaded_routes(), &[2, 0]);
    }
}
