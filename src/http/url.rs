//! URL value type: normalized path plus query parameters.

use std::fmt;

use serde::Serialize;
use url::form_urlencoded;

/// A request-target URL. The path always carries exactly one leading and,
/// except for the root, one trailing slash; query parameters keep their
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Url {
    original: String,
    path: String,
    params: Vec<(String, String)>,
}

impl Url {
    pub fn new(url: &str) -> Self {
        let mut parsed = Self {
            original: url.to_string(),
            path: "/".to_string(),
            params: Vec::new(),
        };
        parsed.parse(url);
        parsed
    }

    pub fn root() -> Self {
        Self::new("/")
    }

    /// Re-parse a target into this URL, replacing the path and, when a query
    /// string is present, the parameters.
    pub fn parse(&mut self, url: &str) -> &mut Self {
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (url, None),
        };
        if !path.is_empty() {
            self.set_path(path);
        }
        if let Some(query) = query {
            self.set_query_string(query);
        }
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: &str) -> &mut Self {
        let trimmed = path.trim_matches('/');
        self.path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_params(&mut self, params: Vec<(String, String)>) -> &mut Self {
        self.params = params;
        self
    }

    pub fn set_query_string(&mut self, query: &str) -> &mut Self {
        self.params = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        self
    }

    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish()
    }

    /// The target as originally supplied, before normalization.
    pub fn original(&self) -> &str {
        &self.original
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query_string())
        }
    }
}
