//! Route entity: pattern, cached matcher, callback, parameter state.
//!
//! # Responsibilities
//! - Normalize and compile the route pattern at construction
//! - Structural matching with named-parameter extraction
//! - Reverse URL generation from the declared pattern
//!
//! # Design Decisions
//! - Matching never throws: the hot path is a pure capture function
//! - A raw-regex override supersedes token matching entirely; reverse
//!   generation still works from the declared pattern
//! - A failed match leaves previously extracted parameters untouched, so a
//!   route can be retried against another path

use std::collections::HashMap;

use regex::{NoExpand, Regex};

use crate::dispatch::{Callback, DispatchError, HandlerLoader, DEFAULT_METHOD};
use crate::routing::pattern::{self, CompiledPattern, PatternError};
use crate::routing::router::RouteError;

/// Insertion-ordered parameter map.
///
/// Order matters: it is the dispatch argument order, taken from the order of
/// first appearance in the pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, Option<String>)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite, keeping the original position of existing keys.
    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// The stored value for a name; outer `None` means the name is absent.
    pub fn entry(&self, name: &str) -> Option<&Option<String>> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// The non-null value for a name, if any.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.entry(name).and_then(|v| v.as_deref())
    }

    /// Overlay `other`: existing names are overwritten in place, new names
    /// are appended.
    pub fn merge(&mut self, other: &Parameters) {
        for (name, value) in &other.entries {
            self.set(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    pub fn values(&self) -> Vec<Option<String>> {
        self.entries.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (K, Option<String>)>>(iter: T) -> Self {
        let mut params = Parameters::new();
        for (name, value) in iter {
            params.set(name, value);
        }
        params
    }
}

/// Parameter values supplied to reverse URL generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParamValues {
    /// Nothing supplied: values come from the last match.
    #[default]
    None,
    /// One positional value, bound to the first declared parameter.
    /// The empty string means "clear all" and yields the template form.
    Single(String),
    /// Values by parameter name. Names without a matching token are
    /// appended as trailing segments. An empty list means "clear all".
    Named(Vec<(String, String)>),
}

impl ParamValues {
    pub fn single(value: impl Into<String>) -> Self {
        ParamValues::Single(value.into())
    }

    pub fn named<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        ParamValues::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// The deliberate "clear all parameters" forms.
    fn is_clear_all(&self) -> bool {
        match self {
            ParamValues::Single(v) => v.is_empty(),
            ParamValues::Named(pairs) => pairs.is_empty(),
            ParamValues::None => false,
        }
    }
}

/// A registered pattern-to-callback binding.
#[derive(Clone)]
pub struct Route {
    pattern: String,
    compiled: CompiledPattern,
    raw_regex: Option<Regex>,
    where_patterns: HashMap<String, String>,
    default_param_pattern: Option<String>,
    methods: Vec<String>,
    callback: Callback,
    name: Option<String>,
    filter_empty_params: bool,
    parameters: Parameters,
    matched: Parameters,
}

impl Route {
    /// Create a route for a pattern. The pattern is normalized to exactly
    /// one leading and one trailing slash and compiled immediately; a
    /// malformed pattern fails here, not at match time.
    pub fn new(pattern: &str, callback: Callback) -> Result<Self, RouteError> {
        let pattern = normalize_pattern(pattern);
        let compiled = pattern::compile(&pattern, &HashMap::new(), None)?;
        let parameters = compiled
            .params()
            .iter()
            .map(|p| (p.name.clone(), None))
            .collect();

        Ok(Self {
            pattern,
            compiled,
            raw_regex: None,
            where_patterns: HashMap::new(),
            default_param_pattern: None,
            methods: Vec::new(),
            callback,
            name: None,
            filter_empty_params: true,
            parameters,
            matched: Parameters::new(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Restrict the route to these request methods (empty = any).
    pub fn set_methods(&mut self, methods: &[&str]) -> &mut Self {
        self.methods = methods.iter().map(|m| m.to_lowercase()).collect();
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Replace token-based matching with a raw regular expression. Reverse
    /// generation still uses the declared pattern.
    pub fn set_raw_regex(&mut self, expression: &str) -> Result<&mut Self, RouteError> {
        let regex = Regex::new(expression).map_err(|e| PatternError {
            pattern: expression.to_string(),
            reason: e.to_string(),
        })?;
        self.raw_regex = Some(regex);
        Ok(self)
    }

    /// Constrain one parameter to a custom value expression.
    pub fn where_param(&mut self, name: &str, expression: &str) -> Result<&mut Self, RouteError> {
        self.where_patterns
            .insert(name.to_string(), expression.to_string());
        self.recompile()?;
        Ok(self)
    }

    /// Replace the default value expression for every unconstrained
    /// parameter of this route.
    pub fn set_default_param_pattern(&mut self, expression: &str) -> Result<&mut Self, RouteError> {
        self.default_param_pattern = Some(expression.to_string());
        self.recompile()?;
        Ok(self)
    }

    /// When enabled (the default), parameters that matched empty are dropped
    /// from the dispatch argument list.
    pub fn set_filter_empty_params(&mut self, enabled: bool) -> &mut Self {
        self.filter_empty_params = enabled;
        self
    }

    /// Merge externally supplied parameter values.
    pub fn set_parameters(&mut self, values: &Parameters) -> &mut Self {
        self.parameters.merge(values);
        self
    }

    fn recompile(&mut self) -> Result<(), RouteError> {
        self.compiled = pattern::compile(
            &self.pattern,
            &self.where_patterns,
            self.default_param_pattern.as_deref(),
        )?;
        Ok(())
    }

    /// Current parameter state: the matched snapshot overlaid with any
    /// externally supplied values.
    pub fn parameters(&self) -> Parameters {
        let mut merged = self.matched.clone();
        merged.merge(&self.parameters);
        merged
    }

    /// Snapshot taken at the last successful match.
    pub fn matched_parameters(&self) -> &Parameters {
        &self.matched
    }

    /// True when the route has this name (case-insensitive).
    pub fn has_name(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    }

    /// True when the route accepts this request method.
    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m == &method.to_lowercase())
    }

    /// Match the route against a request path. On success the extracted
    /// values become both the current parameters and the matched snapshot;
    /// on failure all state is left untouched.
    pub fn match_path(&mut self, path: &str) -> bool {
        match self.capture(path) {
            Some(values) => {
                self.matched = values.clone();
                self.parameters.merge(&values);
                true
            }
            None => false,
        }
    }

    /// Pure structural match: `Some(values)` on success, `None` otherwise.
    fn capture(&self, path: &str) -> Option<Parameters> {
        if let Some(raw) = &self.raw_regex {
            // Raw override: match or fail, never fall through to tokens.
            let caps = raw.captures(path)?;
            let mut values = Parameters::new();
            for name in raw.capture_names().flatten() {
                values.set(name, non_empty(caps.name(name).map(|m| m.as_str())));
            }
            return Some(values);
        }

        // A pattern opening with a token expects a leading separator, which
        // hostname-style paths don't carry.
        let prefixed;
        let candidate = if self.pattern.starts_with('{') {
            prefixed = format!("/{}", path.trim_start_matches('/'));
            prefixed.as_str()
        } else {
            path
        };

        let caps = self.compiled.regex().captures(candidate)?;
        let mut values = Parameters::new();
        for spec in self.compiled.params() {
            values.set(
                spec.name.clone(),
                non_empty(caps.name(&spec.name).map(|m| m.as_str())),
            );
        }
        Some(values)
    }

    /// Resolve and invoke the callback with the current argument list.
    pub fn render(&self, loader: &dyn HandlerLoader) -> Result<String, DispatchError> {
        let mut args = self.parameters().values();
        if self.filter_empty_params {
            args.retain(|v| v.is_some());
        }

        match &self.callback {
            Callback::Closure(f) => loader.call_closure(&**f, &args),
            Callback::Bound { instance, method } => loader.call_method(&**instance, method, &args),
            Callback::Handler { class, method } => {
                let handler = loader.load_handler(class)?;
                let method = method.as_deref().unwrap_or(DEFAULT_METHOD);
                loader.call_method(&*handler, method, &args)
            }
        }
    }

    /// Build a concrete URL from the declared pattern.
    ///
    /// Value precedence per declared parameter: explicitly supplied value,
    /// then the value from the last match. The clear-all forms return the
    /// pattern in template form. Supplied names without a matching token are
    /// appended as trailing segments.
    pub fn find_url(&self, values: &ParamValues) -> String {
        if values.is_clear_all() {
            return self.pattern.clone();
        }

        let current = self.parameters();
        let mut url = self.pattern.clone();

        for (index, spec) in self.compiled.params().iter().enumerate() {
            let explicit = match values {
                ParamValues::Named(pairs) => pairs
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(&spec.name))
                    .map(|(_, value)| value.clone()),
                ParamValues::Single(value) if index == 0 => Some(value.clone()),
                _ => None,
            };
            let value = explicit
                .or_else(|| current.value(&spec.name).map(str::to_string))
                .or_else(|| self.matched.value(&spec.name).map(str::to_string))
                .unwrap_or_default();
            url = replace_token(&url, &spec.name, &value);
        }

        if let ParamValues::Named(pairs) = values {
            for (name, value) in pairs {
                if !self.compiled.has_param(name) {
                    url.push_str(value);
                    url.push('/');
                }
            }
        }

        normalize_pattern(&url)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("methods", &self.methods)
            .field("callback", &self.callback)
            .field("name", &self.name)
            .finish()
    }
}

/// Exactly one leading and one trailing slash.
fn normalize_pattern(pattern: &str) -> String {
    let trimmed = pattern.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// An empty capture counts as absent, not as an empty string.
fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Replace `{name}` and `{name?}` with a value, case-insensitively on the
/// token text.
fn replace_token(url: &str, name: &str, value: &str) -> String {
    let token = Regex::new(&format!(r"(?i)\{{{}\??\}}", regex::escape(name)))
        .expect("escaped token text is a valid expression");
    token.replace_all(url, NoExpand(value)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(pattern: &str) -> Route {
        Route::new(pattern, Callback::parse("Dummy@show")).unwrap()
    }

    #[test]
    fn test_pattern_is_normalized() {
        assert_eq!(route("page/{id}").pattern(), "/page/{id}/");
        assert_eq!(route("/").pattern(), "/");
        assert_eq!(route("").pattern(), "/");
    }

    #[test]
    fn test_match_extracts_parameters() {
        let mut r = route("/users/{id}/pages/{page?}");
        assert!(r.match_path("/users/7/pages/43/"));
        assert_eq!(r.parameters().value("id"), Some("7"));
        assert_eq!(r.parameters().value("page"), Some("43"));
    }

    #[test]
    fn test_optional_parameter_absent_is_null() {
        let mut r = route("/my/{path?}");
        assert!(r.match_path("/my/"));
        assert_eq!(r.parameters().entry("path"), Some(&None));
    }

    #[test]
    fn test_single_optional_segment_pattern() {
        let mut r = route("/{page?}");
        assert!(r.match_path("/"));
        assert_eq!(r.parameters().entry("page"), Some(&None));

        assert!(r.match_path("/optional/"));
        assert_eq!(r.parameters().value("page"), Some("optional"));
    }

    #[test]
    fn test_dash_embedded_parameter() {
        let mut r = route("/test-{param1}");
        assert!(r.match_path("/test-param1/"));
        assert_eq!(r.parameters().value("param1"), Some("param1"));
    }

    #[test]
    fn test_failed_match_keeps_state() {
        let mut r = route("/page/{id}");
        assert!(r.match_path("/page/22/"));
        assert!(!r.match_path("/other/"));
        assert_eq!(r.parameters().value("id"), Some("22"));
    }

    #[test]
    fn test_raw_regex_supersedes_tokens() {
        let mut r = route("/page/{id}");
        r.set_raw_regex(r"^/archive/(?P<year>\d{4})/$").unwrap();

        assert!(r.match_path("/archive/2024/"));
        assert_eq!(r.parameters().value("year"), Some("2024"));

        // No fallback to the token pattern.
        assert!(!r.match_path("/page/22/"));
    }

    #[test]
    fn test_where_param_constrains_match() {
        let mut r = route("/page/{id}");
        r.where_param("id", r"\d+").unwrap();
        assert!(r.match_path("/page/22/"));
        assert!(!r.match_path("/page/abc/"));
    }

    #[test]
    fn test_allows_method() {
        let mut r = route("/recipe");
        assert!(r.allows_method("get"));
        r.set_methods(&["GET", "post"]);
        assert!(r.allows_method("get"));
        assert!(r.allows_method("POST"));
        assert!(!r.allows_method("put"));
    }

    #[test]
    fn test_has_name_is_case_insensitive() {
        let mut r = route("/about");
        assert!(!r.has_name("about"));
        r.set_name("About.Page");
        assert!(r.has_name("about.page"));
    }

    #[test]
    fn test_find_url_round_trip() {
        let mut r = route("/page/{id?}");
        assert!(r.match_path("/page/22/"));

        assert_eq!(r.find_url(&ParamValues::None), "/page/22/");
        assert_eq!(r.find_url(&ParamValues::named([("id", "7")])), "/page/7/");
        assert_eq!(r.find_url(&ParamValues::single("")), "/page/{id?}/");
        assert_eq!(r.find_url(&ParamValues::Named(Vec::new())), "/page/{id?}/");
    }

    #[test]
    fn test_find_url_unmatched_optional_collapses() {
        let r = route("/page/{id?}");
        assert_eq!(r.find_url(&ParamValues::None), "/page/");
    }

    #[test]
    fn test_find_url_single_binds_first_parameter() {
        let r = route("/users/{id}");
        assert_eq!(r.find_url(&ParamValues::single("42")), "/users/42/");
    }

    #[test]
    fn test_find_url_appends_unknown_names() {
        let r = route("/search/{term}");
        let url = r.find_url(&ParamValues::named([("term", "rust"), ("sort", "asc")]));
        assert_eq!(url, "/search/rust/asc/");
    }

    #[test]
    fn test_render_filters_empty_params() {
        let mut r = route("/my/{path?}");
        let callback = Callback::closure(|args: &[Option<String>]| format!("{}", args.len()));
        r.callback = callback;
        assert!(r.match_path("/my/"));

        struct NoLoader;
        impl HandlerLoader for NoLoader {
            fn load_handler(
                &self,
                name: &str,
            ) -> Result<std::sync::Arc<dyn crate::dispatch::Handler>, DispatchError>
            {
                Err(DispatchError::HandlerNotFound(name.to_string()))
            }
        }

        assert_eq!(r.render(&NoLoader).unwrap(), "0");
        r.set_filter_empty_params(false);
        assert_eq!(r.render(&NoLoader).unwrap(), "1");
    }
}
