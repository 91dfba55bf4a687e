//! Query and body input values.
//!
//! # Responsibilities
//! - Collect query parameters into named input values
//! - Parse request bodies: JSON objects and form-urlencoded pairs
//! - Look up values across sources with an optional method filter
//!
//! # Design Decisions
//! - A body is only parsed for methods that may carry one
//! - JSON scalars are carried as their text form; routing-level consumers
//!   deal in strings

use std::collections::HashMap;

use url::form_urlencoded;

/// A single input value: scalar text, a repeated field, or a nested map.
#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Null,
    Text(String),
    List(Vec<InputValue>),
    Map(HashMap<String, InputValue>),
}

impl InputValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            InputValue::Text(text) => Some(text),
            _ => None,
        }
    }

    fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => InputValue::Null,
            serde_json::Value::Bool(b) => InputValue::Text(b.to_string()),
            serde_json::Value::Number(n) => InputValue::Text(n.to_string()),
            serde_json::Value::String(s) => InputValue::Text(s.clone()),
            serde_json::Value::Array(items) => {
                InputValue::List(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(entries) => InputValue::Map(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value)))
                    .collect(),
            ),
        }
    }
}

/// Parsed request input: query parameters and body fields.
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    query: HashMap<String, InputValue>,
    body: HashMap<String, InputValue>,
}

impl InputHandler {
    /// Input from query parameters only.
    pub fn from_query(params: &[(String, String)]) -> Self {
        Self {
            query: collect_pairs(params.iter().map(|(k, v)| (k.clone(), v.clone()))),
            body: HashMap::new(),
        }
    }

    /// Parse query parameters and, when the method can carry one, the body.
    /// A body starting with `{` is treated as a JSON object, anything else
    /// as form-urlencoded pairs.
    pub fn parse(params: &[(String, String)], body: Option<&str>, is_post_back: bool) -> Self {
        let mut input = Self::from_query(params);

        if !is_post_back {
            return input;
        }
        let Some(body) = body else {
            return input;
        };

        if body.trim_start().starts_with('{') {
            match serde_json::from_str::<serde_json::Value>(body) {
                Ok(serde_json::Value::Object(entries)) => {
                    input.body = entries
                        .iter()
                        .map(|(key, value)| (key.clone(), InputValue::from_json(value)))
                        .collect();
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring unparsable JSON body");
                }
            }
        } else {
            input.body = collect_pairs(form_urlencoded::parse(body.as_bytes()).into_owned());
        }

        input
    }

    pub fn query(&self, index: &str) -> Option<&InputValue> {
        self.query.get(index)
    }

    pub fn body(&self, index: &str) -> Option<&InputValue> {
        self.body.get(index)
    }

    /// Find a value by name. With no filter, the query wins over the body;
    /// with a filter, only the listed sources (`"get"`, `"post"`) are
    /// consulted.
    pub fn find(&self, index: &str, methods: &[&str]) -> Option<&InputValue> {
        let mut found = None;
        if methods.is_empty() || methods.contains(&"get") {
            found = self.query(index);
        }
        if found.is_none() && (methods.is_empty() || methods.contains(&"post")) {
            found = self.body(index);
        }
        found
    }

    /// The text of a value, falling back to `default` when the value is
    /// missing, null, or blank.
    pub fn value(&self, index: &str, default: Option<&str>, methods: &[&str]) -> Option<String> {
        match self.find(index, methods).and_then(InputValue::as_text) {
            Some(text) if !text.trim().is_empty() => Some(text.to_string()),
            _ => default.map(str::to_string),
        }
    }

    /// All values, query over body. With a filter, only the listed names are
    /// returned and missing ones come back as [`InputValue::Null`].
    pub fn all(&self, filter: &[&str]) -> HashMap<String, InputValue> {
        let mut output = self.body.clone();
        for (key, value) in &self.query {
            output.insert(key.clone(), value.clone());
        }

        if filter.is_empty() {
            return output;
        }

        let mut filtered = HashMap::new();
        for &key in filter {
            let value = output.remove(key).unwrap_or(InputValue::Null);
            filtered.insert(key.to_string(), value);
        }
        filtered
    }
}

/// Fold repeated field names into a list value.
fn collect_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> HashMap<String, InputValue> {
    let mut output: HashMap<String, InputValue> = HashMap::new();
    for (key, value) in pairs {
        match output.remove(&key) {
            None => {
                output.insert(key, InputValue::Text(value));
            }
            Some(InputValue::List(mut items)) => {
                items.push(InputValue::Text(value));
                output.insert(key, InputValue::List(items));
            }
            Some(existing) => {
                output.insert(key, InputValue::List(vec![existing, InputValue::Text(value)]));
            }
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_query_values() {
        let input = InputHandler::from_query(&query(&[("q", "rust"), ("page", "2")]));
        assert_eq!(input.value("q", None, &[]), Some("rust".to_string()));
        assert_eq!(input.value("missing", Some("x"), &[]), Some("x".to_string()));
    }

    #[test]
    fn test_repeated_fields_become_lists() {
        let input = InputHandler::from_query(&query(&[("tag", "a"), ("tag", "b")]));
        match input.query("tag") {
            Some(InputValue::List(items)) => assert_eq!(items.len(), 2),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_form_body() {
        let input = InputHandler::parse(&[], Some("name=jane&age=30"), true);
        assert_eq!(input.value("name", None, &["post"]), Some("jane".to_string()));
        assert_eq!(input.value("age", None, &[]), Some("30".to_string()));
    }

    #[test]
    fn test_json_body() {
        let input = InputHandler::parse(&[], Some(r#"{"name": "jane", "age": 30}"#), true);
        assert_eq!(input.value("name", None, &[]), Some("jane".to_string()));
        assert_eq!(input.value("age", None, &[]), Some("30".to_string()));
    }

    #[test]
    fn test_body_ignored_without_post_back() {
        let input = InputHandler::parse(&[], Some("name=jane"), false);
        assert_eq!(input.value("name", None, &[]), None);
    }

    #[test]
    fn test_query_wins_over_body() {
        let input = InputHandler::parse(&query(&[("name", "from-query")]), Some("name=from-body"), true);
        assert_eq!(input.value("name", None, &[]), Some("from-query".to_string()));
        assert_eq!(
            input.value("name", None, &["post"]),
            Some("from-body".to_string())
        );
    }

    #[test]
    fn test_all_with_filter_inserts_null() {
        let input = InputHandler::from_query(&query(&[("a", "1")]));
        let all = input.all(&["a", "b"]);
        assert_eq!(all.get("a"), Some(&InputValue::Text("1".to_string())));
        assert_eq!(all.get("b"), Some(&InputValue::Null));
    }

    #[test]
    fn test_unparsable_json_body_is_ignored() {
        let input = InputHandler::parse(&[], Some("{not json"), true);
        assert!(input.body("anything").is_none());
    }
}
