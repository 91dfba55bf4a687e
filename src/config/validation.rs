//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Patterns must compile, methods must be recognized
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function over the parsed config

use regex::Regex;
use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::http::request::REQUEST_METHODS;
use crate::routing::pattern;

/// A single semantic problem in a route table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("route {index}: empty pattern")]
    EmptyPattern { index: usize },

    #[error("route {index}: empty handler reference")]
    EmptyHandler { index: usize },

    #[error("route {index}: unknown method \"{method}\"")]
    UnknownMethod { index: usize, method: String },

    #[error("route {index}: {reason}")]
    BadPattern { index: usize, reason: String },

    #[error("route {index}: invalid regex override: {reason}")]
    BadRegex { index: usize, reason: String },
}

/// Check every route entry, collecting all problems.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (index, route) in config.routes.iter().enumerate() {
        if route.pattern.trim().is_empty() {
            errors.push(ValidationError::EmptyPattern { index });
        } else if let Err(e) = pattern::compile(
            &route.pattern,
            &route.where_patterns,
            None,
        ) {
            errors.push(ValidationError::BadPattern {
                index,
                reason: e.reason,
            });
        }

        if route.handler.trim().is_empty() {
            errors.push(ValidationError::EmptyHandler { index });
        }

        for method in &route.methods {
            if !REQUEST_METHODS.contains(&method.to_lowercase().as_str()) {
                errors.push(ValidationError::UnknownMethod {
                    index,
                    method: method.clone(),
                });
            }
        }

        if let Some(expression) = &route.regex {
            if let Err(e) = Regex::new(expression) {
                errors.push(ValidationError::BadRegex {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::schema::RouteConfig;

    fn entry(pattern: &str, handler: &str, methods: &[&str]) -> RouteConfig {
        RouteConfig {
            pattern: pattern.to_string(),
            handler: handler.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            name: None,
            regex: None,
            where_patterns: HashMap::new(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = RouterConfig {
            routes: vec![entry("/page/{id?}", "PageHandler@show", &["get"])],
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_all_errors_are_collected() {
        let config = RouterConfig {
            routes: vec![
                entry("", "", &[]),
                entry("/a/{id", "Handler@x", &["teleport"]),
            ],
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptyPattern { index: 0 }));
        assert!(errors.contains(&ValidationError::EmptyHandler { index: 0 }));
        assert!(errors.contains(&ValidationError::UnknownMethod {
            index: 1,
            method: "teleport".to_string(),
        }));
    }

    #[test]
    fn test_bad_regex_override() {
        let mut route = entry("/a", "Handler@x", &[]);
        route.regex = Some("([unclosed".to_string());
        let config = RouterConfig { routes: vec![route] };
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::BadRegex { index: 0, .. }));
    }

    #[test]
    fn test_method_casing_is_accepted() {
        let config = RouterConfig {
            routes: vec![entry("/a", "Handler@x", &["GET", "Post"])],
        };
        assert!(validate_config(&config).is_ok());
    }
}
