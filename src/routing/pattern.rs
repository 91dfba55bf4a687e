//! Route pattern compilation.
//!
//! # Responsibilities
//! - Scan a pattern string for `{name}` / `{name?}` parameter tokens
//! - Produce the ordered parameter descriptor list
//! - Build the anchored matching regex with one named capture per parameter
//!
//! # Design Decisions
//! - A separator (`/`, `-` or `.`) directly before a token is folded into
//!   the capture unit, so `/test-{param}/` matches `/test-param1/`
//! - An optional token makes the whole unit (separator + value) optional
//! - Unbalanced delimiters fail here, at registration, not at match time

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Expression a parameter value must satisfy unless overridden:
/// one or more word characters or dashes.
pub const DEFAULT_PARAM_PATTERN: &str = r"[\w-]+";

/// Token scanner: `{name}` or `{name?}`.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)(\??)\}").expect("token scanner regex is valid"));

/// The pattern cannot be turned into a matching expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed pattern \"{pattern}\": {reason}")]
pub struct PatternError {
    pub pattern: String,
    pub reason: String,
}

/// One parameter token of a pattern, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub optional: bool,
    /// Per-parameter expression override, if one was configured.
    pub pattern: Option<String>,
}

/// A compiled pattern: the matching regex plus its parameter descriptors.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    params: Vec<ParamSpec>,
}

impl CompiledPattern {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// True if the pattern declares a parameter with this name
    /// (token text compares case-insensitively).
    pub fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Compile a route pattern into descriptors and an anchored matching regex.
///
/// `overrides` maps parameter names to custom value expressions;
/// `default_pattern` replaces [`DEFAULT_PARAM_PATTERN`] for every parameter
/// without an override.
pub fn compile(
    pattern: &str,
    overrides: &HashMap<String, String>,
    default_pattern: Option<&str>,
) -> Result<CompiledPattern, PatternError> {
    let mut expr = String::from("^");
    let mut params: Vec<ParamSpec> = Vec::new();
    let mut last = 0;

    for caps in TOKEN_RE.captures_iter(pattern) {
        let token = caps.get(0).expect("capture 0 is the whole match");
        let name = caps[1].to_string();
        let optional = !caps[2].is_empty();

        if params.iter().any(|p| p.name == name) {
            return Err(PatternError {
                pattern: pattern.to_string(),
                reason: format!("duplicate parameter \"{name}\""),
            });
        }

        // The separator in front of the token belongs to the capture unit.
        let mut literal = &pattern[last..token.start()];
        if literal.ends_with(['/', '-', '.']) {
            literal = &literal[..literal.len() - 1];
        }
        push_literal(&mut expr, literal, pattern)?;

        let value = overrides
            .get(&name)
            .map(String::as_str)
            .or(default_pattern)
            .unwrap_or(DEFAULT_PARAM_PATTERN);
        expr.push_str(&format!("((/|-|\\.)(?P<{name}>{value}))"));
        if optional {
            expr.push('?');
        }

        params.push(ParamSpec {
            pattern: overrides.get(&name).cloned(),
            name,
            optional,
        });
        last = token.end();
    }

    push_literal(&mut expr, &pattern[last..], pattern)?;
    expr.push_str("/?$");

    let regex = Regex::new(&expr).map_err(|e| PatternError {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    Ok(CompiledPattern { regex, params })
}

fn push_literal(expr: &mut String, literal: &str, pattern: &str) -> Result<(), PatternError> {
    if literal.contains('{') || literal.contains('}') {
        return Err(PatternError {
            pattern: pattern.to_string(),
            reason: "unbalanced parameter delimiters".to_string(),
        });
    }
    expr.push_str(&regex::escape(literal));
    Ok(())
}
