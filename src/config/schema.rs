//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Route definitions, scanned in declaration order.
    pub routes: Vec<RouteConfig>,
}

/// A single declarative route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path pattern with `{name}` / `{name?}` parameter tokens.
    pub pattern: String,

    /// Handler reference: `"Handler@method"` or `"Handler"`.
    pub handler: String,

    /// Allowed request methods (empty = any).
    #[serde(default)]
    pub methods: Vec<String>,

    /// Route name for reverse lookup.
    #[serde(default)]
    pub name: Option<String>,

    /// Raw regular-expression override for matching.
    #[serde(default)]
    pub regex: Option<String>,

    /// Per-parameter value expressions.
    #[serde(default, rename = "where")]
    pub where_patterns: HashMap<String, String>,
}
