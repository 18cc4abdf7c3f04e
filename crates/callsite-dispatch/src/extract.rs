//! Route data to parameter bag extraction.
//!
//! ```text
//! route data {componentName, methodName, query: "~", limit: "10"}
//!   → extract            {query: "~", limit: "10"}
//!   → unescape_wildcard  {query: "*", limit: "10"}
//! ```

use callsite_params::{RouteData, Value};
use tracing::trace;

use crate::bag::ParameterBag;

/// Route key naming the component to dispatch to.
pub const COMPONENT_KEY: &str = "componentName";
/// Route key naming the method to invoke.
pub const METHOD_KEY: &str = "methodName";

/// Routing keys that never become method parameters.
pub const RESERVED_KEYS: [&str; 4] = [COMPONENT_KEY, METHOD_KEY, "controller", "action"];

/// The key whose escaped wildcard is rewritten.
pub const WILDCARD_KEY: &str = "query";
/// Transport-safe spelling of the wildcard.
pub const ESCAPED_WILDCARD: &str = "~";
/// The wildcard passed to components.
pub const WILDCARD: &str = "*";

/// Returns true if `key` is a reserved routing key, ignoring ASCII case.
pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.iter().any(|r| r.eq_ignore_ascii_case(key))
}

/// Copies every non-reserved route value into a new bag.
///
/// Values keep the type the router gave them.
pub fn extract(route: &RouteData) -> ParameterBag {
    route
        .iter()
        .filter(|(key, _)| !is_reserved(key))
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// Rewrites `query == "~"` to `"*"`.
///
/// Only the key spelled exactly `query` is considered, and only when its
/// value is the string `~`. Returns true if a rewrite happened.
pub fn unescape_wildcard(bag: &mut ParameterBag) -> bool {
    let escaped = matches!(
        bag.get_exact(WILDCARD_KEY),
        Some(Value::String(s)) if s == ESCAPED_WILDCARD
    );
    if escaped {
        trace!(key = WILDCARD_KEY, "unescaping wildcard");
        bag.insert(WILDCARD_KEY, WILDCARD);
    }
    escaped
}
