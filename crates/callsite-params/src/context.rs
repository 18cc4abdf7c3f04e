//! Per-request context passed explicitly to parameter sources.
//!
//! A [`RequestContext`] bundles everything an origin may read for one
//! request: route values, the HTTP request collections and typed items set
//! by upstream middleware. Sources receive it by reference on every call, so
//! the sources themselves hold no request state and can be shared freely.
//!
//! ```
//! use callsite_params::RequestContext;
//!
//! let ctx = RequestContext::builder()
//!     .route("componentName", "Search")
//!     .route("query", "~")
//!     .query("type", "json")
//!     .item("userId", 42i64)
//!     .build();
//!
//! assert_eq!(ctx.route().get("COMPONENTNAME").and_then(|v| v.as_str()), Some("Search"));
//! assert_eq!(ctx.request().unwrap().query.get("TYPE"), Some("json"));
//! ```

use std::collections::HashMap;

use crate::value::Value;

/// Case-insensitive string collection (query string, form, cookies, ...).
///
/// Insertion order is kept. Inserting a key that already exists under a
/// different casing replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Looks up a value, ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Route values in the order the router produced them.
///
/// Keys compare case-insensitively; values keep whatever type the transport
/// gave them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteData {
    entries: Vec<(String, Value)>,
}

impl RouteData {
    /// Creates empty route data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a route value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Looks up a route value, ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// Iterates route values in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of route values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no route values.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RouteData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut route = RouteData::new();
        for (k, v) in iter {
            route.insert(k, v);
        }
        route
    }
}

/// The string collections of an HTTP request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestData {
    /// Query string values.
    pub query: Params,
    /// Form body values.
    pub form: Params,
    /// Cookie values.
    pub cookies: Params,
    /// Server variables (`REMOTE_ADDR`, `HTTP_USER_AGENT`, ...).
    pub server_variables: Params,
}

/// Everything parameter sources may read for a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    route: RouteData,
    request: Option<RequestData>,
    items: HashMap<String, Value>,
}

impl RequestContext {
    /// Starts building a context.
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }

    /// Route values.
    pub fn route(&self) -> &RouteData {
        &self.route
    }

    /// The HTTP request collections, if a request is attached.
    pub fn request(&self) -> Option<&RequestData> {
        self.request.as_ref()
    }

    /// Typed per-request items. Keys are case-sensitive.
    pub fn item(&self, key: &str) -> Option<&Value> {
        self.items.get(key)
    }

    /// Sets a typed item, returning the previous value.
    pub fn set_item(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.items.insert(key.into(), value.into())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            route: RouteData::new(),
            request: Some(RequestData::default()),
            items: HashMap::new(),
        }
    }
}

/// Builder for [`RequestContext`].
///
/// A request with empty collections is attached unless
/// [`without_request`](Self::without_request) is called.
#[derive(Debug, Clone, Default)]
pub struct RequestContextBuilder {
    route: RouteData,
    request: RequestData,
    detached: bool,
    items: HashMap<String, Value>,
}

impl RequestContextBuilder {
    /// Adds a route value.
    pub fn route(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.route.insert(key, value);
        self
    }

    /// Replaces all route values.
    pub fn route_data(mut self, route: RouteData) -> Self {
        self.route = route;
        self
    }

    /// Adds a query string value.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.query.insert(key, value);
        self
    }

    /// Adds a form value.
    pub fn form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.form.insert(key, value);
        self
    }

    /// Adds a cookie.
    pub fn cookie(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.cookies.insert(key, value);
        self
    }

    /// Adds a server variable.
    pub fn server_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.server_variables.insert(key, value);
        self
    }

    /// Adds a typed item.
    pub fn item(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.items.insert(key.into(), value.into());
        self
    }

    /// Builds a context with no HTTP request attached.
    pub fn without_request(mut self) -> Self {
        self.detached = true;
        self
    }

    /// Finishes the context.
    pub fn build(self) -> RequestContext {
        RequestContext {
            route: self.route,
            request: if self.detached {
                None
            } else {
                Some(self.request)
            },
            items: self.items,
        }
    }
}
