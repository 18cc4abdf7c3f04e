//! Per-dispatch state.
//!
//! # State Management
//!
//! | Type | Mutability | Lifetime | Purpose |
//! |------|------------|----------|---------|
//! | [`RequestContext`] | Immutable | Request | Route data, HTTP collections, middleware items |
//! | [`DispatchContext`] | Mutable in pre-dispatch hooks | One dispatch | Target, bag, format, extensions |
//! | [`CallScope`] | Immutable | One invocation | What a scoped method sees |
//!
//! **Extensions** are injected per-dispatch by pre-dispatch hooks and read by
//! scoped methods:
//!
//! ```rust,ignore
//! Hooks::new().pre_dispatch(|req, ctx| {
//!     let key = req.item("apiKey").and_then(Value::as_str).unwrap_or_default();
//!     ctx.extensions.insert(Caller { key: key.to_string() });
//!     Ok(())
//! })
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use callsite_params::{FromParam, ParamResult, ParameterSourceExt, RequestContext, ResolverChain};

use crate::bag::ParameterBag;

/// Type-safe container for injecting custom state into a dispatch.
///
/// Cloning an `Extensions` yields an empty container, since the stored
/// values cannot be cloned generically. Share state across clones with an
/// `Arc<T>` inside the extension.
#[derive(Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Extensions {
    /// Creates a new empty extensions container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous value of this type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, val: T) -> Option<T> {
        self.map
            .insert(TypeId::of::<T>(), Box::new(val))
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    /// Gets a reference to a value of the specified type.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    /// Gets a mutable reference to a value of the specified type.
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.map
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut())
    }

    /// Gets a required reference to a value of the specified type.
    ///
    /// Returns an error if no value of this type exists.
    pub fn get_required<T: 'static>(&self) -> Result<&T, anyhow::Error> {
        self.get::<T>().ok_or_else(|| {
            anyhow::anyhow!(
                "Extension missing: type {} not found in context",
                std::any::type_name::<T>()
            )
        })
    }

    /// Removes a value of the specified type, returning it if it existed.
    pub fn remove<T: 'static>(&mut self) -> Option<T> {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    /// Returns `true` if the extensions contain a value of the specified type.
    pub fn contains<T: 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of extensions stored.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no extensions are stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}

impl Clone for Extensions {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// The target and inputs of one dispatch.
///
/// Built by the dispatcher after extraction. Pre-dispatch hooks receive it
/// mutably and may rewrite the bag, change the format, or inject
/// extensions before binding.
#[derive(Debug, Default)]
pub struct DispatchContext {
    /// Component name from route data.
    pub component: String,
    /// Method name from route data.
    pub method: String,
    /// Parameters to bind.
    pub bag: ParameterBag,
    /// Requested format token; empty selects the default builder.
    pub format: String,
    /// Whether a debug payload is attached to the result.
    pub debug: bool,
    /// Per-dispatch state for scoped methods.
    pub extensions: Extensions,
}

impl DispatchContext {
    /// Creates a context for `component.method` with an empty bag.
    pub fn new(component: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            method: method.into(),
            ..Default::default()
        }
    }
}

/// What a scoped method can see of the current request.
///
/// Methods registered with
/// [`ComponentType::scoped_method`](crate::ComponentType::scoped_method)
/// receive a `CallScope` so they can resolve inputs that are not part of the
/// bound arguments.
///
/// ```rust,ignore
/// .scoped_method("Terms", &[], |search: &Search, scope: &CallScope<'_>| {
///     let query = scope.try_resolve::<String>("query").unwrap_or_default();
///     search.terms(&query, None, None)
/// })
/// ```
#[derive(Clone, Copy)]
pub struct CallScope<'a> {
    request: &'a RequestContext,
    resolver: &'a ResolverChain,
    extensions: &'a Extensions,
}

impl<'a> CallScope<'a> {
    /// Creates a scope.
    pub fn new(
        request: &'a RequestContext,
        resolver: &'a ResolverChain,
        extensions: &'a Extensions,
    ) -> Self {
        Self {
            request,
            resolver,
            extensions,
        }
    }

    /// The request being handled.
    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    /// The dispatcher's parameter resolver chain.
    pub fn resolver(&self) -> &'a ResolverChain {
        self.resolver
    }

    /// Extensions injected by pre-dispatch hooks.
    pub fn extensions(&self) -> &'a Extensions {
        self.extensions
    }

    /// Resolves a required parameter through the resolver chain.
    pub fn resolve<T: FromParam>(&self, key: &str) -> ParamResult<T> {
        self.resolver.resolve(self.request, key)
    }

    /// Resolves an optional parameter through the resolver chain.
    ///
    /// Unparseable or unavailable values read as absent.
    pub fn try_resolve<T: FromParam>(&self, key: &str) -> Option<T> {
        self.resolver.try_resolve(self.request, key)
    }
}

impl fmt::Debug for CallScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallScope")
            .field("resolver", self.resolver)
            .field("extensions", self.extensions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callsite_params::QuerySource;

    struct Caller {
        key: String,
    }

    #[test]
    fn extensions_round_trip_by_type() {
        let mut ext = Extensions::new();
        assert!(ext.insert(Caller { key: "k1".into() }).is_none());
        let previous = ext.insert(Caller { key: "k2".into() });

        assert_eq!(previous.map(|c| c.key), Some("k1".to_string()));
        assert_eq!(ext.get::<Caller>().map(|c| c.key.as_str()), Some("k2"));
        assert!(ext.get_required::<u32>().is_err());
        assert!(ext.clone().is_empty());
    }

    #[test]
    fn scope_resolves_through_chain() {
        let request = RequestContext::builder().query("optimization", "sample").build();
        let chain = ResolverChain::new().source(QuerySource::default());
        let ext = Extensions::new();
        let scope = CallScope::new(&request, &chain, &ext);

        assert_eq!(scope.resolve::<String>("optimization").unwrap(), "sample");
        assert_eq!(scope.try_resolve::<String>("types"), None);
    }
}
