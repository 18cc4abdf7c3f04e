//! Resolver chain for composing multiple sources.
//!
//! The [`ResolverChain`] tries its sources in declared order. The first
//! source whose result is *present* wins.

use std::fmt;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::trace;

use crate::context::RequestContext;
use crate::error::{ParamError, ParamResult};
use crate::source::{ParameterSource, ResolvedParam};
use crate::value::{FromParam, Value, ValueKind};

/// Chain multiple parameter sources with first-present-wins precedence.
///
/// Presence depends on the requested type: strings are present when
/// non-empty, every other type as soon as a source returns a value. If no
/// source yields a present value the chain resolves to "no value".
///
/// An error from any source (unavailable context, unparseable text) aborts
/// the chain immediately.
///
/// # Example
///
/// ```
/// use callsite_params::{
///     ContextItemsSource, ParameterSource, ParameterSourceExt, QuerySource, RequestContext,
///     ResolverChain,
/// };
///
/// let chain = ResolverChain::new()
///     .source(QuerySource::default())
///     .source(ContextItemsSource::default());
///
/// let ctx = RequestContext::builder()
///     .query("limit", "")
///     .item("limit", 25i64)
///     .build();
///
/// // The empty query value is "no value" for an int, so items win.
/// assert_eq!(chain.resolve::<i64>(&ctx, "limit").unwrap(), 25);
/// ```
///
/// A chain is itself a [`ParameterSource`], so chains can be nested.
#[derive(Clone, Default)]
pub struct ResolverChain {
    sources: Vec<Arc<dyn ParameterSource>>,
}

impl ResolverChain {
    /// Create a new empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source to the chain.
    ///
    /// Sources are tried in the order they are added.
    pub fn source<S: ParameterSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Add an already shared source.
    pub fn shared_source(mut self, source: Arc<dyn ParameterSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Get the number of sources in the chain.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Names of the sources, in order.
    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolve a value and report which source supplied it.
    ///
    /// Fails with [`ParamError::Missing`] when no source has a present value.
    pub fn resolve_with_origin<T: FromParam>(
        &self,
        ctx: &RequestContext,
        key: &str,
    ) -> ParamResult<ResolvedParam<T>> {
        let found = self.first_present(
            key,
            |source| source.resolve_value(ctx, key, T::KIND),
            Value::is_present,
        )?;
        found
            .and_then(|(value, source)| T::from_value(value).map(|value| ResolvedParam { value, source }))
            .ok_or_else(|| ParamError::missing(key))
    }

    fn first_present<T>(
        &self,
        key: &str,
        resolve: impl Fn(&dyn ParameterSource) -> ParamResult<Option<T>>,
        present: impl Fn(&T) -> bool,
    ) -> ParamResult<Option<(T, &'static str)>> {
        for source in &self.sources {
            if let Some(value) = resolve(source.as_ref())? {
                if present(&value) {
                    trace!(key, source = source.name(), "parameter resolved");
                    return Ok(Some((value, source.name())));
                }
            }
        }
        Ok(None)
    }
}

fn always<T>(_: &T) -> bool {
    true
}

impl ParameterSource for ResolverChain {
    fn name(&self) -> &'static str {
        "resolver chain"
    }

    fn resolve_string(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<String>> {
        Ok(self
            .first_present(key, |s| s.resolve_string(ctx, key), |v: &String| !v.is_empty())?
            .map(|(v, _)| v))
    }

    fn resolve_bool(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<bool>> {
        Ok(self
            .first_present(key, |s| s.resolve_bool(ctx, key), always)?
            .map(|(v, _)| v))
    }

    fn resolve_int(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<i64>> {
        Ok(self
            .first_present(key, |s| s.resolve_int(ctx, key), always)?
            .map(|(v, _)| v))
    }

    fn resolve_double(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<f64>> {
        Ok(self
            .first_present(key, |s| s.resolve_double(ctx, key), always)?
            .map(|(v, _)| v))
    }

    fn resolve_datetime(
        &self,
        ctx: &RequestContext,
        key: &str,
    ) -> ParamResult<Option<OffsetDateTime>> {
        Ok(self
            .first_present(key, |s| s.resolve_datetime(ctx, key), always)?
            .map(|(v, _)| v))
    }

    fn resolve_string_list(
        &self,
        ctx: &RequestContext,
        key: &str,
    ) -> ParamResult<Option<Vec<String>>> {
        Ok(self
            .first_present(key, |s| s.resolve_string_list(ctx, key), always)?
            .map(|(v, _)| v))
    }

    fn resolve_value(
        &self,
        ctx: &RequestContext,
        key: &str,
        kind: ValueKind,
    ) -> ParamResult<Option<Value>> {
        Ok(self
            .first_present(key, |s| s.resolve_value(ctx, key, kind), Value::is_present)?
            .map(|(v, _)| v))
    }
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverChain")
            .field("sources", &self.source_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{ContextItemsSource, FormSource, QuerySource, RequestParamsSource};
    use crate::ParameterSourceExt;

    #[test]
    fn chain_falls_back_to_next_source() {
        let ctx = RequestContext::builder().form("k", "v").build();
        let chain = ResolverChain::new()
            .source(QuerySource::default())
            .source(FormSource::default());

        assert_eq!(chain.resolve_string(&ctx, "k").unwrap(), Some("v".into()));
    }

    #[test]
    fn chain_prefers_first_source() {
        let ctx = RequestContext::builder()
            .query("k", "from-query")
            .form("k", "from-form")
            .build();
        let chain = ResolverChain::new()
            .source(QuerySource::default())
            .source(FormSource::default());

        assert_eq!(
            chain.resolve_string(&ctx, "k").unwrap(),
            Some("from-query".into())
        );
    }

    #[test]
    fn empty_string_is_skipped() {
        let ctx = RequestContext::builder()
            .query("k", "")
            .form("k", "v")
            .build();
        let chain = ResolverChain::new()
            .source(QuerySource::default())
            .source(FormSource::default());

        assert_eq!(chain.resolve_string(&ctx, "k").unwrap(), Some("v".into()));
    }

    #[test]
    fn chain_with_no_value_is_none() {
        let ctx = RequestContext::default();
        let chain = ResolverChain::new().source(QuerySource::default());

        assert_eq!(chain.resolve_int(&ctx, "k").unwrap(), None);
        assert!(matches!(
            chain.resolve::<i64>(&ctx, "k"),
            Err(ParamError::Missing(_))
        ));
        assert_eq!(chain.try_resolve::<i64>(&ctx, "k"), None);
    }

    #[test]
    fn source_error_aborts_chain() {
        let ctx = RequestContext::builder()
            .query("limit", "many")
            .item("limit", 3i64)
            .build();
        let chain = ResolverChain::new()
            .source(QuerySource::default())
            .source(ContextItemsSource::default());

        assert!(matches!(
            chain.resolve_int(&ctx, "limit"),
            Err(ParamError::Parse { .. })
        ));
    }

    #[test]
    fn reports_origin() {
        let ctx = RequestContext::builder().item("userId", 9i64).build();
        let chain = ResolverChain::new()
            .source(RequestParamsSource::default())
            .source(ContextItemsSource::default());

        let resolved = chain.resolve_with_origin::<i64>(&ctx, "userId").unwrap();
        assert_eq!(resolved.value, 9);
        assert_eq!(resolved.source, "context items");
    }

    #[test]
    fn chains_nest() {
        let ctx = RequestContext::builder().cookie("theme", "dark").build();
        let inner = ResolverChain::new().source(RequestParamsSource::default());
        let outer = ResolverChain::new()
            .source(ContextItemsSource::default())
            .source(inner);

        assert_eq!(outer.resolve::<String>(&ctx, "theme").unwrap(), "dark");
    }

    #[test]
    fn debug_lists_source_names() {
        let chain = ResolverChain::new()
            .source(QuerySource::default())
            .source(ContextItemsSource::default());
        let debug = format!("{:?}", chain);
        assert!(debug.contains("query string"));
        assert!(debug.contains("context items"));
        assert_eq!(chain.source_count(), 2);
    }
}
