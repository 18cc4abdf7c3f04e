//! Core parameter source trait.
//!
//! The [`ParameterSource`] trait defines the interface every request origin
//! implements. Sources are composed into a [`ResolverChain`](crate::ResolverChain)
//! that tries each one in order.

use time::OffsetDateTime;
use tracing::debug;

use crate::context::RequestContext;
use crate::error::{ParamError, ParamResult};
use crate::parse::parse_string_list;
use crate::value::{FromParam, Value, ValueKind};

/// A capability that resolves one typed value for one key from one origin.
///
/// # Implementation Guidelines
///
/// - Return `Ok(None)` for "no value"; the chain moves on to the next source.
/// - Return `Err(ParamError::Unavailable { .. })` when the part of the
///   [`RequestContext`] this source reads is missing.
/// - Sources hold no per-request state. Everything request-specific arrives
///   through the `ctx` argument.
///
/// Most origins should not implement this trait by hand. Implement
/// [`RawLookup`](crate::RawLookup) and wrap it in [`Strict`](crate::Strict),
/// or implement [`TypedLookup`](crate::TypedLookup) and wrap it in
/// [`Lenient`](crate::Lenient).
pub trait ParameterSource: Send + Sync {
    /// Human-readable name, used in diagnostics. Examples: "query string",
    /// "context items".
    fn name(&self) -> &'static str;

    /// Resolve a string value.
    fn resolve_string(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<String>>;

    /// Resolve a boolean value.
    fn resolve_bool(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<bool>>;

    /// Resolve an integer value.
    fn resolve_int(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<i64>>;

    /// Resolve a floating point value.
    fn resolve_double(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<f64>>;

    /// Resolve a timestamp.
    fn resolve_datetime(
        &self,
        ctx: &RequestContext,
        key: &str,
    ) -> ParamResult<Option<OffsetDateTime>>;

    /// Resolve a comma separated list.
    ///
    /// Defaults to splitting [`resolve_string`](Self::resolve_string).
    fn resolve_string_list(
        &self,
        ctx: &RequestContext,
        key: &str,
    ) -> ParamResult<Option<Vec<String>>> {
        Ok(self
            .resolve_string(ctx, key)?
            .filter(|s| !s.is_empty())
            .map(|s| parse_string_list(&s)))
    }

    /// Resolve a value of the given kind.
    ///
    /// Dispatches to the typed method for `kind`.
    fn resolve_value(
        &self,
        ctx: &RequestContext,
        key: &str,
        kind: ValueKind,
    ) -> ParamResult<Option<Value>> {
        Ok(match kind {
            ValueKind::String => self.resolve_string(ctx, key)?.map(Value::String),
            ValueKind::Bool => self.resolve_bool(ctx, key)?.map(Value::Bool),
            ValueKind::Int => self.resolve_int(ctx, key)?.map(Value::Int),
            ValueKind::Double => self.resolve_double(ctx, key)?.map(Value::Double),
            ValueKind::DateTime => self.resolve_datetime(ctx, key)?.map(Value::DateTime),
            ValueKind::StringList => self.resolve_string_list(ctx, key)?.map(Value::StringList),
        })
    }
}

/// Generic resolution on top of the typed methods.
///
/// Blanket-implemented for every [`ParameterSource`], including
/// `dyn ParameterSource`.
///
/// ```ignore
/// let limit: i64 = chain.resolve(&ctx, "limit")?;
/// let sort: Option<String> = chain.try_resolve(&ctx, "sort");
/// ```
pub trait ParameterSourceExt: ParameterSource {
    /// Resolve a required value.
    ///
    /// Fails with [`ParamError::Missing`] when no value is available.
    fn resolve<T: FromParam>(&self, ctx: &RequestContext, key: &str) -> ParamResult<T> {
        self.resolve_value(ctx, key, T::KIND)?
            .and_then(T::from_value)
            .ok_or_else(|| ParamError::missing(key))
    }

    /// Resolve an optional value. Never fails.
    ///
    /// Returns `None` wherever [`resolve`](Self::resolve) would fail,
    /// including unparseable text and an unavailable request.
    fn try_resolve<T: FromParam>(&self, ctx: &RequestContext, key: &str) -> Option<T> {
        match self.resolve::<T>(ctx, key) {
            Ok(value) => Some(value),
            Err(ParamError::Missing(_)) => None,
            Err(error) => {
                debug!(key, %error, "optional parameter unresolved");
                None
            }
        }
    }
}

impl<S: ParameterSource + ?Sized> ParameterSourceExt for S {}

/// A resolved value together with the source that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParam<T> {
    /// The resolved value.
    pub value: T,
    /// Name of the source that provided the value.
    pub source: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Source answering every key with the same string.
    struct Fixed(&'static str);

    impl ParameterSource for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn resolve_string(&self, _: &RequestContext, _: &str) -> ParamResult<Option<String>> {
            Ok(Some(self.0.to_string()))
        }

        fn resolve_bool(&self, _: &RequestContext, _: &str) -> ParamResult<Option<bool>> {
            Ok(None)
        }

        fn resolve_int(&self, _: &RequestContext, _: &str) -> ParamResult<Option<i64>> {
            Ok(Some(3))
        }

        fn resolve_double(&self, _: &RequestContext, _: &str) -> ParamResult<Option<f64>> {
            Ok(None)
        }

        fn resolve_datetime(
            &self,
            _: &RequestContext,
            _: &str,
        ) -> ParamResult<Option<OffsetDateTime>> {
            Ok(None)
        }
    }

    #[test]
    fn resolve_dispatches_on_requested_type() {
        let ctx = RequestContext::default();
        let source = Fixed("a, b");

        assert_eq!(source.resolve::<String>(&ctx, "k").unwrap(), "a, b");
        assert_eq!(source.resolve::<i64>(&ctx, "k").unwrap(), 3);
        assert_eq!(
            source.resolve::<Vec<String>>(&ctx, "k").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn resolve_missing_names_key() {
        let ctx = RequestContext::default();
        let err = Fixed("x").resolve::<bool>(&ctx, "flag").unwrap_err();
        assert_eq!(err, ParamError::missing("flag"));
    }

    #[test]
    fn try_resolve_maps_missing_to_none() {
        let ctx = RequestContext::default();
        assert_eq!(Fixed("x").try_resolve::<bool>(&ctx, "flag"), None);
        assert_eq!(Fixed("x").try_resolve::<i64>(&ctx, "n"), Some(3));
    }

    #[test]
    fn works_through_trait_objects() {
        let ctx = RequestContext::default();
        let source: Box<dyn ParameterSource> = Box::new(Fixed("x"));
        assert_eq!(source.resolve::<String>(&ctx, "k").unwrap(), "x");
    }
}
