//! Strict sources: raw text that must parse.

use time::OffsetDateTime;

use crate::context::RequestContext;
use crate::error::{ParamError, ParamResult};
use crate::parse::{parse_bool, parse_datetime, parse_double, parse_int};
use crate::source::ParameterSource;
use crate::value::ValueKind;

/// An origin that stores parameters as raw text.
pub trait RawLookup: Send + Sync {
    /// Human-readable name for this origin.
    fn name(&self) -> &'static str;

    /// Returns the raw text stored under `key`, or `None` if absent.
    fn raw(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<String>>;
}

/// Parses raw text from a [`RawLookup`] into typed values.
///
/// Absent or empty text resolves to "no value". Text that is present but does
/// not parse as the requested type fails with [`ParamError::Parse`], naming
/// the key and the offending content.
///
/// # Example
///
/// ```
/// use callsite_params::{ParameterSource, QuerySource, RequestContext, ParamError};
///
/// let ctx = RequestContext::builder().query("limit", "ten").build();
/// let source = QuerySource::default();
///
/// assert!(matches!(
///     source.resolve_int(&ctx, "limit"),
///     Err(ParamError::Parse { .. })
/// ));
/// assert_eq!(source.resolve_int(&ctx, "offset").unwrap(), None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict<R> {
    lookup: R,
}

impl<R: RawLookup> Strict<R> {
    /// Wraps a raw lookup.
    pub fn new(lookup: R) -> Self {
        Self { lookup }
    }

    /// The wrapped lookup.
    pub fn lookup(&self) -> &R {
        &self.lookup
    }

    fn parsed<T>(
        &self,
        ctx: &RequestContext,
        key: &str,
        kind: ValueKind,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> ParamResult<Option<T>> {
        let Some(raw) = self.lookup.raw(ctx, key)? else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }
        match parse(&raw) {
            Some(value) => Ok(Some(value)),
            None => Err(ParamError::parse(key, kind, raw)),
        }
    }
}

impl<R: RawLookup> ParameterSource for Strict<R> {
    fn name(&self) -> &'static str {
        self.lookup.name()
    }

    fn resolve_string(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<String>> {
        self.lookup.raw(ctx, key)
    }

    fn resolve_bool(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<bool>> {
        self.parsed(ctx, key, ValueKind::Bool, parse_bool)
    }

    fn resolve_int(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<i64>> {
        self.parsed(ctx, key, ValueKind::Int, parse_int)
    }

    fn resolve_double(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<f64>> {
        self.parsed(ctx, key, ValueKind::Double, parse_double)
    }

    fn resolve_datetime(
        &self,
        ctx: &RequestContext,
        key: &str,
    ) -> ParamResult<Option<OffsetDateTime>> {
        self.parsed(ctx, key, ValueKind::DateTime, parse_datetime)
    }
}
