//! Lenient sources: values already typed by the transport.

use time::OffsetDateTime;

use crate::context::RequestContext;
use crate::error::ParamResult;
use crate::parse::{parse_datetime, parse_string_list};
use crate::source::ParameterSource;
use crate::value::Value;

/// An origin that stores typed [`Value`]s.
pub trait TypedLookup: Send + Sync {
    /// Human-readable name for this origin.
    fn name(&self) -> &'static str;

    /// Returns the value stored under `key`, or `None` if absent.
    fn lookup<'c>(&self, ctx: &'c RequestContext, key: &str) -> ParamResult<Option<&'c Value>>;
}

/// Reads typed values from a [`TypedLookup`] without ever failing to parse.
///
/// A value that is absent or has a different type than requested resolves to
/// "no value". The one conversion it performs is datetime: a string value is
/// parsed, and text that does not parse is also "no value".
///
/// Unavailability reported by the lookup still propagates as an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lenient<L> {
    lookup: L,
}

impl<L: TypedLookup> Lenient<L> {
    /// Wraps a typed lookup.
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// The wrapped lookup.
    pub fn lookup(&self) -> &L {
        &self.lookup
    }
}

impl<L: TypedLookup> ParameterSource for Lenient<L> {
    fn name(&self) -> &'static str {
        self.lookup.name()
    }

    fn resolve_string(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<String>> {
        Ok(self
            .lookup
            .lookup(ctx, key)?
            .and_then(Value::as_str)
            .map(String::from))
    }

    fn resolve_bool(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<bool>> {
        Ok(self.lookup.lookup(ctx, key)?.and_then(Value::as_bool))
    }

    fn resolve_int(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<i64>> {
        Ok(self.lookup.lookup(ctx, key)?.and_then(Value::as_int))
    }

    fn resolve_double(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<f64>> {
        Ok(self.lookup.lookup(ctx, key)?.and_then(Value::as_double))
    }

    fn resolve_datetime(
        &self,
        ctx: &RequestContext,
        key: &str,
    ) -> ParamResult<Option<OffsetDateTime>> {
        Ok(match self.lookup.lookup(ctx, key)? {
            Some(Value::DateTime(t)) => Some(*t),
            Some(Value::String(s)) if !s.is_empty() => parse_datetime(s),
            _ => None,
        })
    }

    fn resolve_string_list(
        &self,
        ctx: &RequestContext,
        key: &str,
    ) -> ParamResult<Option<Vec<String>>> {
        Ok(match self.lookup.lookup(ctx, key)? {
            Some(Value::StringList(items)) => Some(items.clone()),
            Some(Value::String(s)) if !s.is_empty() => Some(parse_string_list(s)),
            _ => None,
        })
    }
}
