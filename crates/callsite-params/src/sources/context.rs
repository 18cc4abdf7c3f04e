//! Typed origins that live on the request context itself.

use crate::context::RequestContext;
use crate::error::ParamResult;
use crate::sources::lenient::{Lenient, TypedLookup};
use crate::value::Value;

/// Typed items set on the context by upstream middleware.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextItems;

impl TypedLookup for ContextItems {
    fn name(&self) -> &'static str {
        "context items"
    }

    fn lookup<'c>(&self, ctx: &'c RequestContext, key: &str) -> ParamResult<Option<&'c Value>> {
        Ok(ctx.item(key))
    }
}

/// Route values produced by the router.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteValues;

impl TypedLookup for RouteValues {
    fn name(&self) -> &'static str {
        "route data"
    }

    fn lookup<'c>(&self, ctx: &'c RequestContext, key: &str) -> ParamResult<Option<&'c Value>> {
        Ok(ctx.route().get(key))
    }
}

/// Lenient source over context items.
pub type ContextItemsSource = Lenient<ContextItems>;
/// Lenient source over route values.
pub type RouteDataSource = Lenient<RouteValues>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParameterSource;

    #[test]
    fn route_values_are_read_typed() {
        let ctx = RequestContext::builder()
            .route("page", 2i64)
            .route("query", "rust")
            .build();
        let source = RouteDataSource::default();

        assert_eq!(source.resolve_int(&ctx, "Page").unwrap(), Some(2));
        assert_eq!(source.resolve_int(&ctx, "query").unwrap(), None);
    }

    #[test]
    fn items_work_without_a_request() {
        let ctx = RequestContext::builder()
            .item("apiKey", "k-1")
            .without_request()
            .build();
        assert_eq!(
            ContextItemsSource::default()
                .resolve_string(&ctx, "apiKey")
                .unwrap(),
            Some("k-1".into())
        );
    }
}
