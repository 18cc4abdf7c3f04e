//! Prioritized, typed parameter resolution over request origins.
//!
//! `callsite-params` looks up a named value from the places a request can carry
//! one (query string, form body, cookies, server variables, route data, and
//! per-request context items) and converts it to a typed value.
//!
//! # Quick Start
//!
//! ```ignore
//! use callsite_params::{ParameterSourceExt, QuerySource, ResolverChain, RouteDataSource};
//!
//! // Route data first, then the query string
//! let chain = ResolverChain::new()
//!     .source(RouteDataSource::default())
//!     .source(QuerySource::default());
//!
//! let page: i64 = chain.resolve(&ctx, "page")?;
//! let sort: Option<String> = chain.try_resolve(&ctx, "sort");
//! ```
//!
//! # Architecture
//!
//! The crate is built around the [`ParameterSource`] trait, which every origin
//! implements. Sources are composed into [`ResolverChain`]s that try each
//! source in order until one returns a present value.
//!
//! ```text
//! ResolverChain
//! ├── RouteDataSource   → None (no such route value)
//! ├── QuerySource       → Some("")  (empty string, skipped)
//! ├── FormSource        → Some("42") ← returns this
//! └── ContextItemsSource → (not reached)
//! ```
//!
//! Origins come in two flavors:
//!
//! - **Strict** origins hold raw text. Text that does not parse as the
//!   requested type is a [`ParamError::Parse`].
//! - **Lenient** origins hold typed [`Value`]s. A value of another type is
//!   simply "no value".
//!
//! All request-specific state lives on the [`RequestContext`] passed to each
//! call, so sources and chains are stateless and can be shared across threads.

mod chain;
mod context;
mod error;
pub mod parse;
mod source;
pub mod sources;
mod value;

// Re-export core types
pub use chain::ResolverChain;
pub use context::{Params, RequestContext, RequestContextBuilder, RequestData, RouteData};
pub use error::{ParamError, ParamResult};
pub use source::{ParameterSource, ParameterSourceExt, ResolvedParam};
pub use value::{FromParam, Value, ValueKind};

// Re-export sources at crate root for convenience
pub use sources::{
    ContextItems, ContextItemsSource, CookieSource, Cookies, FormBody, FormSource, Lenient,
    QuerySource, QueryString, RawLookup, RequestParams, RequestParamsSource, RouteDataSource,
    RouteValues, ServerVariableSource, ServerVariables, Strict, TypedLookup,
};
