//! Parameter source implementations.
//!
//! Two adapters turn an origin into a [`ParameterSource`](crate::ParameterSource):
//!
//! - [`Strict`] - raw text that must parse; bad content is an error
//! - [`Lenient`] - typed values; absent or mismatched values are "no value"
//!
//! Built-in origins:
//!
//! - [`QuerySource`], [`FormSource`], [`CookieSource`], [`ServerVariableSource`]
//! - [`RequestParamsSource`] - all four request collections, query first
//! - [`ContextItemsSource`] - typed per-request items
//! - [`RouteDataSource`] - typed route values

mod context;
mod lenient;
mod request;
mod strict;

pub use context::{ContextItems, ContextItemsSource, RouteDataSource, RouteValues};
pub use lenient::{Lenient, TypedLookup};
pub use request::{
    CookieSource, Cookies, FormBody, FormSource, QuerySource, QueryString, RequestParams,
    RequestParamsSource, ServerVariableSource, ServerVariables,
};
pub use strict::{RawLookup, Strict};
