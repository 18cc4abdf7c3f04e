//! HTTP request origins.
//!
//! Each origin reads one string collection of the attached
//! [`RequestData`](crate::RequestData). All of them fail with
//! [`ParamError::Unavailable`] when the context carries no request.

use crate::context::{Params, RequestContext, RequestData};
use crate::error::{ParamError, ParamResult};
use crate::sources::strict::{RawLookup, Strict};

fn request<'c>(ctx: &'c RequestContext, key: &str) -> ParamResult<&'c RequestData> {
    ctx.request()
        .ok_or_else(|| ParamError::unavailable(key, "no HTTP request available"))
}

fn raw_from(params: &Params, key: &str) -> Option<String> {
    params.get(key).map(String::from)
}

/// The query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryString;

impl RawLookup for QueryString {
    fn name(&self) -> &'static str {
        "query string"
    }

    fn raw(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<String>> {
        Ok(raw_from(&request(ctx, key)?.query, key))
    }
}

/// The form body.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormBody;

impl RawLookup for FormBody {
    fn name(&self) -> &'static str {
        "form"
    }

    fn raw(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<String>> {
        Ok(raw_from(&request(ctx, key)?.form, key))
    }
}

/// Request cookies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cookies;

impl RawLookup for Cookies {
    fn name(&self) -> &'static str {
        "cookies"
    }

    fn raw(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<String>> {
        Ok(raw_from(&request(ctx, key)?.cookies, key))
    }
}

/// Server variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerVariables;

impl RawLookup for ServerVariables {
    fn name(&self) -> &'static str {
        "server variables"
    }

    fn raw(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<String>> {
        Ok(raw_from(&request(ctx, key)?.server_variables, key))
    }
}

/// All request collections at once.
///
/// Consults query string, form, cookies and server variables in that order
/// and returns the first collection that contains the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestParams;

impl RawLookup for RequestParams {
    fn name(&self) -> &'static str {
        "request params"
    }

    fn raw(&self, ctx: &RequestContext, key: &str) -> ParamResult<Option<String>> {
        let request = request(ctx, key)?;
        Ok([
            &request.query,
            &request.form,
            &request.cookies,
            &request.server_variables,
        ]
        .into_iter()
        .find_map(|params| raw_from(params, key)))
    }
}

/// Strict source over the query string.
pub type QuerySource = Strict<QueryString>;
/// Strict source over the form body.
pub type FormSource = Strict<FormBody>;
/// Strict source over cookies.
pub type CookieSource = Strict<Cookies>;
/// Strict source over server variables.
pub type ServerVariableSource = Strict<ServerVariables>;
/// Strict source over all request collections.
pub type RequestParamsSource = Strict<RequestParams>;
