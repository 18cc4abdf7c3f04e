//! The dispatch pipeline.
//!
//! ```text
//! RequestContext
//!   → extract (componentName, methodName, bag)
//!   → normalize (wildcard escape)
//!   → resolve format token and debug flag
//!   → pre-dispatch hooks
//!   → bind → invoke
//!   → post-dispatch hooks
//!   → render
//!   → post-output hooks
//!   → Response
//! ```
//!
//! A [`Dispatcher`] is built once and shared. Each call to
//! [`dispatch`](Dispatcher::dispatch) owns its own [`DispatchContext`], so
//! concurrent dispatches never observe each other's state.

use callsite_params::{
    ContextItemsSource, ParamError, ParameterSourceExt, RequestContext, RequestParamsSource,
    ResolverChain, Value,
};
use time::OffsetDateTime;
use tracing::{debug, field, info_span};

use crate::binder::bind;
use crate::component::ComponentRegistry;
use crate::config::DispatchConfig;
use crate::context::{CallScope, DispatchContext};
use crate::error::DispatchError;
use crate::extract::{extract, unescape_wildcard, COMPONENT_KEY, METHOD_KEY};
use crate::hooks::Hooks;
use crate::invoke::invoke;
use crate::render::{RendererRegistry, Response};
use crate::result::DebugInfo;

/// Routes requests to component methods and renders the results.
///
/// # Example
///
/// ```
/// use callsite_dispatch::{ComponentRegistry, ComponentType, Dispatcher};
/// use callsite_params::RequestContext;
///
/// struct Clock;
///
/// let mut components = ComponentRegistry::new();
/// components
///     .register(
///         "Clock",
///         ComponentType::new(Clock).method("Echo", &["text"], |_: &Clock, text: String| {
///             Ok::<_, anyhow::Error>(text)
///         }),
///     )
///     .unwrap();
///
/// let dispatcher = Dispatcher::builder().components(components).build();
///
/// let request = RequestContext::builder()
///     .route("componentName", "Clock")
///     .route("methodName", "Echo")
///     .route("text", "hi")
///     .build();
///
/// let response = dispatcher.dispatch(&request).unwrap();
/// assert_eq!(response.body, "\"hi\"");
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    components: ComponentRegistry,
    renderers: RendererRegistry,
    resolver: ResolverChain,
    hooks: Hooks,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Starts building a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// The component registry.
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// The renderer registry.
    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }

    /// The resolver chain used for the format token, the debug flag and
    /// scoped methods.
    pub fn resolver(&self) -> &ResolverChain {
        &self.resolver
    }

    /// The active configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Runs the full pipeline for one request.
    ///
    /// # Errors
    ///
    /// Any stage can fail; see [`DispatchError`] for the kinds. Nothing is
    /// retried and no error is swallowed.
    pub fn dispatch(&self, request: &RequestContext) -> Result<Response, DispatchError> {
        let span = info_span!(
            "dispatch",
            component = field::Empty,
            method = field::Empty,
            format = field::Empty,
        );
        let _guard = span.enter();

        let mut ctx = self.prepare(request)?;
        span.record("component", ctx.component.as_str());
        span.record("method", ctx.method.as_str());
        span.record("format", ctx.format.as_str());

        self.hooks.run_pre_dispatch(request, &mut ctx)?;

        let component = self.components.resolve(&ctx.component)?;
        let call = bind(&component, &ctx.method, &ctx.bag)?;
        let debug_info = ctx.debug.then(|| DebugInfo {
            component: ctx.component.clone(),
            method: ctx.method.clone(),
            signature: call.overload.signature().to_string(),
            arguments: call.args.iter().map(|a| format!("{} = {}", a.name, a.value)).collect(),
            format: (!ctx.format.is_empty()).then(|| ctx.format.clone()),
            started_at: OffsetDateTime::now_utc(),
            elapsed_micros: 0,
        });

        let scope = CallScope::new(request, &self.resolver, &ctx.extensions);
        let result = invoke(call, &scope, debug_info)?;
        let result = self.hooks.run_post_dispatch(request, &ctx, result)?;

        let response = self.renderers.render(result.as_ref(), &ctx.format)?;
        let response = self.hooks.run_post_output(request, &ctx, response)?;

        debug!(content_type = %response.content_type, bytes = response.body.len(), "dispatch complete");
        Ok(response)
    }

    /// Extracts and normalizes the dispatch target and inputs.
    fn prepare(&self, request: &RequestContext) -> Result<DispatchContext, DispatchError> {
        let component = route_name(request, COMPONENT_KEY)?;
        let method = route_name(request, METHOD_KEY)?;

        let mut bag = extract(request.route());
        if self.config.wildcard_escape && unescape_wildcard(&mut bag) {
            debug!("escaped wildcard restored");
        }

        let format = match self
            .resolver
            .try_resolve::<String>(request, &self.config.format_key)
        {
            Some(token) => token,
            None => self.config.default_format.clone().unwrap_or_default(),
        };

        let debug = self.config.debug
            || self
                .resolver
                .try_resolve::<bool>(request, &self.config.debug_key)
                .unwrap_or(false);

        Ok(DispatchContext {
            component,
            method,
            bag,
            format,
            debug,
            ..Default::default()
        })
    }
}

/// Reads a routing key from route data.
///
/// Lookup ignores ASCII case, the same way the extractor recognizes reserved
/// keys, so `ComponentName` both names the target and stays out of the bag.
fn route_name(request: &RequestContext, key: &str) -> Result<String, DispatchError> {
    match request.route().get(key) {
        Some(Value::String(name)) if !name.is_empty() => Ok(name.clone()),
        _ => Err(ParamError::missing(key).into()),
    }
}

/// Builder for [`Dispatcher`].
///
/// Defaults: no components, [`RendererRegistry::standard`], a resolver
/// chain of request parameters then context items, no hooks, and
/// [`DispatchConfig::default`].
#[derive(Debug, Default)]
pub struct DispatcherBuilder {
    components: Option<ComponentRegistry>,
    renderers: Option<RendererRegistry>,
    resolver: Option<ResolverChain>,
    hooks: Hooks,
    config: DispatchConfig,
}

impl DispatcherBuilder {
    /// Sets the component registry.
    pub fn components(mut self, components: ComponentRegistry) -> Self {
        self.components = Some(components);
        self
    }

    /// Sets the renderer registry.
    pub fn renderers(mut self, renderers: RendererRegistry) -> Self {
        self.renderers = Some(renderers);
        self
    }

    /// Sets the resolver chain.
    pub fn resolver(mut self, resolver: ResolverChain) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the hooks.
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets the configuration.
    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the dispatcher.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            components: self.components.unwrap_or_default(),
            renderers: self.renderers.unwrap_or_else(RendererRegistry::standard),
            resolver: self.resolver.unwrap_or_else(|| {
                ResolverChain::new()
                    .source(RequestParamsSource::default())
                    .source(ContextItemsSource::default())
            }),
            hooks: self.hooks,
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentType;
    use crate::hooks::HookError;

    struct Echo;

    fn dispatcher(config: DispatchConfig, hooks: Hooks) -> Dispatcher {
        let mut components = ComponentRegistry::new();
        components
            .register(
                "Echo",
                ComponentType::new(Echo).method("Say", &["query"], |_: &Echo, q: String| {
                    Ok::<_, anyhow::Error>(q)
                }),
            )
            .unwrap();
        Dispatcher::builder()
            .components(components)
            .hooks(hooks)
            .config(config)
            .build()
    }

    fn say(query: &str) -> RequestContext {
        RequestContext::builder()
            .route(COMPONENT_KEY, "Echo")
            .route(METHOD_KEY, "Say")
            .route("query", query)
            .build()
    }

    #[test]
    fn missing_target_is_parameter_missing() {
        let d = dispatcher(DispatchConfig::default(), Hooks::new());
        let request = RequestContext::builder().route(METHOD_KEY, "Say").build();
        assert!(matches!(
            d.dispatch(&request),
            Err(DispatchError::Param(ParamError::Missing(k))) if k == COMPONENT_KEY
        ));
    }

    #[test]
    fn routing_keys_ignore_case() {
        let d = dispatcher(DispatchConfig::default(), Hooks::new());
        let request = RequestContext::builder()
            .route("ComponentName", "Echo")
            .route("METHODNAME", "Say")
            .route("query", "x")
            .build();
        assert_eq!(d.dispatch(&request).unwrap().body, "\"x\"");
    }

    #[test]
    fn wildcard_escape_can_be_disabled() {
        let on = dispatcher(DispatchConfig::default(), Hooks::new());
        assert_eq!(on.dispatch(&say("~")).unwrap().body, "\"*\"");

        let off = dispatcher(
            DispatchConfig {
                wildcard_escape: false,
                ..Default::default()
            },
            Hooks::new(),
        );
        assert_eq!(off.dispatch(&say("~")).unwrap().body, "\"~\"");
    }

    #[test]
    fn default_format_applies_when_request_names_none() {
        let d = dispatcher(
            DispatchConfig {
                default_format: Some("yaml".into()),
                ..Default::default()
            },
            Hooks::new(),
        );
        assert_eq!(d.dispatch(&say("x")).unwrap().content_type, "application/yaml");
    }

    #[test]
    fn hooks_see_and_rewrite_the_context() {
        let hooks = Hooks::new()
            .pre_dispatch(|_, ctx| {
                ctx.bag.insert("query", "rewritten");
                Ok(())
            })
            .post_output(|_, ctx, mut response| {
                response.body = format!("{}:{}", ctx.method, response.body);
                Ok(response)
            });
        let d = dispatcher(DispatchConfig::default(), hooks);
        assert_eq!(d.dispatch(&say("x")).unwrap().body, "Say:\"rewritten\"");
    }

    #[test]
    fn rejecting_hook_stops_before_binding() {
        let hooks = Hooks::new().pre_dispatch(|_, _| Err(HookError::pre_dispatch("denied")));
        let d = dispatcher(DispatchConfig::default(), hooks);
        let err = d.dispatch(&say("x")).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn request_without_http_data_uses_defaults() {
        let d = dispatcher(
            DispatchConfig {
                default_format: Some("yaml".into()),
                ..Default::default()
            },
            Hooks::new(),
        );
        let request = RequestContext::builder()
            .route(COMPONENT_KEY, "Echo")
            .route(METHOD_KEY, "Say")
            .route("query", "x")
            .without_request()
            .build();
        let response = d.dispatch(&request).unwrap();
        assert_eq!(response.content_type, "application/yaml");
    }
}
