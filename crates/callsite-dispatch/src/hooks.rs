//! Hook system for pre/post dispatch execution.
//!
//! Hooks allow you to run custom code at specific points in the dispatch pipeline.
//! They enable cross-cutting concerns (access control, auditing, enrichment)
//! without polluting component logic.
//!
//! # Pipeline Position
//!
//! ```text
//! extracted + normalized bag
//!   → PRE-DISPATCH HOOK ← (authentication, access control, bag rewrites)
//!   → bind + invoke
//!   → POST-DISPATCH HOOK ← (result enrichment or replacement)
//!   → render
//!   → POST-OUTPUT HOOK ← (response transformation, auditing)
//! ```
//!
//! # Hook Points
//!
//! - Pre-dispatch: Runs before binding. Receives the [`DispatchContext`]
//!   mutably and can abort the dispatch.
//!
//! - Post-dispatch: Runs after the method returns, before rendering. Can
//!   inspect or replace the result.
//!
//! - Post-output: Runs after rendering. Can transform the response or abort.

use std::fmt;
use std::sync::Arc;

use callsite_params::RequestContext;
use thiserror::Error;

use crate::context::DispatchContext;
use crate::render::Response;
use crate::result::ResultData;

/// The phase at which a hook error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    /// Error occurred during pre-dispatch phase
    PreDispatch,
    /// Error occurred during post-dispatch phase
    PostDispatch,
    /// Error occurred during post-output phase
    PostOutput,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::PreDispatch => write!(f, "pre-dispatch"),
            HookPhase::PostDispatch => write!(f, "post-dispatch"),
            HookPhase::PostOutput => write!(f, "post-output"),
        }
    }
}

/// Error returned by a hook.
#[derive(Debug, Error)]
#[error("hook error ({phase}): {message}")]
pub struct HookError {
    /// Human-readable error message
    pub message: String,
    /// The hook phase where the error occurred
    pub phase: HookPhase,
    /// The underlying error source, if any
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HookError {
    /// Creates a new hook error for the pre-dispatch phase.
    pub fn pre_dispatch(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase: HookPhase::PreDispatch,
            source: None,
        }
    }

    /// Creates a new hook error for the post-dispatch phase.
    pub fn post_dispatch(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase: HookPhase::PostDispatch,
            source: None,
        }
    }

    /// Creates a new hook error for the post-output phase.
    pub fn post_output(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase: HookPhase::PostOutput,
            source: None,
        }
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }
}

/// Type alias for pre-dispatch hook functions.
pub type PreDispatchFn =
    Arc<dyn Fn(&RequestContext, &mut DispatchContext) -> Result<(), HookError> + Send + Sync>;

/// Type alias for post-dispatch hook functions.
pub type PostDispatchFn = Arc<
    dyn Fn(
            &RequestContext,
            &DispatchContext,
            Box<dyn ResultData>,
        ) -> Result<Box<dyn ResultData>, HookError>
        + Send
        + Sync,
>;

/// Type alias for post-output hook functions.
pub type PostOutputFn = Arc<
    dyn Fn(&RequestContext, &DispatchContext, Response) -> Result<Response, HookError>
        + Send
        + Sync,
>;

/// Hook configuration for a dispatcher.
///
/// Hooks run in registration order.
#[derive(Clone, Default)]
pub struct Hooks {
    pre_dispatch: Vec<PreDispatchFn>,
    post_dispatch: Vec<PostDispatchFn>,
    post_output: Vec<PostOutputFn>,
}

impl Hooks {
    /// Creates a new empty hooks configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.pre_dispatch.is_empty() && self.post_dispatch.is_empty() && self.post_output.is_empty()
    }

    /// Adds a pre-dispatch hook.
    ///
    /// # Example
    ///
    /// ```rust
    /// use callsite_dispatch::{HookError, Hooks};
    ///
    /// // Only the Search component is public.
    /// let hooks = Hooks::new().pre_dispatch(|_req, ctx| {
    ///     if ctx.component != "Search" {
    ///         return Err(HookError::pre_dispatch("access denied"));
    ///     }
    ///     Ok(())
    /// });
    /// ```
    pub fn pre_dispatch<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext, &mut DispatchContext) -> Result<(), HookError>
            + Send
            + Sync
            + 'static,
    {
        self.pre_dispatch.push(Arc::new(f));
        self
    }

    /// Adds a post-dispatch hook.
    pub fn post_dispatch<F>(mut self, f: F) -> Self
    where
        F: Fn(
                &RequestContext,
                &DispatchContext,
                Box<dyn ResultData>,
            ) -> Result<Box<dyn ResultData>, HookError>
            + Send
            + Sync
            + 'static,
    {
        self.post_dispatch.push(Arc::new(f));
        self
    }

    /// Adds a post-output hook.
    pub fn post_output<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext, &DispatchContext, Response) -> Result<Response, HookError>
            + Send
            + Sync
            + 'static,
    {
        self.post_output.push(Arc::new(f));
        self
    }

    /// Runs all pre-dispatch hooks.
    pub fn run_pre_dispatch(
        &self,
        request: &RequestContext,
        ctx: &mut DispatchContext,
    ) -> Result<(), HookError> {
        for hook in &self.pre_dispatch {
            hook(request, ctx)?;
        }
        Ok(())
    }

    /// Runs all post-dispatch hooks, chaining transformations.
    pub fn run_post_dispatch(
        &self,
        request: &RequestContext,
        ctx: &DispatchContext,
        result: Box<dyn ResultData>,
    ) -> Result<Box<dyn ResultData>, HookError> {
        let mut current = result;
        for hook in &self.post_dispatch {
            current = hook(request, ctx, current)?;
        }
        Ok(current)
    }

    /// Runs all post-output hooks, chaining transformations.
    pub fn run_post_output(
        &self,
        request: &RequestContext,
        ctx: &DispatchContext,
        response: Response,
    ) -> Result<Response, HookError> {
        let mut current = response;
        for hook in &self.post_output {
            current = hook(request, ctx, current)?;
        }
        Ok(current)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("pre_dispatch_count", &self.pre_dispatch.len())
            .field("post_dispatch_count", &self.post_dispatch.len())
            .field("post_output_count", &self.post_output.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn test_context() -> DispatchContext {
        DispatchContext::new("Search", "Find")
    }

    #[test]
    fn test_hook_error_creation() {
        let err = HookError::pre_dispatch("test error");
        assert_eq!(err.phase, HookPhase::PreDispatch);
        assert_eq!(err.message, "test error");
        assert_eq!(err.to_string(), "hook error (pre-dispatch): test error");
    }

    #[test]
    fn test_hooks_empty() {
        assert!(Hooks::new().is_empty());
    }

    #[test]
    fn test_pre_dispatch_success() {
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();

        let hooks = Hooks::new().pre_dispatch(move |_, _| {
            called_clone.store(true, Ordering::SeqCst);
            Ok(())
        });

        let mut ctx = test_context();
        let result = hooks.run_pre_dispatch(&RequestContext::default(), &mut ctx);

        assert!(result.is_ok());
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_pre_dispatch_error_aborts() {
        let hooks = Hooks::new()
            .pre_dispatch(|_, _| Err(HookError::pre_dispatch("first fails")))
            .pre_dispatch(|_, _| panic!("should not be called"));

        let mut ctx = test_context();
        let result = hooks.run_pre_dispatch(&RequestContext::default(), &mut ctx);

        assert!(result.is_err());
    }

    #[test]
    fn test_pre_dispatch_rewrites_bag_and_injects_extensions() {
        struct Tenant(&'static str);

        let hooks = Hooks::new().pre_dispatch(|_, ctx| {
            ctx.bag.insert("limit", 5i64);
            ctx.extensions.insert(Tenant("acme"));
            Ok(())
        });

        let mut ctx = test_context();
        hooks
            .run_pre_dispatch(&RequestContext::default(), &mut ctx)
            .unwrap();

        assert!(ctx.bag.contains_key("limit"));
        assert_eq!(ctx.extensions.get::<Tenant>().map(|t| t.0), Some("acme"));
    }

    #[test]
    fn test_post_dispatch_replaces_result() {
        let hooks = Hooks::new().post_dispatch(|_, ctx, _result| {
            Ok(Box::new(format!("replaced for {}", ctx.method)) as Box<dyn ResultData>)
        });

        let ctx = test_context();
        let result = hooks
            .run_post_dispatch(&RequestContext::default(), &ctx, Box::new(String::from("x")))
            .unwrap();

        assert_eq!(
            result.as_any().downcast_ref::<String>().map(String::as_str),
            Some("replaced for Find")
        );
    }

    #[test]
    fn test_post_output_transformation() {
        let hooks = Hooks::new().post_output(|_, _, mut response| {
            response.body = response.body.to_uppercase();
            Ok(response)
        });

        let ctx = test_context();
        let result = hooks
            .run_post_output(
                &RequestContext::default(),
                &ctx,
                Response::new("text/plain", "hello"),
            )
            .unwrap();

        assert_eq!(result.body, "HELLO");
    }
}
