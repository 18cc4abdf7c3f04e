//! Error types for the dispatch pipeline.

use callsite_params::ParamError;
use thiserror::Error;

use crate::hooks::HookError;
use crate::render::BuildError;

/// Errors surfaced by [`Dispatcher::dispatch`](crate::Dispatcher::dispatch)
/// and the individual pipeline stages.
///
/// Failures raised inside an invoked component are carried by
/// [`DispatchError::Component`] with their original identity, so hosts can
/// downcast to the component's own error type.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A parameter could not be resolved, was missing, or did not parse.
    #[error(transparent)]
    Param(#[from] ParamError),

    /// A required collaborator is missing or misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No component is registered under the requested name.
    #[error("no component named \"{0}\" is registered")]
    ComponentNotFound(String),

    /// No overload of the method accepts the supplied parameters.
    #[error("no method {component}.{method} accepts ({arguments})")]
    MethodNotFound {
        /// The component that was searched.
        component: String,
        /// The requested method name.
        method: String,
        /// Names and kinds of the supplied parameters.
        arguments: String,
    },

    /// More than one overload matches equally well.
    #[error("call to {component}.{method} is ambiguous between {candidates}")]
    AmbiguousOverload {
        /// The component that was searched.
        component: String,
        /// The requested method name.
        method: String,
        /// The tied signatures.
        candidates: String,
    },

    /// The selected output builder cannot represent this result.
    #[error("the \"{token}\" format is not available for {shape} results")]
    UnsupportedFormat {
        /// Shape name of the result.
        shape: String,
        /// The format token (or default builder format) that was used.
        token: String,
    },

    /// A builder failed for a reason other than an unsupported shape.
    #[error("failed to render result: {0}")]
    Render(#[source] BuildError),

    /// A hook aborted the pipeline.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// The invoked component failed. Display and source delegate to the
    /// component's own error.
    #[error(transparent)]
    Component(anyhow::Error),
}

impl DispatchError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        DispatchError::Configuration(message.into())
    }

    /// Returns true for errors caused by the caller's input.
    ///
    /// Parameter problems, unknown methods, ambiguous calls and unsupported
    /// formats are client errors. An unavailable request context is not: it
    /// means the host wired the pipeline incorrectly.
    pub fn is_client_error(&self) -> bool {
        match self {
            DispatchError::Param(ParamError::Unavailable { .. }) => false,
            DispatchError::Param(_)
            | DispatchError::AmbiguousOverload { .. }
            | DispatchError::UnsupportedFormat { .. } => true,
            _ => false,
        }
    }

    /// HTTP-style status code for hosts that map errors to responses.
    ///
    /// | Kind | Status |
    /// |------|--------|
    /// | parameter missing, parse, ambiguous, unsupported format | 400 |
    /// | hook rejection | 403 |
    /// | component or method not found | 404 |
    /// | everything else | 500 |
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::ComponentNotFound(_) | DispatchError::MethodNotFound { .. } => 404,
            DispatchError::Hook(_) => 403,
            e if e.is_client_error() => 400,
            _ => 500,
        }
    }

    /// The component's own error, if this is a component failure.
    pub fn component_error(&self) -> Option<&anyhow::Error> {
        match self {
            DispatchError::Component(e) => Some(e),
            _ => None,
        }
    }

    /// Downcasts a component failure to the component's error type.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        self.component_error().and_then(|e| e.downcast_ref::<E>())
    }
}

/// Errors detected while registering components and methods.
///
/// These are startup errors; a registry that builds successfully never
/// produces them during request handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The number of parameter names differs from the closure's arity.
    #[error("{method} declares {names} parameter names but takes {arity} arguments")]
    ArityMismatch {
        /// The method being registered.
        method: String,
        /// Number of parameter names supplied.
        names: usize,
        /// Number of typed closure arguments.
        arity: usize,
    },

    /// A parameter name appears twice in one overload.
    #[error("{method} declares parameter \"{name}\" more than once")]
    DuplicateParameter {
        /// The method being registered.
        method: String,
        /// The repeated name.
        name: String,
    },

    /// Two overloads share a method name and type vector.
    #[error("{signature} is registered more than once")]
    DuplicateOverload {
        /// The repeated signature.
        signature: String,
    },

    /// A component name is registered twice.
    #[error("a component named \"{0}\" is already registered")]
    DuplicateComponent(String),
}
