//! # Callsite - Name-Based Component Dispatch
//!
//! Callsite routes a request that names a component and a method to exactly
//! one typed method overload, then renders the result in the requested
//! format. It provides:
//!
//! - Typed parameter resolution from route data, request collections and
//!   per-request items ([`params`])
//! - A startup-time component registry with typed method tables
//! - Overload binding by arity, parameter names and kinds
//! - Faithful error propagation: component failures keep their own type
//! - JSON, YAML, XML, CSV and RSS output selected by a format token
//! - Pre/post dispatch hooks and `tracing` instrumentation ([`logging`])
//!
//! This crate re-exports `callsite-params` and `callsite-dispatch` and owns
//! logging initialization.
//!
//! ## Quick Start
//!
//! ```rust
//! use callsite::{ComponentRegistry, ComponentType, Dispatcher, RequestContext};
//!
//! struct Greeter;
//!
//! let mut components = ComponentRegistry::new();
//! components
//!     .register(
//!         "Greeter",
//!         ComponentType::new(Greeter)
//!             .method("Hello", &["name"], |_: &Greeter, name: String| {
//!                 Ok::<_, anyhow::Error>(format!("hello {name}"))
//!             }),
//!     )
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::builder().components(components).build();
//! let request = RequestContext::builder()
//!     .route("componentName", "Greeter")
//!     .route("methodName", "Hello")
//!     .route("name", "ada")
//!     .query("type", "yaml")
//!     .build();
//!
//! let response = dispatcher.dispatch(&request).unwrap();
//! assert_eq!(response.content_type, "application/yaml");
//! assert_eq!(response.body.trim(), "hello ada");
//! ```
//!
//! ## Core Concepts
//!
//! - [`RequestContext`]: Per-request route data, HTTP collections and items
//! - [`ResolverChain`]: Ordered parameter sources, first present value wins
//! - [`ComponentType`]: Builder for a component's method table
//! - [`Dispatcher`]: The extract, bind, invoke and render pipeline
//! - [`RendererRegistry`]: Format tokens mapped to result builders

pub mod logging;

/// Parameter resolution types.
pub use callsite_params as params;

pub use callsite_params::{
    FromParam, ParamError, ParameterSource, ParameterSourceExt, RequestContext,
    RequestContextBuilder, ResolverChain, RouteData, Value, ValueKind,
};

pub use callsite_dispatch::{
    CallScope, ComponentRegistry, ComponentType, ConfigLoader, Data, DispatchConfig,
    DispatchContext, DispatchError, Dispatcher, DispatcherBuilder, HookError, Hooks, ItemList,
    RegistryError, RendererRegistry, Response, ResultBuilder, ResultData,
};

/// Dispatch pipeline internals: binder, builders, extraction helpers.
pub use callsite_dispatch as dispatch;
