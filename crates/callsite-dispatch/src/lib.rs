//! Name-based component dispatch.
//!
//! `callsite-dispatch` turns a request that names a component and a method,
//! plus a bag of loosely typed parameters, into a call to exactly one typed
//! method overload, and renders the result in the requested format.
//!
//! # Features
//!
//! - **Component registry**: Components register typed method tables at startup
//! - **Overload binding**: Picks one overload by arity, parameter names and kinds
//! - **Faithful errors**: Component failures surface with their own type
//! - **Hook system**: Pre/post dispatch and post-output hooks
//! - **Content negotiation**: JSON, YAML, XML, CSV and RSS builders keyed by a format token
//! - **Debug payloads**: Optional trace info attached to item-list results
//!
//! # Pipeline
//!
//! ```text
//! route data → extract → normalize → bind → invoke → render → Response
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use callsite_dispatch::{ComponentRegistry, ComponentType, Dispatcher, ItemList};
//! use callsite_params::RequestContext;
//!
//! struct Search {
//!     docs: Vec<&'static str>,
//! }
//!
//! impl Search {
//!     fn find(&self, query: &str, limit: i64) -> anyhow::Result<ItemList<&'static str>> {
//!         let hits: Vec<_> = self
//!             .docs
//!             .iter()
//!             .copied()
//!             .filter(|d| query == "*" || d.contains(query))
//!             .take(limit.max(0) as usize)
//!             .collect();
//!         Ok(ItemList::new(hits).title(format!("Results for {query}")))
//!     }
//! }
//!
//! let search = ComponentType::new(Search { docs: vec!["rust", "go", "zig"] })
//!     .method("Find", &["query", "limit"], |s: &Search, q: String, limit: i64| {
//!         s.find(&q, limit)
//!     });
//!
//! let mut components = ComponentRegistry::new();
//! components.register("Search", search).unwrap();
//! let dispatcher = Dispatcher::builder().components(components).build();
//!
//! let request = RequestContext::builder()
//!     .route("componentName", "Search")
//!     .route("methodName", "Find")
//!     .route("query", "~")
//!     .route("limit", "2")
//!     .query("type", "json")
//!     .build();
//!
//! let response = dispatcher.dispatch(&request).unwrap();
//! assert_eq!(response.content_type, "application/json");
//! assert!(response.body.contains("\"Results for *\""));
//! ```

// Core modules
mod bag;
mod binder;
mod component;
mod config;
mod context;
mod dispatcher;
mod error;
mod extract;
mod hooks;
mod invoke;
mod render;
mod result;
mod serialize;

pub use bag::ParameterBag;

pub use binder::{bind, Argument, BoundArguments, BoundCall};

pub use component::{
    Component, ComponentRegistry, ComponentType, InvocationFailure, Method, MethodSignature,
    Overload, ParamSpec, ScopedMethod,
};

pub use config::{ConfigError, ConfigLoader, DispatchConfig, CONFIG_FILE, ENV_PREFIX};

pub use context::{CallScope, DispatchContext, Extensions};

pub use dispatcher::{Dispatcher, DispatcherBuilder};

pub use error::{DispatchError, RegistryError};

pub use extract::{
    extract, is_reserved, unescape_wildcard, COMPONENT_KEY, ESCAPED_WILDCARD, METHOD_KEY,
    RESERVED_KEYS, WILDCARD, WILDCARD_KEY,
};

pub use hooks::{HookError, HookPhase, Hooks, PostDispatchFn, PostOutputFn, PreDispatchFn};

pub use invoke::{invoke, unwrap_failure};

pub use render::{render, select, BuildError, RendererRegistry, Response, ResultBuilder};

pub use result::{Data, DebugInfo, ItemList, ResultData};

pub use serialize::{CsvBuilder, JsonBuilder, RssBuilder, XmlBuilder, YamlBuilder};
