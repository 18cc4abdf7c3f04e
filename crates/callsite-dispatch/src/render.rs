//! Result builder abstraction and format selection.
//!
//! Defines the contract between dispatch and output builders. Dispatch
//! doesn't know about wire formats; it just knows that for each format token
//! there's a builder that turns a result into a [`Response`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::result::ResultData;
use crate::serialize::{CsvBuilder, JsonBuilder, RssBuilder, XmlBuilder, YamlBuilder};

/// A rendered response body with its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Media type, e.g. `application/json`.
    pub content_type: String,
    /// The rendered body.
    pub body: String,
}

impl Response {
    /// Creates a response.
    pub fn new(content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            body: body.into(),
        }
    }
}

/// Errors that can occur while building a response.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The builder cannot represent this result shape.
    #[error("{format} output cannot represent {shape} results")]
    Unsupported {
        /// Builder format name.
        format: &'static str,
        /// Shape of the rejected result.
        shape: &'static str,
    },

    /// JSON serialization failed
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization failed
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// XML serialization failed
    #[error("XML serialization failed: {0}")]
    Xml(String),

    /// CSV serialization failed
    #[error("CSV serialization failed: {0}")]
    Csv(String),
}

impl BuildError {
    /// Creates an unsupported-shape error.
    pub fn unsupported(format: &'static str, result: &dyn ResultData) -> Self {
        BuildError::Unsupported {
            format,
            shape: result.shape(),
        }
    }
}

/// Turns a result into a response for one output format.
pub trait ResultBuilder: Send + Sync {
    /// Format name, e.g. `json`.
    fn format(&self) -> &'static str;

    /// Builds the response.
    ///
    /// Returns [`BuildError::Unsupported`] for result shapes this format
    /// cannot represent.
    fn build(&self, result: &dyn ResultData) -> Result<Response, BuildError>;
}

/// Maps format tokens to builders, with one default builder.
///
/// Immutable once built and safe to share across threads.
///
/// # Example
///
/// ```
/// use callsite_dispatch::{ItemList, RendererRegistry};
///
/// let registry = RendererRegistry::standard();
/// let result = ItemList::new(vec!["a", "b"]).title("Letters");
///
/// let response = registry.render(&result, "rss").unwrap();
/// assert_eq!(response.content_type, "application/rss+xml");
///
/// // Unknown and empty tokens fall back to the default builder.
/// let response = registry.render(&result, "").unwrap();
/// assert_eq!(response.content_type, "application/json");
/// ```
#[derive(Clone)]
pub struct RendererRegistry {
    builders: HashMap<String, Arc<dyn ResultBuilder>>,
    default: Arc<dyn ResultBuilder>,
}

impl RendererRegistry {
    /// Creates a registry with only a default builder.
    pub fn new<B: ResultBuilder + 'static>(default: B) -> Self {
        Self {
            builders: HashMap::new(),
            default: Arc::new(default),
        }
    }

    /// JSON default plus `json`, `yaml`, `xml`, `csv` and `rss`.
    pub fn standard() -> Self {
        Self::new(JsonBuilder::default())
            .builder("json", JsonBuilder::default())
            .builder("yaml", YamlBuilder)
            .builder("xml", XmlBuilder::default())
            .builder("csv", CsvBuilder)
            .builder("rss", RssBuilder::default())
    }

    /// Registers a builder for `token`, replacing any previous one.
    pub fn builder<B: ResultBuilder + 'static>(mut self, token: impl Into<String>, builder: B) -> Self {
        self.builders.insert(token.into(), Arc::new(builder));
        self
    }

    /// Replaces the default builder.
    pub fn default_builder<B: ResultBuilder + 'static>(mut self, builder: B) -> Self {
        self.default = Arc::new(builder);
        self
    }

    /// Looks up the builder registered for `token`.
    pub fn get(&self, token: &str) -> Option<&dyn ResultBuilder> {
        self.builders.get(token).map(|b| b.as_ref())
    }

    /// The default builder.
    pub fn fallback(&self) -> &dyn ResultBuilder {
        self.default.as_ref()
    }

    /// Registered tokens, sorted.
    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        tokens.sort_unstable();
        tokens
    }

    /// Renders `result` with the builder for `token`, or the default.
    pub fn render(&self, result: &dyn ResultData, token: &str) -> Result<Response, DispatchError> {
        render(result, token, Some(&self.builders), self.default.as_ref())
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("tokens", &self.tokens())
            .field("default", &self.default.format())
            .finish()
    }
}

/// Picks the builder for `token`.
///
/// A non-empty token registered in `builders` selects that builder; anything
/// else selects `default`. Tokens match exactly.
pub fn select<'a>(
    token: &str,
    builders: Option<&'a HashMap<String, Arc<dyn ResultBuilder>>>,
    default: &'a dyn ResultBuilder,
) -> &'a dyn ResultBuilder {
    if token.is_empty() {
        return default;
    }
    match builders.and_then(|b| b.get(token)) {
        Some(builder) => builder.as_ref(),
        None => {
            debug!(token, fallback = default.format(), "no builder for format token");
            default
        }
    }
}

/// Renders a result, falling back to `default` when `token` is empty or
/// unknown.
///
/// A [`BuildError::Unsupported`] from the chosen builder becomes
/// [`DispatchError::UnsupportedFormat`], a client-facing parameter error
/// naming the result shape and the token. Any other builder failure is a
/// [`DispatchError::Render`].
pub fn render(
    result: &dyn ResultData,
    token: &str,
    builders: Option<&HashMap<String, Arc<dyn ResultBuilder>>>,
    default: &dyn ResultBuilder,
) -> Result<Response, DispatchError> {
    let builder = select(token, builders, default);
    builder.build(result).map_err(|e| match e {
        BuildError::Unsupported { format, shape } => {
            let token = if token.is_empty() { format } else { token };
            warn!(shape, token, "result shape not supported by format");
            DispatchError::UnsupportedFormat {
                shape: shape.to_string(),
                token: token.to_string(),
            }
        }
        other => DispatchError::Render(other),
    })
}
