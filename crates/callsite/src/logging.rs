//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! The dispatch crates only emit `tracing` events; a host decides where they
//! go. This module wires a formatter and an [`EnvFilter`] in one call.
//!
//! # Configuration-Based Initialization
//!
//! ```rust,ignore
//! use callsite::logging::{self, LoggingConfig};
//!
//! logging::init_from_config(&LoggingConfig::default());
//! ```
//!
//! # Manual Initialization
//!
//! ```rust,ignore
//! use callsite::logging::{LogFormat, LoggingBuilder};
//!
//! LoggingBuilder::new()
//!     .directive("callsite_dispatch=debug")
//!     .format(LogFormat::Pretty)
//!     .init();
//! ```
//!
//! `RUST_LOG` takes precedence over the configured base level.

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::EnvFilter;

/// Log line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line, abbreviated.
    #[default]
    Compact,
    /// Single-line with all span fields.
    Full,
    /// Multi-line, human oriented.
    Pretty,
    /// Newline-delimited JSON. Requires the `json-log` feature; falls back
    /// to [`LogFormat::Full`] without it.
    Json,
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard error, keeping standard output free for responses.
    #[default]
    Stderr,
    /// Standard output.
    Stdout,
}

/// Serializable logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level: `trace`, `debug`, `info`, `warn` or `error`.
    pub level: String,
    /// Line layout.
    pub format: LogFormat,
    /// Destination.
    pub output: LogOutput,
    /// Extra filter directives, e.g. `callsite_dispatch=trace`.
    pub directives: Vec<String>,
    /// Log when dispatch spans close, with their duration.
    pub span_close: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            directives: Vec::new(),
            span_close: false,
        }
    }
}

/// Initializes logging from a [`LoggingConfig`].
///
/// Does nothing if a global subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// A builder for configuring logging.
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: String,
    directives: Vec<String>,
    format: LogFormat,
    output: LogOutput,
    span_close: bool,
    with_target: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    /// Creates a builder logging `info` and above to standard error.
    pub fn new() -> Self {
        Self {
            level: String::from("info"),
            directives: Vec::new(),
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            span_close: false,
            with_target: true,
        }
    }

    /// Creates a builder from a [`LoggingConfig`].
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.clone(),
            directives: config.directives.clone(),
            format: config.format,
            output: config.output,
            span_close: config.span_close,
            with_target: true,
        }
    }

    /// Sets the base level.
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Adds a filter directive.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Sets the line layout.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the destination.
    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Logs span close events with timing.
    pub fn span_close(mut self, enabled: bool) -> Self {
        self.span_close = enabled;
        self
    }

    /// Includes the target (module path) in log output.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Builds the filter: `RUST_LOG` if set, else the base level, plus
    /// directives. Unparseable directives are skipped.
    pub fn build_filter(&self) -> EnvFilter {
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        for directive in &self.directives {
            if let Ok(d) = directive.parse() {
                filter = filter.add_directive(d);
            }
        }
        filter
    }

    /// Initializes logging, ignoring an already installed subscriber.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Initializes logging, failing if a global subscriber already exists.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        let span_events = if self.span_close {
            fmt::format::FmtSpan::CLOSE
        } else {
            fmt::format::FmtSpan::NONE
        };

        macro_rules! configure_layer {
            ($layer:expr) => {
                $layer
                    .with_span_events(span_events)
                    .with_target(self.with_target)
            };
        }

        macro_rules! init_with_writer {
            ($writer:expr) => {
                match self.format {
                    #[cfg(feature = "json-log")]
                    LogFormat::Json => {
                        let layer = fmt::layer()
                            .json()
                            .with_span_events(span_events)
                            .with_writer($writer);
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                    LogFormat::Compact => {
                        let layer = configure_layer!(fmt::layer().compact().with_writer($writer));
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                    LogFormat::Pretty => {
                        let layer = configure_layer!(fmt::layer().pretty().with_writer($writer));
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                    _ => {
                        let layer = configure_layer!(fmt::layer().with_writer($writer));
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                }
            };
        }

        match self.output {
            LogOutput::Stderr => init_with_writer!(std::io::stderr),
            LogOutput::Stdout => init_with_writer!(std::io::stdout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.output, LogOutput::Stderr);
    }

    #[test]
    fn builder_from_config_copies_settings() {
        let config = LoggingConfig {
            level: "debug".into(),
            format: LogFormat::Pretty,
            directives: vec!["callsite_dispatch=trace".into()],
            ..Default::default()
        };
        let builder = LoggingBuilder::from_config(&config);
        assert_eq!(builder.level, "debug");
        assert_eq!(builder.format, LogFormat::Pretty);
        assert_eq!(builder.directives, config.directives);
    }

    #[test]
    fn second_init_is_rejected() {
        let first = LoggingBuilder::new().level("warn").try_init();
        let second = LoggingBuilder::new().try_init();
        assert!(first.is_ok());
        assert!(second.is_err());
    }
}
