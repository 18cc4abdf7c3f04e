//! Command-line driver for the search component.
//!
//! Builds a request from the command line, runs it through the dispatcher
//! and prints the rendered response.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use callsite::logging::LoggingBuilder;
use callsite::{ConfigLoader, Dispatcher, RequestContext};
use clap::Parser;
use search_example::{corpus, registry, Search};
use tracing::debug;

/// Dispatch a request to the search component
#[derive(Parser, Debug)]
#[command(name = "search-demo")]
#[command(version)]
#[command(about = "Dispatch a request to the search component and print the response")]
struct Cli {
    /// Component to dispatch to
    component: String,

    /// Method to invoke
    method: String,

    /// Route value, e.g. `--route query=~` (repeatable)
    #[arg(short, long = "route", value_parser = parse_pair)]
    routes: Vec<(String, String)>,

    /// Query string value, e.g. `--query type=rss` (repeatable)
    #[arg(short, long = "query", value_parser = parse_pair)]
    queries: Vec<(String, String)>,

    /// Per-request item, e.g. `--item apiKey=k1` (repeatable)
    #[arg(short, long = "item", value_parser = parse_pair)]
    items: Vec<(String, String)>,

    /// JSON corpus to search instead of the built-in one
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Configuration file (defaults to ./callsite.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analyze at most this many documents under the `sample` optimization
    #[arg(long, default_value_t = 100)]
    sample_size: usize,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print the content type before the body
    #[arg(long)]
    show_content_type: bool,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("expected key=value, got \"{s}\"")),
    }
}

fn build_dispatcher(cli: &Cli) -> anyhow::Result<Dispatcher> {
    let docs = match &cli.corpus {
        Some(path) => corpus::load(path)
            .with_context(|| format!("loading corpus from {}", path.display()))?,
        None => corpus::sample(),
    };
    debug!(documents = docs.len(), "corpus ready");

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.file(path);
    }
    let config = loader.load()?;

    Ok(Dispatcher::builder()
        .components(registry(Search::new(docs).sample_size(cli.sample_size))?)
        .config(config)
        .build())
}

fn build_request(cli: &Cli) -> RequestContext {
    let mut builder = RequestContext::builder()
        .route("componentName", cli.component.as_str())
        .route("methodName", cli.method.as_str());
    for (k, v) in &cli.routes {
        builder = builder.route(k.as_str(), v.as_str());
    }
    for (k, v) in &cli.queries {
        builder = builder.query(k.as_str(), v.as_str());
    }
    for (k, v) in &cli.items {
        builder = builder.item(k.as_str(), v.as_str());
    }
    builder.build()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    LoggingBuilder::new().level(cli.log_level.as_str()).init();

    let dispatcher = match build_dispatcher(&cli) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(2);
        }
    };

    match dispatcher.dispatch(&build_request(&cli)) {
        Ok(response) => {
            if cli.show_content_type {
                println!("Content-Type: {}\n", response.content_type);
            }
            println!("{}", response.body);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error ({}): {e}", e.status_code());
            ExitCode::FAILURE
        }
    }
}
