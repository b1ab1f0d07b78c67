use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use architect_core::api::HttpArchitectApi;
use architect_core::{mcp, Config, ToolRegistry};

#[derive(Parser, Debug)]
#[command(name = "architectgbt-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "ArchitectGBT MCP server - AI model recommendations over stdio")]
struct Args {
    /// Service base URL (overrides ARCHITECTGBT_API_URL)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Default number of models returned by list_models
    #[arg(long, value_name = "N")]
    list_limit: Option<usize>,

    /// Total timeout for each outbound request
    #[arg(long, value_name = "SECONDS")]
    timeout_secs: Option<u64>,

    /// Only serve code templates when an API key is configured
    #[arg(long)]
    templates_require_key: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(limit) = self.list_limit {
            config.default_list_limit = limit;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }
        config.templates_require_key |= self.templates_require_key;
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing(&args)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    let config = Arc::new(args.config());

    info!(
        "Server startup: api_url={}, api_key={}, list_limit={}, timeout={:?}, templates_require_key={}",
        config.base_url(),
        if config.has_api_key() { "set" } else { "unset" },
        config.default_list_limit,
        config.request_timeout,
        config.templates_require_key
    );

    let api = Arc::new(HttpArchitectApi::new(config.clone())?);
    let registry = Arc::new(ToolRegistry::with_defaults(config, api));

    mcp::run(registry, tokio::io::stdin(), tokio::io::stdout()).await
}

/// Stdout carries protocol traffic, so logs go to stderr or a file.
fn setup_tracing(args: &Args) -> Result<()> {
    use tracing_subscriber::fmt;

    let writer = match &args.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log_level))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    info!("Tracing initialized, log_file={:?}", args.log_file);
    Ok(())
}
