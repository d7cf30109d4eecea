mod api;
mod check_config_cmd;
mod config;
mod fetch;
mod service;
mod terminal_output;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use pinpoint_config::PinpointConfig;
use pinpoint_logging::{init_logger, LogFormat};

use api::AppState;
use config::Config;
use fetch::HttpFetcher;
use service::{LocateRequest, LocateService};

#[derive(Parser)]
#[command(name = "pinpoint")]
#[command(about = "Pinpoint — find page elements from plain-language instructions")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $PINPOINT_CONFIG or ~/.pinpoint/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank elements of a document for a query
    Locate {
        /// HTML file to search
        #[arg(long, conflicts_with = "url", required_unless_present = "url")]
        html: Option<PathBuf>,
        /// Page to fetch (served markup only)
        #[arg(long)]
        url: Option<String>,
        /// Instruction, e.g. "click Edit in row #A-1042"
        #[arg(short, long)]
        query: String,
        /// Container phrase to scope the search
        #[arg(long)]
        container: Option<String>,
        /// Number of candidates to build selectors for
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// Start the HTTP API server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Validate the config file
    CheckConfig {
        /// Write a config file with every default filled in, if none exists
        #[arg(long)]
        write_defaults: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(path) = cli.config {
        config.config_path = path;
    }

    match cli.command {
        Commands::CheckConfig { write_defaults } => {
            init_logger("warn", LogFormat::Pretty, None);
            check_config_cmd::run(&config.config_path, write_defaults).await
        }
        Commands::Locate {
            html,
            url,
            query,
            container,
            limit,
            format,
        } => {
            let settings = load_settings(&config).await?;
            init_logging(&config, &settings, "warn");
            let html = match html {
                Some(path) => Some(read_html(&path).await?),
                None => None,
            };
            let request = LocateRequest {
                url,
                html,
                query,
                container_hint: container,
                limit,
                ..Default::default()
            };
            run_locate(&settings, request, format).await
        }
        Commands::Serve { port } => {
            let settings = load_settings(&config).await?;
            init_logging(&config, &settings, &settings.log_level());
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config, settings).await
        }
    }
}

async fn load_settings(config: &Config) -> Result<PinpointConfig> {
    pinpoint_config::load_and_prepare(&config.config_path)
        .await
        .with_context(|| format!("Failed to load config from {}", config.config_path.display()))
}

fn init_logging(config: &Config, settings: &PinpointConfig, default_level: &str) {
    let level = config.log_level.as_deref().unwrap_or(default_level);
    let format = if config.json_logs { LogFormat::Json } else { LogFormat::Pretty };
    let dir = settings.log_dir().map(PathBuf::from);
    init_logger(level, format, dir.as_deref());
}

async fn read_html(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read HTML file: {}", path.display()))
}

async fn run_locate(settings: &PinpointConfig, request: LocateRequest, format: OutputFormat) -> Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(settings)?);
    let service = LocateService::new(settings, fetcher);
    let request_id = uuid::Uuid::new_v4().to_string();

    let result = match service.locate(&request_id, request).await {
        Ok(result) => result,
        Err(e) => {
            terminal_output::note_error(&e.to_string());
            return Err(e.into());
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Table => print!("{}", terminal_output::render_result(&result)),
    }
    Ok(())
}

async fn run_server(config: Config, settings: PinpointConfig) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        config = %config.config_path.display(),
        "Starting Pinpoint server"
    );

    let fetcher = Arc::new(HttpFetcher::new(&settings)?);
    let app_state = Arc::new(AppState {
        service: LocateService::new(&settings, fetcher),
        started_at: Utc::now(),
    });

    let app = api::build_router(app_state)
        .layer(TimeoutLayer::new(Duration::from_secs(settings.request_timeout_secs())))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    let addr = format!("{}:{}", config.bind_address, config.port);

    info!(addr = %addr, "HTTP API listening");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
