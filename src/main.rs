//! CarLens - car-shopping backend
//!
//! Serves vehicle profiles assembled from three upstream sources:
//! government safety data, marketplace listings and LLM-generated
//! owner insights.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Startup error (bad arguments, config, bind failure, etc.)

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod profile;
mod providers;
mod server;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use profile::SearchSettings;
use providers::{ChatInsightsProvider, MarketplaceListingsProvider, NhtsaSafetyProvider};
use server::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("CarLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Config file: {:?}", args.config);

    if let Err(e) = run(args).await {
        error!("Server failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .carlens.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", DEFAULT_CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Set listings.api_key and insights.api_key, or use the CARLENS_*_API_KEY env vars.");
    Ok(())
}

/// Initialize logging. `RUST_LOG` wins over the verbosity flags.
fn init_logging(args: &Args) {
    let builder = FmtSubscriber::builder()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let result = match EnvFilter::try_from_default_env() {
        Ok(filter) => tracing::subscriber::set_global_default(builder.with_env_filter(filter).finish()),
        Err(_) => tracing::subscriber::set_global_default(
            builder.with_max_level(args.log_level()).finish(),
        ),
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration, build providers and serve until shutdown.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    if config.listings.api_key.is_none() {
        warn!("No listings API key configured; listings will be empty");
    }
    if config.insights.api_key.is_none() {
        warn!("No insights API key configured; insights will be omitted");
    }

    let state = build_state(&config)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    println!("🚗 CarLens listening on http://{}", addr);
    println!("   Safety:   {}", config.safety.base_url);
    println!("   Listings: {}", config.listings.base_url);
    println!("   Insights: {} ({})", config.insights.base_url, config.insights.model);
    println!("   Fallback radii: {:?}", config.search.fallback_radii);

    server::serve(addr, state)
        .await
        .with_context(|| format!("Failed to serve on {}", addr))?;

    info!("Server shut down cleanly");
    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    let safety = NhtsaSafetyProvider::new(&config.safety).context("Failed to build safety client")?;
    let listings = MarketplaceListingsProvider::new(&config.listings)
        .context("Failed to build listings client")?;
    let insights =
        ChatInsightsProvider::new(&config.insights).context("Failed to build insights client")?;

    Ok(AppState::new(
        Arc::new(safety),
        Arc::new(insights),
        Arc::new(listings),
        SearchSettings::from(&config.search),
    ))
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
