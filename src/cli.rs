//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and environment fallbacks.

use clap::Parser;
use std::path::PathBuf;

/// CarLens - car-shopping backend
///
/// Serves vehicle profiles that combine government safety data,
/// live marketplace listings and generated owner insights.
///
/// Examples:
///   carlens
///   carlens --port 8080 --config ./carlens.toml
///   CARLENS_LISTINGS_API_KEY=... carlens --verbose
///   carlens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .carlens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, value_name = "HOST", env = "CARLENS_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_name = "PORT", env = "CARLENS_PORT")]
    pub port: Option<u16>,

    /// Marketplace listings API key
    #[arg(long, value_name = "KEY", env = "CARLENS_LISTINGS_API_KEY", hide_env_values = true)]
    pub listings_api_key: Option<String>,

    /// Marketplace listings API base URL
    #[arg(long, value_name = "URL", env = "CARLENS_LISTINGS_URL")]
    pub listings_url: Option<String>,

    /// Chat-completion API key used for owner insights
    #[arg(long, value_name = "KEY", env = "CARLENS_INSIGHTS_API_KEY", hide_env_values = true)]
    pub insights_api_key: Option<String>,

    /// Chat-completion API base URL (OpenAI-compatible)
    #[arg(long, value_name = "URL", env = "CARLENS_INSIGHTS_URL")]
    pub insights_url: Option<String>,

    /// Model used for owner insights
    #[arg(short, long, value_name = "MODEL", env = "CARLENS_MODEL")]
    pub model: Option<String>,

    /// Per-request upstream timeout in seconds (applies to all providers)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .carlens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        for url in [&self.listings_url, &self.insights_url].into_iter().flatten() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("URL must start with 'http://' or 'https://': {}", url));
            }
        }

        if self.port == Some(0) {
            return Err("Port must be non-zero".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
