//! Server configuration
//!
//! Read from command-line flags, falling back to environment variables (and a
//! `.env` file when present).

use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Compact,
    /// Structured JSON lines
    Json,
}

/// Coffee shop API server configuration
#[derive(Debug, Parser)]
#[command(name = "coffee-shop", about = "Coffee shop menu and cart API", long_about = None)]
pub struct ServerConfig {
    /// Server host address
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "SERVER_PORT", default_value = "8000")]
    pub port: u16,

    /// Document store connection string, e.g. `redis://127.0.0.1:6379/0`
    /// or `memory://`
    #[arg(long, env = "STORE_URL")]
    pub store_url: String,

    /// Upper bound for a single store call, in milliseconds
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value = "5000")]
    pub store_timeout_ms: u64,

    /// Simulated payment latency at checkout, in milliseconds
    #[arg(long, env = "CHECKOUT_DELAY_MS", default_value = "2000")]
    pub checkout_delay_ms: u64,

    /// Default log level when `RUST_LOG` is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn checkout_delay(&self) -> Duration {
        Duration::from_millis(self.checkout_delay_ms)
    }
}
