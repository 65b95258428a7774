use std::process::ExitCode;

use coffee_shop_rust::{config::ServerConfig, logging, serve};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing STORE_URL ends the process here with clap's usage error
    let config = ServerConfig::load().unwrap_or_else(|e| e.exit());

    if let Err(e) = logging::init(&config) {
        eprintln!("failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
