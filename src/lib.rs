//! Coffee Shop Library
//!
//! This library provides the menu catalog service and the shopping cart
//! engine behind the coffee shop storefront and its admin panel.

use std::{io, sync::Arc};

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

// Domain modules
pub mod cart;
pub mod catalog;
pub mod store;

// Infrastructure
pub mod config;
pub mod error;
pub mod logging;
pub mod router;
pub mod shutdown;
pub mod state;

use config::ServerConfig;
use router::create_app_router;
use state::AppState;
use store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid store configuration: {0}")]
    Store(#[from] StoreError),

    #[error("server I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Binds the configured address and serves the API until a shutdown signal
/// arrives.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = create_app_router(state);

    let address = config.socket_addr();
    let listener = TcpListener::bind(&address).await?;
    info!("server running on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await?;

    info!("server stopped");
    Ok(())
}
