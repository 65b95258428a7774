//! Routing module for the coffee shop application

use axum::{body::Body, extract::Request, middleware::Next, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::state::SharedState;

/// Creates and configures the application router with all routes and middleware
pub fn create_app_router(state: SharedState) -> Router {
    // Middleware: Log requests
    let log_layer = axum::middleware::from_fn(|req: Request<Body>, next: Next| async move {
        let method = req.method().clone();
        let uri = req.uri().clone();
        info!(%method, %uri, "request");

        let res = next.run(req).await;
        if !res.status().is_success() {
            warn!(%method, %uri, status = res.status().as_u16(), "request failed");
        }
        res
    });

    // Middleware: CORS (Permissive for the storefront and admin panel)
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes
    Router::new()
        .route("/healthz", get(healthcheck))
        .merge(crate::catalog::routes())
        .merge(crate::cart::routes())
        .layer(log_layer)
        .layer(cors_layer)
        .with_state(state)
}

/// Endpoint: GET /healthz
async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
