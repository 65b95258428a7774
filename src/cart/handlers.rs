//! REST API handlers for shopping cart operations
//!
//! This module implements HTTP endpoints for cart editing, checkout and
//! transaction history.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use tracing::info;

use super::{helpers::*, models::*, state::CartEngine};
use crate::{error::ApiError, state::SharedState};

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/cart", post(create_cart))
        .route("/api/cart/:cart_id", get(get_cart))
        .route("/api/cart/:cart_id/items", post(add_item))
        .route(
            "/api/cart/:cart_id/items/:item_id",
            put(set_quantity).delete(remove_item),
        )
        .route("/api/cart/:cart_id/checkout", post(checkout))
        .route("/api/cart/:cart_id/transactions", get(transactions))
}

fn view(cart_id: String, engine: Option<&CartEngine>) -> CartView {
    let Some(engine) = engine else {
        return CartView {
            cart_id,
            items: Vec::new(),
            total: Decimal::ZERO,
            item_count: 0,
            processing: false,
        };
    };

    let cart = engine.snapshot();
    CartView {
        cart_id,
        total: cart.total(),
        item_count: cart.item_count(),
        items: cart.lines().to_vec(),
        processing: engine.is_processing(),
    }
}

/// Endpoint: POST /api/cart
/// Hands out a fresh cart identifier.
async fn create_cart() -> Json<SyncResponse> {
    Json(SyncResponse {
        status: "created".to_string(),
        cart_id: new_cart_id(),
    })
}

/// Endpoint: GET /api/cart/:cart_id
async fn get_cart(
    State(state): State<SharedState>,
    Path(cart_id): Path<String>,
) -> Json<CartView> {
    let engine = state.existing_cart(&cart_id);

    Json(view(cart_id, engine.as_deref()))
}

/// Endpoint: POST /api/cart/:cart_id/items
/// Copies the catalog item into the cart, or bumps its quantity.
async fn add_item(
    State(state): State<SharedState>,
    Path(cart_id): Path<String>,
    body: Result<Json<AddItemInput>, JsonRejection>,
) -> Result<Json<CartView>, ApiError> {
    let Json(input) = body?;
    let item = state.catalog.get_item(&input.item_id).await?;

    let engine = state.add_to_cart(&cart_id, &item);

    Ok(Json(view(cart_id, Some(&engine))))
}

/// Endpoint: PUT /api/cart/:cart_id/items/:item_id
async fn set_quantity(
    State(state): State<SharedState>,
    Path((cart_id, item_id)): Path<(String, String)>,
    body: Result<Json<SetQuantityInput>, JsonRejection>,
) -> Result<Json<CartView>, ApiError> {
    let Json(input) = body?;

    let engine = state.existing_cart(&cart_id);
    if let Some(engine) = &engine {
        engine.set_quantity(&item_id, input.quantity)?;
        state.release_if_idle(&cart_id);
    }

    Ok(Json(view(cart_id, engine.as_deref())))
}

/// Endpoint: DELETE /api/cart/:cart_id/items/:item_id
async fn remove_item(
    State(state): State<SharedState>,
    Path((cart_id, item_id)): Path<(String, String)>,
) -> Json<CartView> {
    let engine = state.existing_cart(&cart_id);
    if let Some(engine) = &engine {
        engine.remove_item(&item_id);
        state.release_if_idle(&cart_id);
    }

    Json(view(cart_id, engine.as_deref()))
}

/// Endpoint: POST /api/cart/:cart_id/checkout
/// Processes checkout from the cart
async fn checkout(
    State(state): State<SharedState>,
    Path(cart_id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(engine) = state.existing_cart(&cart_id) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    match engine.checkout().await? {
        Some(transaction) => {
            info!(
                %cart_id,
                transaction = %transaction.id,
                status = ?transaction.status,
                "checkout finished"
            );
            Ok(Json(transaction).into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Endpoint: GET /api/cart/:cart_id/transactions
async fn transactions(
    State(state): State<SharedState>,
    Path(cart_id): Path<String>,
) -> Json<Vec<Transaction>> {
    Json(
        state
            .existing_cart(&cart_id)
            .map(|engine| engine.transactions())
            .unwrap_or_default(),
    )
}
