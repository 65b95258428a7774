//! REST API handlers for the menu catalog
//!
//! This module implements the admin CRUD endpoints and the public menu
//! listing.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::models::{Category, MenuItem, MenuItemFields};
use crate::{error::ApiError, state::SharedState};

/// Creates routes for catalog operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/api/menu", get(list_items).post(create_item))
        .route(
            "/api/menu/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

/// Query string for the menu listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Restricts the listing to `hot` or `cold`
    pub category: Option<String>,
}

/// Response for delete operations
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Endpoint: GET /api/menu
async fn list_items(
    State(state): State<SharedState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<MenuItem>>, ApiError> {
    let Query(query) = query?;
    let category = query
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()?;

    Ok(Json(state.catalog.list_items_in(category).await?))
}

/// Endpoint: POST /api/menu
async fn create_item(
    State(state): State<SharedState>,
    body: Result<Json<MenuItemFields>, JsonRejection>,
) -> Result<Json<MenuItem>, ApiError> {
    let Json(fields) = body?;

    Ok(Json(state.catalog.create_item(fields).await?))
}

/// Endpoint: GET /api/menu/:id
async fn get_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MenuItem>, ApiError> {
    Ok(Json(state.catalog.get_item(&id).await?))
}

/// Endpoint: PUT /api/menu/:id
/// Accepts a partial or full item body.
async fn update_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<Json<MenuItemFields>, JsonRejection>,
) -> Result<Json<MenuItem>, ApiError> {
    let Json(fields) = body?;

    Ok(Json(state.catalog.update_item(&id, fields).await?))
}

/// Endpoint: DELETE /api/menu/:id
async fn delete_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.catalog.delete_item(&id).await?;

    Ok(Json(DeleteResponse {
        message: "Deleted successfully".to_string(),
    }))
}
