//! HTTP error mapping
//!
//! Every handler failure funnels through [`ApiError`], which picks the status
//! code and renders `{"error": "..."}`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::{
    cart::state::{CartError, CheckoutError},
    catalog::errors::CatalogError,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedPayload(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::MalformedPayload(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedPayload(_)
            | Self::Catalog(CatalogError::Validation(_))
            | Self::Cart(CartError::QuantityTooLarge { .. }) => StatusCode::BAD_REQUEST,
            Self::Catalog(CatalogError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Catalog(CatalogError::StoreUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Checkout(CheckoutError::InProgress) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            Self::Catalog(CatalogError::StoreUnavailable(source)) => {
                error!("store failure: {source}");
                "store unavailable".to_string()
            }
            other => {
                warn!(status = status.as_u16(), "request rejected: {other}");
                other.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
