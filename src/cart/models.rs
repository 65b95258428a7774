//! Shopping Cart Domain Models
//!
//! This module contains all data structures related to the shopping cart
//! business domain.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::MenuItem;

// =============================================================================
// Cart Domain Models
// =============================================================================

/// A menu item in the cart together with how many were requested
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Item fields as they were when the item was added
    #[serde(flatten)]
    pub item: MenuItem,

    /// Always at least 1; a line reaching 0 is removed
    pub quantity: u32,
}

impl CartLine {
    pub(crate) fn new(item: &MenuItem) -> Self {
        Self {
            item: item.clone(),
            quantity: 1,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item.id
    }

    /// Price multiplied by quantity. Saturates at `Decimal::MAX` instead of
    /// overflowing.
    pub fn subtotal(&self) -> Decimal {
        self.item.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Outcome of a checkout.
///
/// `Pending` is reserved for a real payment gateway and is never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

/// Immutable record of a checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Time-ordered identifier
    pub id: String,

    /// Lines as they were at purchase time
    pub items: Vec<CartLine>,

    /// Sum of line subtotals, fixed when the record is created
    pub total: Decimal,

    pub created_at: Timestamp,

    pub status: TransactionStatus,
}

impl Transaction {
    pub(crate) fn record(items: Vec<CartLine>, status: TransactionStatus) -> Self {
        let total = sum_subtotals(&items);

        Self {
            id: Uuid::now_v7().simple().to_string(),
            items,
            total,
            created_at: Timestamp::now(),
            status,
        }
    }
}

/// Sum of line subtotals, saturating at `Decimal::MAX`.
pub(crate) fn sum_subtotals(lines: &[CartLine]) -> Decimal {
    lines
        .iter()
        .map(CartLine::subtotal)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

// =============================================================================
// Request / Response Payloads
// =============================================================================

/// Input for adding a catalog item to a cart
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemInput {
    /// Catalog identifier of the item to add
    pub item_id: String,
}

/// Input for changing a line's quantity
#[derive(Debug, Deserialize)]
pub struct SetQuantityInput {
    /// Zero or less removes the line
    pub quantity: i64,
}

/// Current contents of a cart
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart_id: String,
    pub items: Vec<CartLine>,
    pub total: Decimal,
    pub item_count: u64,

    /// Whether a checkout is in flight
    pub processing: bool,
}

/// Response for cart creation
#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    /// Status of the operation
    pub status: String,

    /// Cart identifier
    #[serde(rename = "cartId")]
    pub cart_id: String,
}
