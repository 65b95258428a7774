//! Shopping Cart Business Logic Helpers
//!
//! This module contains helper functions for cart identifiers and formatting.

use super::models::CartLine;
use uuid::Uuid;

/// Creates a new random cart identifier.
pub fn new_cart_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Produces a human-readable one-line summary for a list of cart lines.
///
/// Example output: `"2x Latte, 1x Mocha"`.
pub fn format_item_summary(lines: &[CartLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}x {}", line.quantity, line.item.name))
        .collect::<Vec<_>>()
        .join(", ")
}
