//! Shopping Cart Domain Module
//!
//! This module contains all shopping cart business logic, including:
//! - Domain models (CartLine, Transaction, inputs, responses)
//! - Business logic helpers (cart ids, formatting)
//! - The cart state machine and its checkout engine
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use models::{CartLine, Transaction, TransactionStatus};
pub use state::{
    Cart, CartEngine, CartError, CheckoutError, CheckoutProcessor, SimulatedProcessor,
    MAX_QUANTITY,
};
