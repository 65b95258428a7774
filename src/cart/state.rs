//! Shopping Cart State Management
//!
//! This module holds the cart state machine: the ordered lines of a single
//! cart, and the engine that guards its checkout so that one cart can never
//! produce two transactions from the same selection.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{
    helpers::format_item_summary,
    models::{sum_subtotals, CartLine, Transaction, TransactionStatus},
};
use crate::catalog::MenuItem;

/// Largest quantity a single cart line may hold.
pub const MAX_QUANTITY: u32 = 10_000;

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity {requested} exceeds the limit of {max}")]
    QuantityTooLarge { requested: i64, max: u32 },
}

/// The shopper's uncommitted selection, one line per menu item, in the order
/// items were first added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Bumps the item's line by one, or appends a new line for it. A line
    /// already at [`MAX_QUANTITY`] stays there.
    pub fn add_item(&mut self, item: &MenuItem) {
        if let Some(line) = self.line_mut(&item.id) {
            line.quantity = line.quantity.saturating_add(1).min(MAX_QUANTITY);
        } else {
            self.lines.push(CartLine::new(item));
        }
    }

    pub fn remove_item(&mut self, item_id: &str) {
        self.lines.retain(|line| line.item_id() != item_id);
    }

    /// Sets a line's quantity. Zero or less removes the line; unknown ids
    /// are ignored.
    pub fn set_quantity(&mut self, item_id: &str, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_item(item_id);
            return Ok(());
        }

        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_QUANTITY)
            .ok_or(CartError::QuantityTooLarge {
                requested: quantity,
                max: MAX_QUANTITY,
            })?;

        if let Some(line) = self.line_mut(item_id) {
            line.quantity = quantity;
        }

        Ok(())
    }

    pub fn total(&self) -> Decimal {
        sum_subtotals(&self.lines)
    }

    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// e.g. `"2x Latte, 1x Mocha"`
    pub fn summary(&self) -> String {
        format_item_summary(&self.lines)
    }

    fn line_mut(&mut self, item_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.item_id() == item_id)
    }

    fn take_lines(&mut self) -> Vec<CartLine> {
        std::mem::take(&mut self.lines)
    }
}

// =============================================================================
// Checkout Processing
// =============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("a checkout is already in progress for this cart")]
    InProgress,
}

#[derive(Debug, Error)]
#[error("payment declined: {0}")]
pub struct PaymentDeclined(pub String);

/// Decides how long a checkout takes and whether it goes through.
#[async_trait]
pub trait CheckoutProcessor: Send + Sync {
    async fn process(&self) -> Result<(), PaymentDeclined>;
}

/// Stand-in for a payment gateway: waits for a fixed delay, then approves.
#[derive(Debug, Clone)]
pub struct SimulatedProcessor {
    delay: Duration,
}

impl SimulatedProcessor {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl CheckoutProcessor for SimulatedProcessor {
    async fn process(&self) -> Result<(), PaymentDeclined> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Holds the processing flag for the life of one checkout.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl<'a> ProcessingGuard<'a> {
    fn claim(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// Cart Engine
// =============================================================================

/// A cart plus its checkout machinery and transaction history.
///
/// Cart locks are never held across an await, so reads and mutations stay
/// responsive while a checkout is being processed.
pub struct CartEngine {
    cart: Mutex<Cart>,
    processing: AtomicBool,
    transactions: Mutex<Vec<Transaction>>,
    processor: Arc<dyn CheckoutProcessor>,
}

impl CartEngine {
    pub fn new(processor: Arc<dyn CheckoutProcessor>) -> Self {
        Self {
            cart: Mutex::new(Cart::new()),
            processing: AtomicBool::new(false),
            transactions: Mutex::new(Vec::new()),
            processor,
        }
    }

    fn cart(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn history(&self) -> MutexGuard<'_, Vec<Transaction>> {
        self.transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_item(&self, item: &MenuItem) {
        self.cart().add_item(item);
    }

    pub fn remove_item(&self, item_id: &str) {
        self.cart().remove_item(item_id);
    }

    pub fn set_quantity(&self, item_id: &str, quantity: i64) -> Result<(), CartError> {
        self.cart().set_quantity(item_id, quantity)
    }

    pub fn total(&self) -> Decimal {
        self.cart().total()
    }

    pub fn item_count(&self) -> u64 {
        self.cart().item_count()
    }

    /// Copy of the current cart
    pub fn snapshot(&self) -> Cart {
        self.cart().clone()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// True when the engine holds nothing worth keeping: no lines, no
    /// history and no checkout in flight.
    pub fn is_idle(&self) -> bool {
        !self.is_processing() && self.cart().is_empty() && self.history().is_empty()
    }

    /// Transactions recorded for this cart, oldest first
    pub fn transactions(&self) -> Vec<Transaction> {
        self.history().clone()
    }

    /// Converts the cart into a transaction.
    ///
    /// The processor runs first. The lines are captured once it returns, so
    /// edits made while it runs are part of the transaction. On approval the
    /// cart is emptied and a `completed` transaction is returned. On decline
    /// the cart is left as it was and a `failed` transaction is returned. A
    /// cart that is empty at either point yields `None`.
    ///
    /// Only one checkout per engine runs at a time; a concurrent call fails
    /// with [`CheckoutError::InProgress`]. Dropping the returned future
    /// releases the flag without touching the cart.
    pub async fn checkout(&self) -> Result<Option<Transaction>, CheckoutError> {
        let _guard = ProcessingGuard::claim(&self.processing).ok_or(CheckoutError::InProgress)?;

        if self.cart().is_empty() {
            return Ok(None);
        }

        let outcome = self.processor.process().await;

        let (lines, status) = {
            let mut cart = self.cart();
            match &outcome {
                Ok(()) => (cart.take_lines(), TransactionStatus::Completed),
                Err(_) => (cart.lines().to_vec(), TransactionStatus::Failed),
            }
        };
        if lines.is_empty() {
            debug!("cart emptied while checkout was processing");
            return Ok(None);
        }

        let transaction = Transaction::record(lines, status);
        let summary = format_item_summary(&transaction.items);
        match outcome {
            Ok(()) => info!(total = %transaction.total, items = %summary, "checkout completed"),
            Err(declined) => warn!(
                total = %transaction.total,
                items = %summary,
                "checkout failed: {declined}"
            ),
        }

        self.history().push(transaction.clone());

        Ok(Some(transaction))
    }
}
