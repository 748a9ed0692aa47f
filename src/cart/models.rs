//! Shopping Cart Domain Models
//!
//! This module contains all data structures related to the cart and its
//! checkout lifecycle.

use crate::catalog::models::CatalogItem;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a persisted purchase
pub type PurchaseId = String;

/// View the presentation layer navigates to after checkout
pub const PURCHASE_DETAIL_VIEW: &str = "purchase-detail";

// =============================================================================
// Cart Domain Models
// =============================================================================

/// Returns the default quantity (1) for cart lines
fn default_quantity() -> u32 {
    1
}

/// One entry of the cart: an item snapshot and how many of it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// The item as it was in the catalog view when added
    #[serde(flatten)]
    pub item: CatalogItem,

    /// Quantity of this line (defaults to 1)
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl CartLine {
    /// A new line with quantity 1
    pub fn single(item: CatalogItem) -> Self {
        Self {
            item,
            quantity: default_quantity(),
        }
    }

    /// `price × quantity`, absent price counting as zero
    pub fn subtotal(&self) -> f64 {
        self.item.unit_price() * f64::from(self.quantity)
    }
}

/// Checkout lifecycle of a cart
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum CheckoutPhase {
    /// Not checking out; the cart may be edited
    #[default]
    Idle,
    /// A purchase request is in flight
    CheckingOut,
}

/// Result of a successful checkout, consumed to drive navigation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    /// Identifier of the new purchase
    pub purchase_id: PurchaseId,

    /// View to navigate to
    pub target_view: String,
}

impl CheckoutReceipt {
    pub fn new(purchase_id: PurchaseId) -> Self {
        Self {
            purchase_id,
            target_view: PURCHASE_DETAIL_VIEW.to_string(),
        }
    }
}

/// Input for the add-to-cart endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartInput {
    /// Identifier of an item in the current catalog view
    pub item_id: String,
}

/// Response for cart mutations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    /// Status of the operation
    pub status: String,

    /// Lines after the operation
    pub lines: Vec<CartLine>,

    /// Sum of all line subtotals
    pub total: f64,
}
