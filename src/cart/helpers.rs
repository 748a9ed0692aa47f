//! Shopping Cart Business Logic Helpers
//!
//! This module contains helper functions for cart aggregation and formatting.

use super::models::CartLine;
use crate::catalog::models::ItemId;

/// Sum of `price × quantity` over all lines, absent prices counting as zero
pub fn cart_total(lines: &[CartLine]) -> f64 {
    lines.iter().map(CartLine::subtotal).sum()
}

/// Item identifiers sent to the purchase port, one per line in cart order.
///
/// Lines added twice for the same item are sent twice.
pub fn purchase_item_ids(lines: &[CartLine]) -> Vec<ItemId> {
    lines.iter().map(|l| l.item.id.clone()).collect()
}

/// Produces a human-readable one-line summary for a list of cart lines.
///
/// Example output: `"1x Lamp, 1x Chair"`.
pub fn format_item_summary(lines: &[CartLine]) -> String {
    lines
        .iter()
        .map(|l| format!("{}x {}", l.quantity, l.item.name))
        .collect::<Vec<_>>()
        .join(", ")
}
