//! Shopping Cart State Machine
//!
//! The cart can be edited only while `Idle`. Checkout is split in two so the
//! caller can release its lock while the purchase request is in flight:
//! [`CartMachine::begin_checkout`] moves to `CheckingOut` and hands out the
//! item ids, [`CartMachine::finish_checkout`] moves back to `Idle`.

use super::helpers::{cart_total, purchase_item_ids};
use super::models::{CartLine, CheckoutPhase};
use crate::catalog::models::{CatalogItem, ItemId};
use crate::error::{Result, ToolError};
use tracing::debug;

// =============================================================================
// Cart State
// =============================================================================

/// Cart contents plus checkout phase
#[derive(Debug, Default)]
pub struct CartMachine {
    /// Lines in insertion order
    lines: Vec<CartLine>,

    phase: CheckoutPhase,
}

impl CartMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total(&self) -> f64 {
        cart_total(&self.lines)
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.phase {
            CheckoutPhase::Idle => Ok(()),
            CheckoutPhase::CheckingOut => Err(ToolError::CheckoutInProgress),
        }
    }

    /// Appends a new line with quantity 1.
    ///
    /// Adding an item that is already in the cart adds a second line.
    pub fn add(&mut self, item: CatalogItem) -> Result<usize> {
        self.ensure_idle()?;
        self.lines.push(CartLine::single(item));
        Ok(self.lines.len())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.lines.clear();
        Ok(())
    }

    /// Enters `CheckingOut` and returns the ids to purchase.
    ///
    /// Returns `Ok(None)` without changing state when the cart is empty.
    pub fn begin_checkout(&mut self) -> Result<Option<Vec<ItemId>>> {
        self.ensure_idle()?;
        if self.lines.is_empty() {
            debug!("Checkout requested on empty cart");
            return Ok(None);
        }
        self.phase = CheckoutPhase::CheckingOut;
        Ok(Some(purchase_item_ids(&self.lines)))
    }

    /// Returns to `Idle`, emptying the cart only if the purchase succeeded
    pub fn finish_checkout(&mut self, succeeded: bool) {
        if succeeded {
            self.lines.clear();
        }
        self.phase = CheckoutPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: Option<f64>) -> CatalogItem {
        CatalogItem {
            id: id.into(),
            name: id.to_uppercase(),
            price,
            item_type: String::new(),
            family: String::new(),
            description: None,
            image_url: None,
        }
    }

    #[test]
    fn repeated_add_appends_lines() {
        let mut cart = CartMachine::new();
        cart.add(item("a", Some(1.0))).unwrap();
        assert_eq!(cart.add(item("a", Some(1.0))).unwrap(), 2);
        assert!(cart.lines().iter().all(|l| l.quantity == 1));
        assert_eq!(cart.total(), 2.0);
    }

    #[test]
    fn empty_cart_checkout_is_noop() {
        let mut cart = CartMachine::new();
        assert_eq!(cart.begin_checkout().unwrap(), None);
        assert_eq!(cart.phase(), CheckoutPhase::Idle);
    }

    #[test]
    fn cart_is_locked_while_checking_out() {
        let mut cart = CartMachine::new();
        cart.add(item("a", None)).unwrap();
        assert_eq!(cart.begin_checkout().unwrap(), Some(vec!["a".to_string()]));
        assert_eq!(cart.phase(), CheckoutPhase::CheckingOut);

        assert_eq!(cart.add(item("b", None)), Err(ToolError::CheckoutInProgress));
        assert_eq!(cart.clear(), Err(ToolError::CheckoutInProgress));
        assert_eq!(cart.begin_checkout(), Err(ToolError::CheckoutInProgress));
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn successful_checkout_empties_cart() {
        let mut cart = CartMachine::new();
        cart.add(item("a", None)).unwrap();
        cart.begin_checkout().unwrap();
        cart.finish_checkout(true);
        assert!(cart.is_empty());
        assert_eq!(cart.phase(), CheckoutPhase::Idle);
    }

    #[test]
    fn failed_checkout_keeps_lines() {
        let mut cart = CartMachine::new();
        cart.add(item("a", Some(3.0))).unwrap();
        cart.add(item("b", None)).unwrap();
        let before = cart.lines().to_vec();
        cart.begin_checkout().unwrap();
        cart.finish_checkout(false);
        assert_eq!(cart.lines(), before.as_slice());
        assert_eq!(cart.phase(), CheckoutPhase::Idle);
    }
}
