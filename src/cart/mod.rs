//! Shopping Cart Domain Module
//!
//! This module contains all shopping cart business logic, including:
//! - Domain models (CartLine, checkout phase and receipt, inputs, responses)
//! - Business logic helpers (totals, purchase ids, formatting)
//! - The cart state machine
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use models::{CartLine, CheckoutPhase, CheckoutReceipt, PurchaseId};
pub use state::CartMachine;
