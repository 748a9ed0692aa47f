//! Purchase Tool Module
//!
//! The top-level controller composing filters, catalog view, picklists and
//! cart, plus the session store and REST handlers that expose it:
//! - Models (account snapshot, events, views)
//! - The controller itself
//! - Session state
//! - REST API handlers

pub mod controller;
pub mod handlers;
pub mod models;
pub mod state;

// Re-export commonly used types for convenience
pub use controller::PurchaseTool;
pub use handlers::routes;
pub use models::{AccountSnapshot, Notification, NotifyVariant, ToolEvent, ToolView};
pub use state::{AppState, SharedState};
