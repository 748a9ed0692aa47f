//! Purchase Tool Library
//!
//! This library provides the state engine behind an item purchasing widget
//! embedded in an account page: filtered catalog browsing, item creation
//! with image enrichment, and a cart that checks out into a purchase.

// Domain modules
pub mod cart;
pub mod catalog;
pub mod tool;

// Collaborators
pub mod ports;
pub mod sandbox;
pub mod unsplash;

// Infrastructure
pub mod config;
pub mod error;
pub mod router;

pub use error::{PortError, Result, ToolError};
