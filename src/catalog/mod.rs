//! Catalog Domain Module
//!
//! This module contains everything needed to browse the item catalog:
//! - Domain models (CatalogItem, NewItem, picklist options)
//! - Filter criteria and the query key derived from them
//! - Dependent picklist resolution
//! - The catalog view with stale-result protection
//! - Item creation with image enrichment

pub mod creation;
pub mod filter;
pub mod models;
pub mod picklist;
pub mod view;

// Re-export commonly used types for convenience
pub use creation::{CreatedItem, ItemCreator};
pub use filter::{FilterCriteria, FilterField, FilterUpdate, QueryKey};
pub use models::{CatalogItem, ItemId, NewItem, PicklistOption};
pub use picklist::{PicklistResolver, PicklistSets, PicklistStage};
pub use view::{CatalogView, FetchOutcome, FetchTicket};
