//! External collaborators the purchase tool depends on
//!
//! The controller only knows these signatures. [`crate::sandbox`] provides an
//! in-memory implementation of all of them and [`crate::unsplash`] a real
//! image lookup.

use crate::cart::models::PurchaseId;
use crate::catalog::models::{CatalogItem, ItemId, NewItem, ObjectMetadata, PicklistOption};
use crate::error::PortError;
use crate::tool::models::AccountSnapshot;
use async_trait::async_trait;
use std::sync::Arc;

/// Result type returned by every port
pub type PortResult<T> = std::result::Result<T, PortError>;

/// Reads the parent account record
#[async_trait]
pub trait AccountPort: Send + Sync {
    async fn fetch_account(&self, account_id: &str) -> PortResult<AccountSnapshot>;
}

/// Answers whether the current operator is a manager
#[async_trait]
pub trait PermissionPort: Send + Sync {
    async fn fetch_is_manager(&self) -> PortResult<bool>;
}

/// Catalog queries and item creation
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Empty arguments mean "no constraint" on that dimension.
    async fn query_items(
        &self,
        family: &str,
        item_type: &str,
        search_text: &str,
    ) -> PortResult<Vec<CatalogItem>>;

    async fn create_item(&self, fields: NewItem) -> PortResult<ItemId>;
}

/// Resolves a stock image URL for an item name
#[async_trait]
pub trait ImagePort: Send + Sync {
    async fn resolve_image_url(&self, item_name: &str) -> PortResult<String>;
}

/// Persists a purchase for an account
#[async_trait]
pub trait PurchasePort: Send + Sync {
    async fn create_purchase(&self, account_id: &str, item_ids: &[ItemId])
        -> PortResult<PurchaseId>;
}

/// Entity metadata and picklist values
#[async_trait]
pub trait MetadataPort: Send + Sync {
    async fn fetch_object_metadata(&self, entity: &str) -> PortResult<ObjectMetadata>;

    async fn fetch_picklist_values(
        &self,
        field: &str,
        group_id: &str,
    ) -> PortResult<Vec<PicklistOption>>;
}

/// Handles to every port, shared by all controller instances
#[derive(Clone)]
pub struct Ports {
    pub accounts: Arc<dyn AccountPort>,
    pub permissions: Arc<dyn PermissionPort>,
    pub catalog: Arc<dyn CatalogPort>,
    pub images: Arc<dyn ImagePort>,
    pub purchases: Arc<dyn PurchasePort>,
    pub metadata: Arc<dyn MetadataPort>,
}

impl Ports {
    /// Uses one value that implements every port
    pub fn from_single<T>(backend: Arc<T>) -> Self
    where
        T: AccountPort
            + PermissionPort
            + CatalogPort
            + ImagePort
            + PurchasePort
            + MetadataPort
            + 'static,
    {
        Self {
            accounts: backend.clone(),
            permissions: backend.clone(),
            catalog: backend.clone(),
            images: backend.clone(),
            purchases: backend.clone(),
            metadata: backend,
        }
    }

    /// Replaces the image lookup, keeping every other port
    pub fn with_images(mut self, images: Arc<dyn ImagePort>) -> Self {
        self.images = images;
        self
    }
}
