//! Item creation with best-effort image enrichment

use super::models::{ItemId, NewItem};
use crate::error::{Result, ToolError};
use crate::ports::{CatalogPort, ImagePort};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome of a successful creation
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedItem {
    pub id: ItemId,
    pub name: String,
    pub image_url: Option<String>,
}

/// Submits new items to the catalog port, one at a time
pub struct ItemCreator {
    catalog: Arc<dyn CatalogPort>,
    images: Arc<dyn ImagePort>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the submission ends, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ItemCreator {
    pub fn new(catalog: Arc<dyn CatalogPort>, images: Arc<dyn ImagePort>) -> Self {
        Self {
            catalog,
            images,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Looks up an image for the item name, then creates the item.
    ///
    /// A failed image lookup only drops the image; a failed creation is a
    /// [`ToolError::Mutation`].
    pub async fn submit(&self, mut fields: NewItem) -> Result<CreatedItem> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ToolError::CreationInProgress);
        }
        let _guard = InFlight(&self.in_flight);

        fields.image_url = None;
        if !fields.name.is_empty() {
            match self.enrich(&fields.name).await {
                Ok(url) => fields.image_url = Some(url),
                Err(e) => warn!(item = %fields.name, error = %e, "Creating item without image"),
            }
        }

        let name = fields.name.clone();
        let image_url = fields.image_url.clone();
        let id = self.catalog.create_item(fields).await.map_err(|e| {
            error!(item = %name, error = %e, "Item creation failed");
            ToolError::mutation("create item", e)
        })?;

        info!(item_id = %id, item = %name, has_image = image_url.is_some(), "Item created");
        Ok(CreatedItem {
            id,
            name,
            image_url,
        })
    }

    async fn enrich(&self, name: &str) -> Result<String> {
        self.images
            .resolve_image_url(name)
            .await
            .map_err(ToolError::Enrichment)
    }
}
