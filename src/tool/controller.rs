//! Purchase tool controller
//!
//! One controller per activated account page. It owns the account and
//! permission snapshots, the filter criteria and the cart, and delegates to
//! the catalog view, picklist resolver and item creator.

use super::models::{
    AccountDisplay, AccountSnapshot, CartView, Notification, ToolEvent, ToolView,
};
use crate::cart::helpers::format_item_summary;
use crate::cart::models::{CartLine, CheckoutPhase, CheckoutReceipt};
use crate::cart::state::CartMachine;
use crate::catalog::creation::{CreatedItem, ItemCreator};
use crate::catalog::filter::{FilterCriteria, FilterField, FilterUpdate};
use crate::catalog::models::{CatalogItem, NewItem};
use crate::catalog::picklist::{PicklistResolver, PicklistSets, PicklistStage};
use crate::catalog::view::{CatalogView, FetchOutcome};
use crate::error::{Result, ToolError};
use crate::ports::{Ports, PurchasePort};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Buffered events per subscriber before old ones are dropped
const EVENT_CAPACITY: usize = 64;

/// Controller behind one purchase tool instance
pub struct PurchaseTool {
    account_id: String,
    account: Option<AccountSnapshot>,
    is_manager: bool,
    filters: Mutex<FilterCriteria>,
    catalog: CatalogView,
    picklists: PicklistResolver,
    creator: ItemCreator,
    cart: Mutex<CartMachine>,
    purchases: Arc<dyn PurchasePort>,
    events: broadcast::Sender<ToolEvent>,
}

/// Returns the cart to `Idle` if a checkout is abandoned mid-flight
struct CheckoutGuard<'a> {
    cart: &'a Mutex<CartMachine>,
    finished: bool,
}

impl CheckoutGuard<'_> {
    fn finish(mut self, succeeded: bool) {
        self.cart.lock().finish_checkout(succeeded);
        self.finished = true;
    }
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Checkout abandoned, cart left untouched");
            self.cart.lock().finish_checkout(false);
        }
    }
}

impl PurchaseTool {
    /// Activates a controller for `account_id`.
    ///
    /// Fetches the account, the manager flag, the picklists and the initial
    /// (unfiltered) catalog. None of these failures is fatal: the controller
    /// comes up with whatever could be loaded.
    pub async fn activate(
        account_id: impl Into<String>,
        ports: &Ports,
        item_entity: &str,
    ) -> Self {
        let account_id = account_id.into();

        let (account, is_manager) = tokio::join!(
            ports.accounts.fetch_account(&account_id),
            ports.permissions.fetch_is_manager(),
        );
        let account = account
            .map_err(|e| warn!(account_id = %account_id, error = %e, "Account fetch failed"))
            .ok();
        let is_manager = is_manager
            .map_err(|e| warn!(error = %e, "Permission check failed, assuming non-manager"))
            .unwrap_or(false);

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let tool = Self {
            account_id,
            account,
            is_manager,
            filters: Mutex::new(FilterCriteria::default()),
            catalog: CatalogView::new(ports.catalog.clone()),
            picklists: PicklistResolver::new(ports.metadata.clone(), item_entity),
            creator: ItemCreator::new(ports.catalog.clone(), ports.images.clone()),
            cart: Mutex::new(CartMachine::new()),
            purchases: ports.purchases.clone(),
            events,
        };

        let ticket = tool.catalog.track(&tool.filters.lock());
        let catalog = &tool.catalog;
        // Failures are logged by the resolver and the view, which keep their defaults.
        let _ = tokio::join!(tool.picklists.resolve(), async move {
            match ticket {
                Some(ticket) => catalog.run(ticket).await,
                None => Ok(FetchOutcome::Unchanged),
            }
        });

        info!(
            account_id = %tool.account_id,
            is_manager = tool.is_manager,
            items = tool.catalog.item_count(),
            "Purchase tool activated"
        );
        tool
    }

    // -------------------------------------------------------------------------
    // Snapshots
    // -------------------------------------------------------------------------

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn account(&self) -> Option<&AccountSnapshot> {
        self.account.as_ref()
    }

    pub fn account_display(&self) -> AccountDisplay {
        AccountDisplay::from_snapshot(self.account.as_ref())
    }

    pub fn is_manager(&self) -> bool {
        self.is_manager
    }

    /// Subscribes to notifications and navigation requests
    pub fn subscribe(&self) -> broadcast::Receiver<ToolEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: ToolEvent) {
        // No subscriber is fine: events are fire-and-forget.
        let _ = self.events.send(event);
    }

    // -------------------------------------------------------------------------
    // Filters and catalog
    // -------------------------------------------------------------------------

    pub fn filters(&self) -> FilterCriteria {
        self.filters.lock().clone()
    }

    pub async fn set_search(&self, text: impl Into<String>) -> Result<FetchOutcome> {
        self.set_filter(FilterField::Search, text).await
    }

    pub async fn set_type(&self, value: impl Into<String>) -> Result<FetchOutcome> {
        self.set_filter(FilterField::Type, value).await
    }

    pub async fn set_family(&self, value: impl Into<String>) -> Result<FetchOutcome> {
        self.set_filter(FilterField::Family, value).await
    }

    /// Replaces one filter and re-queries the catalog if the criteria differ
    /// from the last requested ones
    pub async fn set_filter(
        &self,
        field: FilterField,
        value: impl Into<String>,
    ) -> Result<FetchOutcome> {
        let ticket = {
            let mut filters = self.filters.lock();
            filters.set(field, value);
            self.catalog.track(&filters)
        };
        match ticket {
            Some(ticket) => self.catalog.run(ticket).await,
            None => Ok(FetchOutcome::Unchanged),
        }
    }

    /// Applies several filter changes as one criteria change
    pub async fn apply_filters(&self, update: FilterUpdate) -> Result<FetchOutcome> {
        let ticket = {
            let mut filters = self.filters.lock();
            for (field, value) in update.changes() {
                filters.set(field, value);
            }
            self.catalog.track(&filters)
        };
        match ticket {
            Some(ticket) => self.catalog.run(ticket).await,
            None => Ok(FetchOutcome::Unchanged),
        }
    }

    /// Re-fetches the catalog for the current criteria
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        let ticket = self.catalog.invalidate(&self.filters.lock());
        self.catalog.run(ticket).await
    }

    pub fn items(&self) -> Vec<CatalogItem> {
        self.catalog.current_items()
    }

    pub fn item_count(&self) -> usize {
        self.catalog.item_count()
    }

    /// Item from the current view, for the details panel
    pub fn item_details(&self, item_id: &str) -> Option<CatalogItem> {
        self.catalog.find(item_id)
    }

    pub fn picklists(&self) -> PicklistSets {
        self.picklists.options()
    }

    /// Whether an item submission is currently running
    pub fn is_creating_item(&self) -> bool {
        self.creator.is_in_flight()
    }

    pub fn picklist_stage(&self) -> PicklistStage {
        self.picklists.stage()
    }

    /// Retries picklist resolution, e.g. after a failed activation
    pub async fn resolve_picklists(&self) -> Result<()> {
        self.picklists.resolve().await
    }

    // -------------------------------------------------------------------------
    // Item creation
    // -------------------------------------------------------------------------

    /// Creates an item and re-fetches the catalog so it becomes visible
    pub async fn create_item(&self, fields: NewItem) -> Result<CreatedItem> {
        let created = match self.creator.submit(fields).await {
            Ok(created) => created,
            Err(e @ ToolError::CreationInProgress) => {
                self.publish(ToolEvent::Notify(Notification::warning(e.to_string())));
                return Err(e);
            }
            Err(e) => {
                self.publish(ToolEvent::Notify(Notification::error(e.to_string())));
                return Err(e);
            }
        };

        let message = if created.image_url.is_some() {
            "Item created successfully with image!"
        } else {
            "Item created successfully"
        };
        self.publish(ToolEvent::Notify(Notification::success(message)));

        if let Err(e) = self.refresh().await {
            debug!(error = %e, "Catalog refresh after creation failed");
        }
        Ok(created)
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// Adds the item with `item_id` from the current view.
    ///
    /// Returns `Ok(None)` if the item is not in the view.
    pub fn add_to_cart(&self, item_id: &str) -> Result<Option<CartLine>> {
        let Some(item) = self.catalog.find(item_id) else {
            debug!(item_id, "Item not in current view, nothing added");
            return Ok(None);
        };

        let name = item.name.clone();
        let line = {
            let mut cart = self.cart.lock();
            cart.add(item)?;
            cart.lines().last().cloned()
        };
        self.publish(ToolEvent::Notify(Notification::success(format!(
            "{name} added to cart"
        ))));
        Ok(line)
    }

    pub fn clear_cart(&self) -> Result<()> {
        self.cart.lock().clear()
    }

    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.cart.lock().lines().to_vec()
    }

    pub fn cart_total(&self) -> f64 {
        self.cart.lock().total()
    }

    pub fn cart_is_empty(&self) -> bool {
        self.cart.lock().is_empty()
    }

    pub fn cart_line_count(&self) -> usize {
        self.cart.lock().line_count()
    }

    pub fn checkout_phase(&self) -> CheckoutPhase {
        self.cart.lock().phase()
    }

    /// Submits the cart as a purchase for the account.
    ///
    /// Returns `Ok(None)` for an empty cart. On success the cart is emptied
    /// and a navigation event is published; on failure the cart is kept.
    pub async fn checkout(&self) -> Result<Option<CheckoutReceipt>> {
        let (item_ids, summary) = {
            let mut cart = self.cart.lock();
            let Some(ids) = cart.begin_checkout()? else {
                return Ok(None);
            };
            (ids, format_item_summary(cart.lines()))
        };
        let guard = CheckoutGuard {
            cart: &self.cart,
            finished: false,
        };

        info!(account_id = %self.account_id, items = %summary, "Checking out");
        match self
            .purchases
            .create_purchase(&self.account_id, &item_ids)
            .await
        {
            Ok(purchase_id) => {
                guard.finish(true);
                info!(purchase_id = %purchase_id, "Purchase created");
                let receipt = CheckoutReceipt::new(purchase_id);
                self.publish(ToolEvent::Notify(Notification::success(
                    "Purchase created successfully",
                )));
                self.publish(ToolEvent::Navigate(receipt.clone()));
                Ok(Some(receipt))
            }
            Err(e) => {
                guard.finish(false);
                error!(account_id = %self.account_id, error = %e, "Checkout failed");
                let err = ToolError::mutation("create purchase", e);
                self.publish(ToolEvent::Notify(Notification::error(err.to_string())));
                Err(err)
            }
        }
    }

    // -------------------------------------------------------------------------
    // View
    // -------------------------------------------------------------------------

    /// Serializable snapshot of everything the presentation layer shows
    pub fn view(&self) -> ToolView {
        let cart = {
            let cart = self.cart.lock();
            CartView {
                lines: cart.lines().to_vec(),
                line_count: cart.line_count(),
                total: cart.total(),
                phase: cart.phase(),
            }
        };
        ToolView {
            account_id: self.account_id.clone(),
            account: self.account_display(),
            is_manager: self.is_manager,
            filters: self.filters(),
            picklists: self.picklists(),
            picklist_stage: self.picklist_stage(),
            items: self.items(),
            item_count: self.item_count(),
            creating_item: self.is_creating_item(),
            cart,
        }
    }
}
