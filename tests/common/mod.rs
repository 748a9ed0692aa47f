//! Scripted ports shared by the integration tests
//!
//! `TestOrg` wraps the sandbox org and lets a test hold catalog queries or
//! purchase requests open, make ports fail, and inspect the calls made.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use purchase_tool::cart::PurchaseId;
use purchase_tool::catalog::models::{CatalogItem, ItemId, NewItem, ObjectMetadata};
use purchase_tool::catalog::picklist::{FAMILY_FIELD, TYPE_FIELD};
use purchase_tool::catalog::PicklistOption;
use purchase_tool::error::PortError;
use purchase_tool::ports::{
    AccountPort, CatalogPort, ImagePort, MetadataPort, PermissionPort, PortResult, Ports,
    PurchasePort,
};
use purchase_tool::sandbox::SandboxOrg;
use purchase_tool::tool::{AccountSnapshot, PurchaseTool, ToolEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Notify};

pub const ACCOUNT_ID: &str = "001x";
pub const ITEM_ENTITY: &str = "Item__c";

fn item(id: &str, name: &str, price: Option<f64>, item_type: &str, family: &str) -> CatalogItem {
    CatalogItem {
        id: id.into(),
        name: name.into(),
        price,
        item_type: item_type.into(),
        family: family.into(),
        description: None,
        image_url: None,
    }
}

#[derive(Default)]
pub struct TestOrg {
    pub org: SandboxOrg,
    held_families: Mutex<HashMap<String, Arc<Notify>>>,
    held_purchases: Mutex<Option<Arc<Notify>>>,
    held_creations: Mutex<Option<Arc<Notify>>>,
    pub query_entered: Notify,
    pub purchase_entered: Notify,
    pub create_entered: Notify,
    pub query_calls: Mutex<Vec<(String, String, String)>>,
    pub purchase_calls: Mutex<Vec<(String, Vec<ItemId>)>>,
    pub image_calls: Mutex<Vec<String>>,
    pub create_calls: Mutex<Vec<String>>,
    pub fail_queries: AtomicBool,
    pub fail_images: AtomicBool,
    pub fail_purchases: AtomicBool,
    pub fail_account: AtomicBool,
}

impl TestOrg {
    /// Account `001x` and three items:
    /// Item A (10, Type 1, Family 1), Item B (no price, Type 2, Family 2),
    /// Item C (5, Type 1, Family 2)
    pub fn new() -> Arc<Self> {
        let test = Self::default();
        test.org.insert_account(AccountSnapshot {
            id: ACCOUNT_ID.into(),
            name: Some("Edge Communications".into()),
            account_number: Some("CD451796".into()),
            industry: None,
        });
        test.org.insert_item(item("a01A", "Item A", Some(10.0), "Type 1", "Family 1"));
        test.org.insert_item(item("a01B", "Item B", None, "Type 2", "Family 2"));
        test.org.insert_item(item("a01C", "Item C", Some(5.0), "Type 1", "Family 2"));
        test.org.set_picklist(
            TYPE_FIELD,
            vec![
                PicklistOption::new("Type 1", "Type 1"),
                PicklistOption::new("Type 2", "Type 2"),
            ],
        );
        test.org.set_picklist(
            FAMILY_FIELD,
            vec![
                PicklistOption::new("Family 1", "Family 1"),
                PicklistOption::new("Family 2", "Family 2"),
            ],
        );
        test.org.set_manager(true);
        Arc::new(test)
    }

    pub fn ports(self: &Arc<Self>) -> Ports {
        Ports::from_single(self.clone())
    }

    pub async fn activate(self: &Arc<Self>) -> Arc<PurchaseTool> {
        Arc::new(PurchaseTool::activate(ACCOUNT_ID, &self.ports(), ITEM_ENTITY).await)
    }

    /// Queries for `family` wait until the returned handle is notified
    pub fn hold_family(&self, family: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.held_families
            .lock()
            .insert(family.to_string(), gate.clone());
        gate
    }

    /// Stops holding queries for `family`; queries already waiting stay held
    pub fn release_family(&self, family: &str) {
        self.held_families.lock().remove(family);
    }

    /// Purchase requests wait until the returned handle is notified
    pub fn hold_purchases(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.held_purchases.lock() = Some(gate.clone());
        gate
    }

    /// Item creations wait until the returned handle is notified
    pub fn hold_creations(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.held_creations.lock() = Some(gate.clone());
        gate
    }

    pub fn query_count(&self) -> usize {
        self.query_calls.lock().len()
    }

    pub fn purchase_count(&self) -> usize {
        self.purchase_calls.lock().len()
    }
}

/// Drains every event published so far
pub fn drain(events: &mut broadcast::Receiver<ToolEvent>) -> Vec<ToolEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

#[async_trait]
impl AccountPort for TestOrg {
    async fn fetch_account(&self, account_id: &str) -> PortResult<AccountSnapshot> {
        if self.fail_account.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("accounts".into()));
        }
        self.org.fetch_account(account_id).await
    }
}

#[async_trait]
impl PermissionPort for TestOrg {
    async fn fetch_is_manager(&self) -> PortResult<bool> {
        self.org.fetch_is_manager().await
    }
}

#[async_trait]
impl CatalogPort for TestOrg {
    async fn query_items(
        &self,
        family: &str,
        item_type: &str,
        search_text: &str,
    ) -> PortResult<Vec<CatalogItem>> {
        self.query_calls
            .lock()
            .push((family.into(), item_type.into(), search_text.into()));

        let gate = self.held_families.lock().get(family).cloned();
        if let Some(gate) = gate {
            self.query_entered.notify_one();
            gate.notified().await;
        }

        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("catalog".into()));
        }
        self.org.query_items(family, item_type, search_text).await
    }

    async fn create_item(&self, fields: NewItem) -> PortResult<ItemId> {
        self.create_calls.lock().push(fields.name.clone());

        let gate = self.held_creations.lock().clone();
        if let Some(gate) = gate {
            self.create_entered.notify_one();
            gate.notified().await;
        }
        self.org.create_item(fields).await
    }
}

#[async_trait]
impl ImagePort for TestOrg {
    async fn resolve_image_url(&self, item_name: &str) -> PortResult<String> {
        self.image_calls.lock().push(item_name.to_string());
        if self.fail_images.load(Ordering::SeqCst) {
            return Err(PortError::Transport("connection reset".into()));
        }
        self.org.resolve_image_url(item_name).await
    }
}

#[async_trait]
impl PurchasePort for TestOrg {
    async fn create_purchase(
        &self,
        account_id: &str,
        item_ids: &[ItemId],
    ) -> PortResult<PurchaseId> {
        self.purchase_calls
            .lock()
            .push((account_id.to_string(), item_ids.to_vec()));

        let gate = self.held_purchases.lock().clone();
        if let Some(gate) = gate {
            self.purchase_entered.notify_one();
            gate.notified().await;
        }

        if self.fail_purchases.load(Ordering::SeqCst) {
            return Err(PortError::Rejected("FIELD_CUSTOM_VALIDATION_EXCEPTION".into()));
        }
        self.org.create_purchase(account_id, item_ids).await
    }
}

#[async_trait]
impl MetadataPort for TestOrg {
    async fn fetch_object_metadata(&self, entity: &str) -> PortResult<ObjectMetadata> {
        self.org.fetch_object_metadata(entity).await
    }

    async fn fetch_picklist_values(
        &self,
        field: &str,
        group_id: &str,
    ) -> PortResult<Vec<PicklistOption>> {
        self.org.fetch_picklist_values(field, group_id).await
    }
}
