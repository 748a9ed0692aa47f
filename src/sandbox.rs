//! In-memory implementation of every port
//!
//! Stands in for the record store when no real backend is wired in: the
//! binary serves it by default and the tests drive it directly.

use crate::cart::models::PurchaseId;
use crate::catalog::models::{CatalogItem, ItemId, NewItem, ObjectMetadata, PicklistOption};
use crate::catalog::picklist::{FAMILY_FIELD, TYPE_FIELD};
use crate::error::PortError;
use crate::ports::{
    AccountPort, CatalogPort, ImagePort, MetadataPort, PermissionPort, PortResult, PurchasePort,
};
use crate::tool::models::AccountSnapshot;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;
use uuid::Uuid;

/// Record-type id the sandbox reports for the item entity
pub const SANDBOX_GROUP_ID: &str = "012000000000000AAA";

/// A persisted purchase
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRecord {
    pub account_id: String,
    pub item_ids: Vec<ItemId>,
}

/// In-memory record store
pub struct SandboxOrg {
    accounts: DashMap<String, AccountSnapshot>,
    items: DashMap<ItemId, CatalogItem>,
    purchases: DashMap<PurchaseId, PurchaseRecord>,
    picklists: DashMap<String, Vec<PicklistOption>>,
    is_manager: AtomicBool,
}

impl Default for SandboxOrg {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxOrg {
    /// An empty org whose operator is not a manager
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            items: DashMap::new(),
            purchases: DashMap::new(),
            picklists: DashMap::new(),
            is_manager: AtomicBool::new(false),
        }
    }

    /// An org with a demo account, a handful of items and both picklists
    pub fn seeded() -> Self {
        let org = Self::new();
        org.set_manager(true);
        org.insert_account(AccountSnapshot {
            id: "001x".into(),
            name: Some("Edge Communications".into()),
            account_number: Some("CD451796".into()),
            industry: Some("Electronics".into()),
        });

        org.set_picklist(TYPE_FIELD, options(&["Type 1", "Type 2", "Type 3"]));
        org.set_picklist(FAMILY_FIELD, options(&["Family 1", "Family 2"]));

        let demo = [
            ("a01A", "Desk Lamp", Some(24.99), "Type 1", "Family 1"),
            ("a01B", "Office Chair", Some(149.0), "Type 2", "Family 1"),
            ("a01C", "Notebook", Some(3.5), "Type 3", "Family 2"),
            ("a01D", "Sample Kit", None, "Type 1", "Family 2"),
        ];
        for (id, name, price, item_type, family) in demo {
            org.insert_item(CatalogItem {
                id: id.into(),
                name: name.into(),
                price,
                item_type: item_type.into(),
                family: family.into(),
                description: None,
                image_url: None,
            });
        }
        org
    }

    pub fn set_manager(&self, is_manager: bool) {
        self.is_manager.store(is_manager, Ordering::Relaxed);
    }

    pub fn insert_account(&self, account: AccountSnapshot) {
        self.accounts.insert(account.id.clone(), account);
    }

    pub fn insert_item(&self, item: CatalogItem) {
        self.items.insert(item.id.clone(), item);
    }

    pub fn set_picklist(&self, field: &str, values: Vec<PicklistOption>) {
        self.picklists.insert(field.to_string(), values);
    }

    pub fn item(&self, item_id: &str) -> Option<CatalogItem> {
        self.items.get(item_id).map(|i| i.value().clone())
    }

    pub fn purchase(&self, purchase_id: &str) -> Option<PurchaseRecord> {
        self.purchases.get(purchase_id).map(|p| p.value().clone())
    }

    pub fn purchase_count(&self) -> usize {
        self.purchases.len()
    }
}

/// Empty filter values match everything
fn filter_matches(filter: &str, value: &str) -> bool {
    filter.is_empty() || filter == value
}

fn options(values: &[&str]) -> Vec<PicklistOption> {
    values.iter().map(|v| PicklistOption::new(*v, *v)).collect()
}

#[async_trait]
impl AccountPort for SandboxOrg {
    async fn fetch_account(&self, account_id: &str) -> PortResult<AccountSnapshot> {
        self.accounts
            .get(account_id)
            .map(|a| a.value().clone())
            .ok_or_else(|| PortError::NotFound(format!("Account {}", account_id)))
    }
}

#[async_trait]
impl PermissionPort for SandboxOrg {
    async fn fetch_is_manager(&self) -> PortResult<bool> {
        Ok(self.is_manager.load(Ordering::Relaxed))
    }
}

#[async_trait]
impl CatalogPort for SandboxOrg {
    async fn query_items(
        &self,
        family: &str,
        item_type: &str,
        search_text: &str,
    ) -> PortResult<Vec<CatalogItem>> {
        let needle = search_text.to_lowercase();
        let mut found: Vec<CatalogItem> = self
            .items
            .iter()
            .filter(|i| filter_matches(family, &i.family))
            .filter(|i| filter_matches(item_type, &i.item_type))
            .filter(|i| needle.is_empty() || i.name.to_lowercase().contains(&needle))
            .map(|i| i.value().clone())
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn create_item(&self, fields: NewItem) -> PortResult<ItemId> {
        if fields.name.trim().is_empty() {
            return Err(PortError::Rejected("Name is required".into()));
        }
        if fields.price.is_some_and(|p| p < 0.0) {
            return Err(PortError::Rejected("Price cannot be negative".into()));
        }

        let id = Uuid::new_v4().simple().to_string();
        self.insert_item(CatalogItem {
            id: id.clone(),
            name: fields.name,
            price: fields.price,
            item_type: fields.item_type,
            family: fields.family,
            description: fields.description,
            image_url: fields.image_url,
        });
        info!(item_id = %id, "Sandbox item created");
        Ok(id)
    }
}

#[async_trait]
impl ImagePort for SandboxOrg {
    async fn resolve_image_url(&self, item_name: &str) -> PortResult<String> {
        let query = item_name.split_whitespace().collect::<Vec<_>>().join("+");
        if query.is_empty() {
            return Err(PortError::NotFound("No image for an empty name".into()));
        }
        Ok(format!("https://images.unsplash.com/sandbox?query={}", query))
    }
}

#[async_trait]
impl PurchasePort for SandboxOrg {
    async fn create_purchase(
        &self,
        account_id: &str,
        item_ids: &[ItemId],
    ) -> PortResult<PurchaseId> {
        if !self.accounts.contains_key(account_id) {
            return Err(PortError::NotFound(format!("Account {}", account_id)));
        }
        if item_ids.is_empty() {
            return Err(PortError::Rejected("A purchase needs at least one item".into()));
        }
        if let Some(missing) = item_ids.iter().find(|id| !self.items.contains_key(*id)) {
            return Err(PortError::Rejected(format!("Unknown item {}", missing)));
        }

        let id = Uuid::new_v4().simple().to_string();
        self.purchases.insert(
            id.clone(),
            PurchaseRecord {
                account_id: account_id.to_string(),
                item_ids: item_ids.to_vec(),
            },
        );
        info!(purchase_id = %id, account_id, items = item_ids.len(), "Sandbox purchase created");
        Ok(id)
    }
}

#[async_trait]
impl MetadataPort for SandboxOrg {
    async fn fetch_object_metadata(&self, _entity: &str) -> PortResult<ObjectMetadata> {
        Ok(ObjectMetadata {
            default_group_id: Some(SANDBOX_GROUP_ID.to_string()),
        })
    }

    async fn fetch_picklist_values(
        &self,
        field: &str,
        group_id: &str,
    ) -> PortResult<Vec<PicklistOption>> {
        if group_id != SANDBOX_GROUP_ID {
            return Err(PortError::NotFound(format!("Record type {}", group_id)));
        }
        Ok(self
            .picklists
            .get(field)
            .map(|v| v.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn query_filters_and_sorts_by_name() {
        let org = SandboxOrg::seeded();
        let all = org.query_items("", "", "").await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].name, "Desk Lamp");

        let family = org.query_items("Family 2", "", "").await.unwrap();
        assert_eq!(family.len(), 2);

        let search = org.query_items("", "", "LAMP").await.unwrap();
        assert_eq!(search.len(), 1);
        assert_eq!(search[0].id, "a01A");

        let none = org.query_items("Family 1", "Type 3", "").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn purchase_requires_known_account_and_items() {
        let org = SandboxOrg::seeded();
        let unknown_account = org.create_purchase("001missing", &["a01A".to_string()]).await;
        assert!(matches!(unknown_account, Err(PortError::NotFound(_))));

        let unknown_item = org.create_purchase("001x", &["nope".to_string()]).await;
        assert!(matches!(unknown_item, Err(PortError::Rejected(_))));

        let ids = vec!["a01A".to_string(), "a01A".to_string()];
        let id = org.create_purchase("001x", &ids).await.unwrap();
        assert_eq!(org.purchase(&id).unwrap().item_ids, ids);
    }

    #[tokio::test]
    async fn created_item_is_queryable() {
        let org = SandboxOrg::new();
        let id = org
            .create_item(NewItem {
                name: "Standing Desk".into(),
                image_url: Some("https://img/desk".into()),
                ..NewItem::default()
            })
            .await
            .unwrap();
        let items = org.query_items("", "", "desk").await.unwrap();
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].image_url.as_deref(), Some("https://img/desk"));

        let rejected = org.create_item(NewItem::default()).await;
        assert!(matches!(rejected, Err(PortError::Rejected(_))));
    }
}
