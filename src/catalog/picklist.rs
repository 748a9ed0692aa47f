//! Dependent picklist resolution
//!
//! Type and family option sets depend on the default record-type of the item
//! entity, so resolution is a two-step pipeline: object metadata first, then
//! both picklists for the group id it returned.

use super::filter::UNCONSTRAINED;
use super::models::PicklistOption;
use crate::error::{Result, ToolError};
use crate::ports::MetadataPort;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Picklist field holding the item type
pub const TYPE_FIELD: &str = "Type__c";
/// Picklist field holding the item family
pub const FAMILY_FIELD: &str = "Family__c";

/// Option sets for both filter dimensions
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PicklistSets {
    pub types: Vec<PicklistOption>,
    pub families: Vec<PicklistOption>,
}

impl Default for PicklistSets {
    fn default() -> Self {
        Self::from_values(Vec::new(), Vec::new())
    }
}

impl PicklistSets {
    /// Builds both sets, each led by its synthetic "All" entry
    pub fn from_values(types: Vec<PicklistOption>, families: Vec<PicklistOption>) -> Self {
        Self {
            types: with_all_option("All Types", types),
            families: with_all_option("All Families", families),
        }
    }
}

fn with_all_option(label: &str, values: Vec<PicklistOption>) -> Vec<PicklistOption> {
    let mut options = Vec::with_capacity(values.len() + 1);
    options.push(PicklistOption::new(label, UNCONSTRAINED));
    options.extend(values);
    options
}

/// Where the pipeline currently stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "groupId", rename_all = "camelCase")]
pub enum PicklistStage {
    /// Object metadata not available yet
    Pending,
    /// The entity has no default group; picklists cannot be requested
    NoGroup,
    /// Group id known, picklist values not (yet) loaded
    GroupResolved(String),
    /// Both option sets loaded for this group id
    Ready(String),
}

struct PicklistInner {
    stage: PicklistStage,
    sets: PicklistSets,
}

/// Resolves and holds the type/family option sets
pub struct PicklistResolver {
    port: Arc<dyn MetadataPort>,
    entity: String,
    inner: Mutex<PicklistInner>,
}

impl PicklistResolver {
    pub fn new(port: Arc<dyn MetadataPort>, entity: impl Into<String>) -> Self {
        Self {
            port,
            entity: entity.into(),
            inner: Mutex::new(PicklistInner {
                stage: PicklistStage::Pending,
                sets: PicklistSets::default(),
            }),
        }
    }

    pub fn stage(&self) -> PicklistStage {
        self.inner.lock().stage.clone()
    }

    /// Current option sets (only the "All" entries until resolved)
    pub fn options(&self) -> PicklistSets {
        self.inner.lock().sets.clone()
    }

    /// Runs the pipeline. A failure at either step leaves the option sets
    /// as they were.
    pub async fn resolve(&self) -> Result<()> {
        let group_id = match self.stage() {
            PicklistStage::GroupResolved(id) | PicklistStage::Ready(id) => id,
            PicklistStage::Pending | PicklistStage::NoGroup => {
                let metadata = self
                    .port
                    .fetch_object_metadata(&self.entity)
                    .await
                    .map_err(|e| {
                        warn!(entity = %self.entity, error = %e, "Object metadata fetch failed");
                        ToolError::fetch("object metadata", e)
                    })?;

                match metadata.default_group_id {
                    Some(id) => {
                        self.inner.lock().stage = PicklistStage::GroupResolved(id.clone());
                        id
                    }
                    None => {
                        debug!(entity = %self.entity, "No default group, picklists unresolved");
                        self.inner.lock().stage = PicklistStage::NoGroup;
                        return Ok(());
                    }
                }
            }
        };

        let (types, families) = tokio::try_join!(
            self.port.fetch_picklist_values(TYPE_FIELD, &group_id),
            self.port.fetch_picklist_values(FAMILY_FIELD, &group_id),
        )
        .map_err(|e| {
            warn!(group_id = %group_id, error = %e, "Picklist values fetch failed");
            ToolError::fetch("picklist values", e)
        })?;

        info!(
            group_id = %group_id,
            types = types.len(),
            families = families.len(),
            "Picklists resolved"
        );

        let sets = PicklistSets::from_values(types, families);
        let mut inner = self.inner.lock();
        inner.sets = sets;
        inner.stage = PicklistStage::Ready(group_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::ObjectMetadata;
    use crate::error::PortError;
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeMetadata {
        group: Option<String>,
        fail_values: bool,
        value_calls: AtomicUsize,
    }

    impl FakeMetadata {
        fn new(group: Option<&str>, fail_values: bool) -> Arc<Self> {
            Arc::new(Self {
                group: group.map(String::from),
                fail_values,
                value_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl MetadataPort for FakeMetadata {
        async fn fetch_object_metadata(&self, _entity: &str) -> PortResult<ObjectMetadata> {
            Ok(ObjectMetadata {
                default_group_id: self.group.clone(),
            })
        }

        async fn fetch_picklist_values(
            &self,
            field: &str,
            group_id: &str,
        ) -> PortResult<Vec<PicklistOption>> {
            self.value_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_values {
                return Err(PortError::Unavailable("metadata api".into()));
            }
            assert_eq!(group_id, "012A");
            Ok(match field {
                TYPE_FIELD => vec![PicklistOption::new("Type 1", "Type 1")],
                _ => vec![
                    PicklistOption::new("Family 1", "Family 1"),
                    PicklistOption::new("Family 2", "Family 2"),
                ],
            })
        }
    }

    #[test]
    fn initial_sets_only_hold_the_all_entry() {
        let sets = PicklistSets::default();
        assert_eq!(sets.types, vec![PicklistOption::new("All Types", "")]);
        assert_eq!(sets.families, vec![PicklistOption::new("All Families", "")]);
    }

    #[tokio::test]
    async fn resolves_both_sets_after_group_id() {
        let port = FakeMetadata::new(Some("012A"), false);
        let resolver = PicklistResolver::new(port.clone(), "Item__c");
        resolver.resolve().await.unwrap();

        assert_eq!(resolver.stage(), PicklistStage::Ready("012A".into()));
        let sets = resolver.options();
        assert_eq!(sets.types[0].value, UNCONSTRAINED);
        assert_eq!(sets.types[1].label, "Type 1");
        assert_eq!(sets.families.len(), 3);
        assert_eq!(sets.families[0].label, "All Families");
    }

    #[tokio::test]
    async fn missing_group_skips_picklist_fetch() {
        let port = FakeMetadata::new(None, false);
        let resolver = PicklistResolver::new(port.clone(), "Item__c");
        resolver.resolve().await.unwrap();

        assert_eq!(resolver.stage(), PicklistStage::NoGroup);
        assert_eq!(port.value_calls.load(Ordering::SeqCst), 0);
        assert_eq!(resolver.options(), PicklistSets::default());
    }

    #[tokio::test]
    async fn failed_values_keep_initial_sets() {
        let port = FakeMetadata::new(Some("012A"), true);
        let resolver = PicklistResolver::new(port, "Item__c");
        let err = resolver.resolve().await.unwrap_err();

        assert!(matches!(err, ToolError::Fetch { .. }));
        assert_eq!(resolver.stage(), PicklistStage::GroupResolved("012A".into()));
        assert_eq!(resolver.options(), PicklistSets::default());
    }
}
