//! Catalog Domain Models
//!
//! Items as returned by the catalog-query port, the fields used to create a
//! new one, and the option sets used by the type/family filters.

use serde::{Deserialize, Serialize};

/// Opaque, stable identifier of a catalog item
pub type ItemId = String;

// =============================================================================
// Catalog Items
// =============================================================================

/// A purchasable entity as returned by the catalog-query port
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Identifier of the item
    pub id: ItemId,

    /// Display name
    pub name: String,

    /// Unit price; absent means zero
    #[serde(default)]
    pub price: Option<f64>,

    /// Type classification
    #[serde(rename = "type", default)]
    pub item_type: String,

    /// Family classification
    #[serde(default)]
    pub family: String,

    /// Free-form description shown in the details view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// URL of an external stock image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CatalogItem {
    /// Price with the "absent means zero" rule applied
    pub fn unit_price(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }
}

/// Fields submitted to the catalog port when creating an item
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,

    #[serde(default)]
    pub price: Option<f64>,

    #[serde(rename = "type", default)]
    pub item_type: String,

    #[serde(default)]
    pub family: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Filled in by the image enrichment step, never by the caller
    #[serde(default, skip_deserializing)]
    pub image_url: Option<String>,
}

// =============================================================================
// Picklists
// =============================================================================

/// One selectable value of a filter dimension
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PicklistOption {
    pub label: String,
    pub value: String,
}

impl PicklistOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Object metadata needed before picklist values can be requested
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Default record-type (group) identifier, if the entity has one
    pub default_group_id: Option<String>,
}
