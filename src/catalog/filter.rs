//! Filter criteria and the query key derived from them

use serde::{Deserialize, Serialize};

/// Value meaning "no constraint" for every filter dimension.
///
/// The synthetic "All" picklist options carry this same value.
pub const UNCONSTRAINED: &str = "";

/// The three independent catalog filters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search_text: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub family: String,
}

/// Which filter a change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Search,
    Type,
    Family,
}

impl FilterCriteria {
    /// Replaces one field. Returns `false` when the value was already set.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) -> bool {
        let slot = match field {
            FilterField::Search => &mut self.search_text,
            FilterField::Type => &mut self.item_type,
            FilterField::Family => &mut self.family,
        };
        let value = value.into();
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    /// Derives the catalog query this criteria maps to
    pub fn query_key(&self) -> QueryKey {
        QueryKey {
            family: self.family.clone(),
            item_type: self.item_type.clone(),
            search_text: self.search_text.clone(),
        }
    }
}

/// Arguments of one catalog query, in port order.
///
/// Two requests with equal keys are the same request.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct QueryKey {
    pub family: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub search_text: String,
}

/// Partial filter update as sent by the presentation layer
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUpdate {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub family: Option<String>,
}

impl FilterUpdate {
    /// Field changes in application order
    pub fn changes(self) -> Vec<(FilterField, String)> {
        [
            (FilterField::Search, self.search),
            (FilterField::Type, self.item_type),
            (FilterField::Family, self.family),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}
