//! Purchase Tool Models
//!
//! Account snapshot, events published to the presentation layer and the
//! serializable view of a controller.

use crate::cart::models::{CartLine, CheckoutPhase, CheckoutReceipt};
use crate::catalog::filter::FilterCriteria;
use crate::catalog::models::CatalogItem;
use crate::catalog::picklist::{PicklistSets, PicklistStage};
use serde::{Deserialize, Serialize};

// =============================================================================
// Account
// =============================================================================

/// Read-only view of the parent account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub id: String,
    pub name: Option<String>,
    pub account_number: Option<String>,
    pub industry: Option<String>,
}

/// Account fields as displayed, with placeholders for missing values
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountDisplay {
    pub name: String,
    pub account_number: String,
    pub industry: String,
}

impl AccountDisplay {
    pub fn from_snapshot(account: Option<&AccountSnapshot>) -> Self {
        Self {
            name: or_placeholder(account.and_then(|a| a.name.as_ref()), "N/A"),
            account_number: or_placeholder(
                account.and_then(|a| a.account_number.as_ref()),
                "No Number",
            ),
            industry: or_placeholder(account.and_then(|a| a.industry.as_ref()), "No Industry"),
        }
    }
}

fn or_placeholder(value: Option<&String>, placeholder: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| placeholder.to_string())
}

// =============================================================================
// Events
// =============================================================================

/// Severity of a notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifyVariant {
    Success,
    Warning,
    Error,
}

/// Toast-style message for the operator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub variant: NotifyVariant,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            title: "Success".into(),
            message: message.into(),
            variant: NotifyVariant::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            title: "Warning".into(),
            message: message.into(),
            variant: NotifyVariant::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".into(),
            message: message.into(),
            variant: NotifyVariant::Error,
        }
    }
}

/// Something the presentation layer should react to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ToolEvent {
    /// Show a notification
    Notify(Notification),
    /// Navigate to the purchase created by a checkout
    Navigate(CheckoutReceipt),
}

// =============================================================================
// Views
// =============================================================================

/// Cart part of [`ToolView`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub line_count: usize,
    pub total: f64,
    pub phase: CheckoutPhase,
}

/// Everything the presentation layer renders for one controller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolView {
    pub account_id: String,
    pub account: AccountDisplay,
    pub is_manager: bool,
    pub filters: FilterCriteria,
    pub picklists: PicklistSets,
    pub picklist_stage: PicklistStage,
    pub items: Vec<CatalogItem>,
    pub item_count: usize,
    /// An item submission is running; new submissions are rejected
    pub creating_item: bool,
    pub cart: CartView,
}
