//! Error types for the purchase tool
//!
//! Port implementations report [`PortError`]; the controller classifies those
//! into [`ToolError`] depending on which operation hit them.

use thiserror::Error;

/// Failure reported by an external port.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortError {
    /// The collaborator could not be reached or is not configured.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The collaborator refused the request (validation, permissions, ...).
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Transport or decoding failure.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for PortError {
    fn from(e: reqwest::Error) -> Self {
        PortError::Transport(e.to_string())
    }
}

/// Errors surfaced by the purchase tool controller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// A read port failed. Previously held data is kept.
    #[error("Failed to fetch {what}: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: PortError,
    },

    /// Item creation or checkout failed. Nothing was committed.
    #[error("Failed to {action}: {source}")]
    Mutation {
        action: &'static str,
        #[source]
        source: PortError,
    },

    /// Image lookup failed while enriching a new item.
    #[error("Image lookup failed: {0}")]
    Enrichment(#[source] PortError),

    /// A checkout request is already in flight.
    #[error("Checkout already in progress")]
    CheckoutInProgress,

    /// An item creation request is already in flight.
    #[error("Item creation already in progress")]
    CreationInProgress,
}

impl ToolError {
    pub(crate) fn fetch(what: &'static str, source: PortError) -> Self {
        ToolError::Fetch { what, source }
    }

    pub(crate) fn mutation(action: &'static str, source: PortError) -> Self {
        ToolError::Mutation { action, source }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
