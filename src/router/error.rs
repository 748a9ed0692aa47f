//! Mapping of controller errors to HTTP responses

use crate::error::ToolError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error returned by every handler
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unknown session: {0}")]
    SessionNotFound(String),
    #[error("Item not in current view: {0}")]
    ItemNotFound(String),
    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) | ApiError::ItemNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Tool(ToolError::CheckoutInProgress | ToolError::CreationInProgress) => {
                StatusCode::CONFLICT
            }
            ApiError::Tool(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
