//! REST API handlers for purchase tool sessions
//!
//! This module implements the HTTP endpoints the presentation layer uses to
//! open a session, drive the filters, create items and follow events.

use super::controller::PurchaseTool;
use super::models::ToolView;
use super::state::SharedState;
use crate::catalog::filter::FilterUpdate;
use crate::catalog::models::{CatalogItem, NewItem};
use crate::catalog::view::FetchOutcome;
use crate::error::Result as ToolResult;
use crate::router::ApiError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

/// Creates routes for session, filter and catalog operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(open_session))
        .route("/sessions/:id", get(get_session).delete(close_session))
        .route("/sessions/:id/filters", post(apply_filters))
        .route("/sessions/:id/refresh", post(refresh))
        .route("/sessions/:id/items", post(create_item))
        .route("/sessions/:id/items/:item_id", get(item_details))
        .route("/sessions/:id/events", get(events))
}

/// Looks up the controller of a session
pub(crate) fn find_session(
    state: &SharedState,
    session_id: &str,
) -> Result<Arc<PurchaseTool>, ApiError> {
    state
        .session(session_id)
        .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))
}

// =============================================================================
// Request / Response Models
// =============================================================================

/// Input for opening a session
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionInput {
    /// Account the host page shows
    pub account_id: String,
}

/// Response for a newly opened session
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub view: ToolView,
}

/// Response for filter changes and refreshes
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    /// Set when the catalog query ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<FetchOutcome>,

    /// Set when the query failed and the previous items were kept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,

    pub view: ToolView,
}

impl CatalogResponse {
    /// Fetch failures are not fatal: the stale view is returned with a warning
    fn from_fetch(tool: &PurchaseTool, result: ToolResult<FetchOutcome>) -> Self {
        let (outcome, warning) = match result {
            Ok(outcome) => (Some(outcome), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            outcome,
            warning,
            view: tool.view(),
        }
    }
}

/// Response for item creation
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemResponse {
    pub item_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    pub view: ToolView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Endpoint: POST /sessions
/// Activates a purchase tool for an account.
async fn open_session(
    State(state): State<SharedState>,
    Json(payload): Json<OpenSessionInput>,
) -> impl IntoResponse {
    let (session_id, tool) = state.open_session(&payload.account_id).await;
    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            view: tool.view(),
        }),
    )
}

/// Endpoint: GET /sessions/:id
async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ToolView>, ApiError> {
    let tool = find_session(&state, &id)?;
    Ok(Json(tool.view()))
}

/// Endpoint: DELETE /sessions/:id
async fn close_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.close_session(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::SessionNotFound(id))
    }
}

/// Endpoint: POST /sessions/:id/filters
/// Applies any of `search`, `type`, `family` and re-queries the catalog.
async fn apply_filters(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(update): Json<FilterUpdate>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let tool = find_session(&state, &id)?;
    let result = tool.apply_filters(update).await;
    Ok(Json(CatalogResponse::from_fetch(&tool, result)))
}

/// Endpoint: POST /sessions/:id/refresh
async fn refresh(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let tool = find_session(&state, &id)?;
    let result = tool.refresh().await;
    Ok(Json(CatalogResponse::from_fetch(&tool, result)))
}

/// Endpoint: POST /sessions/:id/items
/// Creates a catalog item, enriched with an image when one can be found.
async fn create_item(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(fields): Json<NewItem>,
) -> Result<impl IntoResponse, ApiError> {
    let tool = find_session(&state, &id)?;
    let created = tool.create_item(fields).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateItemResponse {
            item_id: created.id,
            image_url: created.image_url,
            view: tool.view(),
        }),
    ))
}

/// Endpoint: GET /sessions/:id/items/:item_id
async fn item_details(
    State(state): State<SharedState>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<CatalogItem>, ApiError> {
    let tool = find_session(&state, &id)?;
    tool.item_details(&item_id)
        .map(Json)
        .ok_or(ApiError::ItemNotFound(item_id))
}

/// Endpoint: GET /sessions/:id/events
/// Streams notifications and navigation requests as server-sent events.
async fn events(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let tool = find_session(&state, &id)?;
    let receiver = tool.subscribe();
    drop(tool);

    let stream = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => return Some((Event::default().json_data(&event), receiver)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
