//! REST API handlers for shopping cart operations
//!
//! This module implements HTTP endpoints for adding to, clearing and
//! checking out the cart of a purchase tool session.

use super::models::*;
use crate::router::ApiError;
use crate::tool::controller::PurchaseTool;
use crate::tool::handlers::find_session;
use crate::tool::state::SharedState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

/// Creates routes for cart-related operations
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/sessions/:id/cart", post(add_to_cart).delete(clear_cart))
        .route("/sessions/:id/checkout", post(checkout))
}

fn cart_response(tool: &PurchaseTool, status: &str) -> Json<CartResponse> {
    Json(CartResponse {
        status: status.to_string(),
        lines: tool.cart_lines(),
        total: tool.cart_total(),
    })
}

/// Endpoint: POST /sessions/:id/cart
/// Adds an item from the current catalog view. Unknown items are ignored.
async fn add_to_cart(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<AddToCartInput>,
) -> Result<Json<CartResponse>, ApiError> {
    let tool = find_session(&state, &id)?;
    let status = match tool.add_to_cart(&payload.item_id)? {
        Some(_) => "added",
        None => "unchanged",
    };
    Ok(cart_response(&tool, status))
}

/// Endpoint: DELETE /sessions/:id/cart
async fn clear_cart(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let tool = find_session(&state, &id)?;
    tool.clear_cart()?;
    Ok(cart_response(&tool, "cleared"))
}

/// Endpoint: POST /sessions/:id/checkout
/// Creates a purchase from the cart and answers with where to navigate.
async fn checkout(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let tool = find_session(&state, &id)?;
    match tool.checkout().await? {
        Some(receipt) => Ok(Json(receipt).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
