// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Customer order routes. Authenticated by Telegram init data in each request.

use crate::error::{AppError, Result};
use crate::models::OrderResponse;
use crate::services::NewOrder;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/attach-proof", post(attach_proof))
}

/// Checkout request: init data plus the cart.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default, alias = "initData")]
    pub payload: Option<String>,
    #[serde(flatten)]
    pub order: NewOrder,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>)> {
    let order = state
        .order_service
        .create_order(request.payload.as_deref(), request.order)
        .await?;

    Ok((StatusCode::CREATED, Json(order.into())))
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    #[serde(default, alias = "initData")]
    pub payload: Option<String>,
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<Vec<OrderResponse>>> {
    let orders = state
        .order_service
        .list_own_orders(params.payload.as_deref())
        .await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttachProofRequest {
    #[serde(default, alias = "initData")]
    pub payload: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub proof_url: Option<String>,
}

async fn attach_proof(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AttachProofRequest>,
) -> Result<Json<OrderResponse>> {
    let (Some(payload), Some(order_id), Some(proof_url)) = (
        request.payload.as_deref().filter(|s| !s.trim().is_empty()),
        request.order_id.as_deref().filter(|s| !s.trim().is_empty()),
        request.proof_url.as_deref().filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "payload, orderId and proofUrl are required".to_string(),
        ));
    };
    request.validate()?;

    let order = state
        .order_service
        .attach_payment_proof(Some(payload), order_id, proof_url)
        .await?;

    Ok(Json(order.into()))
}
