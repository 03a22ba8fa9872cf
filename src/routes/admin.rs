// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin login/logout and order management routes.

use crate::error::{AppError, Result};
use crate::middleware::admin::{
    check_password, create_session_token, AdminSession, ADMIN_HINT_COOKIE, ADMIN_SESSION_COOKIE,
};
use crate::models::{OrderResponse, OrderStatus};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Login/logout routes (no session required).
pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

/// Admin routes. `require_admin` is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/admin/orders", get(list_all_orders).patch(update_order_status))
}

// ─── Session ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
}

fn session_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((ADMIN_SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(1))
        .build()
}

fn hint_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((ADMIN_HINT_COOKIE, value))
        .path("/")
        .http_only(false)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(1))
        .build()
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    if !check_password(state.config.admin_password.expose(), &request.password) {
        tracing::warn!("Admin login failed");
        return Err(AppError::Unauthorized);
    }

    let token = create_session_token(&state.config.admin_session_key)?;
    let secure = state.config.secure_cookies();

    tracing::info!("Admin logged in");

    let jar = jar
        .add(session_cookie(token, secure))
        .add(hint_cookie("true".to_string(), secure));

    Ok((jar, Json(LoginResponse { success: true })))
}

/// Clear both admin cookies. Removal cookies carry the same path and flags
/// as the originals so browsers match them.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let secure = state.config.secure_cookies();
    let jar = jar
        .remove(session_cookie(String::new(), secure))
        .remove(hint_cookie(String::new(), secure));

    (jar, StatusCode::NO_CONTENT)
}

// ─── Orders ──────────────────────────────────────────────────

async fn list_all_orders(State(state): State<Arc<AppState>>) -> Result<Json<Vec<OrderResponse>>> {
    let orders = state.store.all_orders().await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AdminSession>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>> {
    let (Some(id), Some(status)) = (request.id.filter(|id| !id.is_empty()), request.status) else {
        return Err(AppError::BadRequest("id and status are required".to_string()));
    };

    let order = state
        .store
        .update_status(&id, status, &now_rfc3339())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;

    tracing::info!(
        order_id = %id,
        status = ?status,
        session_issued_at = session.issued_at,
        "Admin updated order status"
    );

    Ok(Json(order.into()))
}
