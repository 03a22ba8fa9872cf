// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin session middleware.
//!
//! Admins log in with the shared password and get an HS256 JWT in the
//! `admin_session` cookie. Telegram init data plays no part here.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// HttpOnly cookie carrying the session JWT.
pub const ADMIN_SESSION_COOKIE: &str = "admin_session";
/// Readable hint cookie for the Mini App's admin route guard. Grants nothing.
pub const ADMIN_HINT_COOKIE: &str = "admin_auth";
/// Session lifetime in seconds (1 day).
pub const ADMIN_SESSION_TTL_SECS: usize = 24 * 60 * 60;

const ADMIN_SUBJECT: &str = "admin";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    /// Subject, always "admin"
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Marker inserted into request extensions for admin requests.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub issued_at: usize,
}

/// Middleware that requires a valid admin session cookie.
///
/// With no admin password configured, admin access is off and every request
/// is refused, whatever token it carries.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if state.config.admin_password.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = jar
        .get(ADMIN_SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = verify_session_token(&token, &state.config.admin_session_key)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(AdminSession {
        issued_at: claims.iat,
    });

    Ok(next.run(request).await)
}

/// Decode and validate an admin session token.
pub fn verify_session_token(token: &str, signing_key: &[u8]) -> Option<AdminClaims> {
    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<AdminClaims>(token, &key, &validation).ok()?;
    (data.claims.sub == ADMIN_SUBJECT).then_some(data.claims)
}

/// Create a JWT for an admin session.
pub fn create_session_token(signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = AdminClaims {
        sub: ADMIN_SUBJECT.to_string(),
        iat: now,
        exp: now + ADMIN_SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Compare a login attempt against the configured password.
///
/// An empty configured password disables admin login entirely.
pub fn check_password(configured: &str, attempt: &str) -> bool {
    if configured.is_empty() {
        return false;
    }
    bool::from(configured.as_bytes().ct_eq(attempt.as_bytes()))
}
