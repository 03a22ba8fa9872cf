// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Telegram WebApp init-data verification.
//!
//! Implements Telegram's signature scheme for Mini App launch data:
//!
//! ```text
//! secret_key = HMAC_SHA256(key = "WebAppData", msg = bot_token)
//! hash       = hex(HMAC_SHA256(key = secret_key, msg = data_check_string))
//! ```
//!
//! plus a 24 hour freshness window on `auth_date` to bound replay.

use super::init_data::{InitDataPayload, TelegramUser};
#[cfg(debug_assertions)]
use super::init_data::{MOCK_HASH, MOCK_USER_ID};
use crate::config::Environment;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const SECRET_KEY_LABEL: &[u8] = b"WebAppData";

/// Maximum accepted age of init data, in seconds. An age of exactly this
/// value is still accepted.
pub const MAX_INIT_DATA_AGE_SECS: i64 = 86_400;

/// Why a payload was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    #[error("init data has no hash")]
    MissingSignature,

    #[error("init data signature does not match")]
    SignatureMismatch,

    #[error("init data is older than the replay window")]
    Expired,

    #[error("init data is malformed")]
    MalformedPayload,

    #[error("bot token is not configured")]
    MissingServerSecret,
}

impl RejectReason {
    /// Stable code for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingSignature => "missing_signature",
            Self::SignatureMismatch => "signature_mismatch",
            Self::Expired => "expired",
            Self::MalformedPayload => "malformed_payload",
            Self::MissingServerSecret => "missing_server_secret",
        }
    }
}

/// Identity proven by a valid init-data signature.
///
/// Only [`TelegramAuthenticator`] constructs these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    telegram_user_id: i64,
    telegram_user_name: Option<String>,
    first_name: Option<String>,
}

impl VerifiedIdentity {
    fn from_user(user: TelegramUser) -> Self {
        Self {
            telegram_user_id: user.id,
            telegram_user_name: user.username,
            first_name: user.first_name,
        }
    }

    pub fn telegram_user_id(&self) -> i64 {
        self.telegram_user_id
    }

    /// Telegram `username`, if the user has one.
    pub fn telegram_user_name(&self) -> Option<&str> {
        self.telegram_user_name.as_deref()
    }

    /// Name to show admins: username, else first name.
    pub fn display_name(&self) -> Option<&str> {
        self.telegram_user_name
            .as_deref()
            .or(self.first_name.as_deref())
    }
}

/// Outcome of verifying init data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    Authenticated(VerifiedIdentity),
    Rejected(RejectReason),
}

impl AuthorizationDecision {
    pub fn into_result(self) -> Result<VerifiedIdentity, RejectReason> {
        match self {
            Self::Authenticated(identity) => Ok(identity),
            Self::Rejected(reason) => Err(reason),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Whether `hash=mock` payloads are accepted without a signature.
///
/// Resolved once at startup. Release builds have no `Enabled` variant, so
/// the bypass is compiled out whatever the configured environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBypass {
    Disabled,
    #[cfg(debug_assertions)]
    Enabled,
}

impl MockBypass {
    #[cfg(debug_assertions)]
    pub fn for_environment(environment: Environment) -> Self {
        if environment == Environment::Development {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }

    #[cfg(not(debug_assertions))]
    pub fn for_environment(_environment: Environment) -> Self {
        Self::Disabled
    }

    pub fn is_enabled(self) -> bool {
        self != Self::Disabled
    }
}

/// Verifies init data against the bot token.
#[derive(Clone)]
pub struct TelegramAuthenticator {
    bot_token: String,
    mock_bypass: MockBypass,
}

impl std::fmt::Debug for TelegramAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramAuthenticator")
            .field("bot_token_set", &!self.bot_token.is_empty())
            .field("mock_bypass", &self.mock_bypass)
            .finish()
    }
}

impl TelegramAuthenticator {
    pub fn new(bot_token: impl Into<String>, mock_bypass: MockBypass) -> Self {
        Self {
            bot_token: bot_token.into().trim().to_string(),
            mock_bypass,
        }
    }

    pub fn mock_bypass(&self) -> MockBypass {
        self.mock_bypass
    }

    /// Decode and verify a raw init-data string against the current time.
    pub fn authenticate(&self, raw: &str) -> AuthorizationDecision {
        self.authenticate_at(raw, now_unix_secs())
    }

    /// Decode and verify a raw init-data string against `now` (Unix seconds).
    pub fn authenticate_at(&self, raw: &str, now: i64) -> AuthorizationDecision {
        match InitDataPayload::decode(raw) {
            Ok(payload) => self.verify_at(&payload, now),
            Err(e) => reject(RejectReason::MalformedPayload, Some(&e.to_string())),
        }
    }

    /// Verify a decoded payload against the current time.
    pub fn verify(&self, payload: &InitDataPayload) -> AuthorizationDecision {
        self.verify_at(payload, now_unix_secs())
    }

    /// Identity for a `hash=mock` payload when the bypass is on.
    #[cfg(debug_assertions)]
    fn mock_identity_for(&self, payload: &InitDataPayload) -> Option<VerifiedIdentity> {
        if !self.mock_bypass.is_enabled() || payload.hash() != Some(MOCK_HASH) {
            return None;
        }
        tracing::warn!("DEV MODE: accepting mock init data without signature check");
        Some(
            payload
                .user()
                .map(VerifiedIdentity::from_user)
                .unwrap_or_else(mock_identity),
        )
    }

    #[cfg(not(debug_assertions))]
    fn mock_identity_for(&self, _payload: &InitDataPayload) -> Option<VerifiedIdentity> {
        None
    }

    /// Verify a decoded payload against `now` (Unix seconds).
    pub fn verify_at(&self, payload: &InitDataPayload, now: i64) -> AuthorizationDecision {
        if let Some(identity) = self.mock_identity_for(payload) {
            return AuthorizationDecision::Authenticated(identity);
        }

        if self.bot_token.is_empty() {
            tracing::error!(
                reason = RejectReason::MissingServerSecret.as_str(),
                "Cannot verify init data: bot token is not configured"
            );
            return AuthorizationDecision::Rejected(RejectReason::MissingServerSecret);
        }

        let Some(received) = payload.hash() else {
            return reject(RejectReason::MissingSignature, None);
        };

        let expected = sign_data_check_string(&self.bot_token, &payload.data_check_string());
        if !bool::from(expected.as_bytes().ct_eq(received.as_bytes())) {
            return reject(RejectReason::SignatureMismatch, None);
        }

        let auth_date = match payload.auth_date() {
            Ok(auth_date) => auth_date,
            Err(e) => return reject(RejectReason::MalformedPayload, Some(&e.to_string())),
        };
        let age = now.saturating_sub(auth_date);
        if age > MAX_INIT_DATA_AGE_SECS {
            tracing::warn!(
                reason = RejectReason::Expired.as_str(),
                age_secs = age,
                "Rejected init data"
            );
            return AuthorizationDecision::Rejected(RejectReason::Expired);
        }

        match payload.user() {
            Some(user) => {
                tracing::debug!(telegram_user_id = user.id, "Init data verified");
                AuthorizationDecision::Authenticated(VerifiedIdentity::from_user(user))
            }
            None => reject(
                RejectReason::MalformedPayload,
                Some("missing or invalid user field"),
            ),
        }
    }
}

fn reject(reason: RejectReason, detail: Option<&str>) -> AuthorizationDecision {
    match detail {
        Some(detail) => {
            tracing::warn!(reason = reason.as_str(), detail, "Rejected init data")
        }
        None => tracing::warn!(reason = reason.as_str(), "Rejected init data"),
    }
    AuthorizationDecision::Rejected(reason)
}

#[cfg(debug_assertions)]
fn mock_identity() -> VerifiedIdentity {
    VerifiedIdentity {
        telegram_user_id: MOCK_USER_ID,
        telegram_user_name: Some("testuser".to_string()),
        first_name: Some("Test User".to_string()),
    }
}

/// Lowercase hex signature Telegram would attach to `data_check_string`.
pub fn sign_data_check_string(bot_token: &str, data_check_string: &str) -> String {
    let secret_key = hmac_sha256(SECRET_KEY_LABEL, bot_token.as_bytes());
    hex::encode(hmac_sha256(&secret_key, data_check_string.as_bytes()))
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

fn now_unix_secs() -> i64 {
    chrono::Utc::now().timestamp()
}
