// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Telegram Mini App init data: delivery-form detection and parsing.
//!
//! Clients hand us the init data either as the literal query string Telegram
//! produced (`query_id=...&user=...&auth_date=...&hash=...`) or wrapped in
//! base64. [`EncodedInitData::detect`] picks the form and
//! [`InitDataPayload::decode`] turns either one into an ordered field list.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use serde::Deserialize;
use std::borrow::Cow;

/// Standard alphabet, padding optional (matches what browsers' `atob` accepts).
const FORGIVING_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Substrings that mark a string as an already-decoded query string.
const PLAIN_MARKERS: [&str; 2] = ["query_id=", "user="];

const FRAGMENT_KEY: &str = "tgWebAppData=";
const FRAGMENT_TERMINATORS: [&str; 2] = ["&tgWebAppVersion=", "&tgWebAppThemeParams="];

/// Signature value the development mock client sends.
pub const MOCK_HASH: &str = "mock";
/// Telegram user id of the development mock user.
pub const MOCK_USER_ID: i64 = 123_456_789;

/// Reasons init data could not be parsed.
///
/// All of these surface to callers as a single `malformed_payload` rejection;
/// the detail is for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitDataError {
    #[error("init data is empty")]
    Empty,

    #[error("field without '=' separator: {0:?}")]
    MissingSeparator(String),

    #[error("field with empty key")]
    EmptyKey,

    #[error("field {0:?} is not valid percent-encoded UTF-8")]
    BadEncoding(String),

    #[error("more than one hash field")]
    DuplicateHash,
}

/// The delivery form of a raw init-data string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedInitData<'a> {
    /// Already a URL-encoded query string.
    Plain(&'a str),
    /// Base64 wrapping of a query string.
    Base64(&'a str),
}

impl<'a> EncodedInitData<'a> {
    /// Classify a raw string by looking for query-string markers.
    pub fn detect(raw: &'a str) -> Self {
        if looks_like_query(raw) {
            Self::Plain(raw)
        } else {
            Self::Base64(raw)
        }
    }

    /// Produce the query string.
    ///
    /// A base64 blob that fails to decode (or decodes to non-UTF-8) is taken
    /// to be a query string already; parsing decides whether it really is one.
    pub fn into_query(self) -> Cow<'a, str> {
        match self {
            Self::Plain(raw) => Cow::Borrowed(raw),
            Self::Base64(raw) => match FORGIVING_BASE64.decode(raw.trim()) {
                Ok(bytes) => match String::from_utf8(bytes) {
                    Ok(decoded) => Cow::Owned(decoded),
                    Err(_) => {
                        tracing::debug!("Base64 init data is not UTF-8, treating as plain");
                        Cow::Borrowed(raw)
                    }
                },
                Err(e) => {
                    tracing::debug!(error = %e, "Init data is not base64, treating as plain");
                    Cow::Borrowed(raw)
                }
            },
        }
    }
}

fn looks_like_query(s: &str) -> bool {
    PLAIN_MARKERS.iter().any(|marker| s.contains(marker))
}

/// Parsed init data: the fields in the order they arrived, values decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitDataPayload {
    fields: Vec<(String, String)>,
}

impl InitDataPayload {
    /// Detect the delivery form of `raw` and parse it.
    pub fn decode(raw: &str) -> Result<Self, InitDataError> {
        let query = EncodedInitData::detect(raw).into_query();
        Self::parse_query(&query)
    }

    /// Parse a URL-encoded query string.
    pub fn parse_query(query: &str) -> Result<Self, InitDataError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(InitDataError::Empty);
        }

        let mut fields = Vec::new();
        let mut seen_hash = false;

        for segment in query.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| InitDataError::MissingSeparator(segment.to_string()))?;

            if key.is_empty() {
                return Err(InitDataError::EmptyKey);
            }

            if key == "hash" {
                if seen_hash {
                    return Err(InitDataError::DuplicateHash);
                }
                seen_hash = true;
            }

            fields.push((key.to_string(), decode_value(key, value)?));
        }

        if fields.is_empty() {
            return Err(InitDataError::Empty);
        }

        Ok(Self { fields })
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The received signature, if any.
    pub fn hash(&self) -> Option<&str> {
        self.get("hash").filter(|h| !h.is_empty())
    }

    /// All fields in arrival order, including `hash`.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// The string Telegram signs: every field but `hash` as `key=value`,
    /// sorted byte-wise, joined by `\n`.
    pub fn data_check_string(&self) -> String {
        let mut lines: Vec<String> = self
            .fields
            .iter()
            .filter(|(k, _)| k != "hash")
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        lines.sort_unstable();
        lines.join("\n")
    }

    /// `auth_date` in Unix seconds. Absent means 0.
    pub fn auth_date(&self) -> Result<i64, InitDataError> {
        match self.get("auth_date") {
            None => Ok(0),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| InitDataError::BadEncoding("auth_date".to_string())),
        }
    }

    /// The embedded `user` object, if present and well-formed.
    pub fn user(&self) -> Option<TelegramUser> {
        let raw = self.get("user")?;
        match serde_json::from_str(raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!(error = %e, "Init data user field is not valid JSON");
                None
            }
        }
    }
}

/// Percent-decode only values that contain an escape, so already-decoded
/// values are not decoded twice.
fn decode_value(key: &str, value: &str) -> Result<String, InitDataError> {
    if !value.contains('%') {
        return Ok(value.to_string());
    }
    urlencoding::decode(value)
        .map(Cow::into_owned)
        .map_err(|_| InitDataError::BadEncoding(key.to_string()))
}

/// The `user` object Telegram embeds in init data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

/// Pull the init data out of a Mini App launch URL fragment
/// (`#tgWebAppData=...&tgWebAppVersion=...`).
///
/// Returns `None` when the fragment carries no `tgWebAppData`.
pub fn init_data_from_launch_fragment(fragment: &str) -> Option<String> {
    let start = fragment.find(FRAGMENT_KEY)? + FRAGMENT_KEY.len();
    let rest = &fragment[start..];

    let end = FRAGMENT_TERMINATORS
        .iter()
        .filter_map(|t| rest.find(t))
        .min()
        .unwrap_or(rest.len());
    let extracted = &rest[..end];

    if extracted.contains('%') {
        match urlencoding::decode(extracted) {
            Ok(decoded) => return Some(decoded.into_owned()),
            Err(_) => return Some(extracted.to_string()),
        }
    }
    Some(extracted.to_string())
}

/// Init data the development client synthesises when it runs outside Telegram.
pub fn mock_init_data(auth_date: i64) -> String {
    let user = serde_json::json!({
        "id": MOCK_USER_ID,
        "first_name": "Test User",
        "username": "testuser",
        "language_code": "en",
    });
    format!(
        "user={}&chat_instance=123&chat_type=private&auth_date={auth_date}&hash={MOCK_HASH}",
        urlencoding::encode(&user.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    const SAMPLE: &str = "query_id=AAH&user=%7B%22id%22%3A42%2C%22username%22%3A%22alice%22%7D&auth_date=1700000000&hash=abc123";

    #[test]
    fn detect_plain_by_markers() {
        assert!(matches!(
            EncodedInitData::detect(SAMPLE),
            EncodedInitData::Plain(_)
        ));
        assert!(matches!(
            EncodedInitData::detect("auth_date=1&user=x"),
            EncodedInitData::Plain(_)
        ));
        assert!(matches!(
            EncodedInitData::detect("dXNlcj0x"),
            EncodedInitData::Base64(_)
        ));
    }

    #[test]
    fn base64_without_padding_decodes() {
        let encoded = STANDARD.encode(SAMPLE);
        let unpadded = encoded.trim_end_matches('=');
        assert_eq!(
            EncodedInitData::Base64(unpadded).into_query(),
            Cow::<str>::Borrowed(SAMPLE)
        );
    }

    #[test]
    fn invalid_base64_falls_back_to_raw() {
        let raw = "auth_date=1&hash=ff";
        assert_eq!(EncodedInitData::Base64(raw).into_query(), raw);
    }

    #[test]
    fn parse_decodes_only_escaped_values() {
        let payload = InitDataPayload::parse_query(SAMPLE).unwrap();
        assert_eq!(
            payload.get("user"),
            Some(r#"{"id":42,"username":"alice"}"#)
        );
        assert_eq!(payload.get("auth_date"), Some("1700000000"));
        assert_eq!(payload.hash(), Some("abc123"));
        assert_eq!(payload.fields().len(), 4);
    }

    #[test]
    fn parse_keeps_value_equals_signs() {
        let payload = InitDataPayload::parse_query("a=b=c&hash=1").unwrap();
        assert_eq!(payload.get("a"), Some("b=c"));
    }

    #[test]
    fn parse_rejects_structural_garbage() {
        assert_eq!(
            InitDataPayload::parse_query(""),
            Err(InitDataError::Empty)
        );
        assert_eq!(
            InitDataPayload::parse_query("&&"),
            Err(InitDataError::Empty)
        );
        assert_eq!(
            InitDataPayload::parse_query("=1&hash=2"),
            Err(InitDataError::EmptyKey)
        );
        assert!(matches!(
            InitDataPayload::parse_query("novalue&hash=2"),
            Err(InitDataError::MissingSeparator(_))
        ));
        assert_eq!(
            InitDataPayload::parse_query("hash=1&hash=2"),
            Err(InitDataError::DuplicateHash)
        );
        assert!(matches!(
            InitDataPayload::parse_query("user=%FF%FE&hash=1"),
            Err(InitDataError::BadEncoding(_))
        ));
    }

    #[test]
    fn empty_hash_counts_as_missing() {
        let payload = InitDataPayload::parse_query("auth_date=1&hash=").unwrap();
        assert_eq!(payload.hash(), None);
    }

    #[test]
    fn data_check_string_excludes_hash_and_sorts_bytewise() {
        let payload =
            InitDataPayload::parse_query("b=1&hash=zz&auth_date=99&a=2&auth_date=100").unwrap();
        assert_eq!(
            payload.data_check_string(),
            "a=2\nauth_date=100\nauth_date=99\nb=1"
        );
    }

    #[test]
    fn auth_date_defaults_to_zero() {
        let payload = InitDataPayload::parse_query("user=x&hash=1").unwrap();
        assert_eq!(payload.auth_date(), Ok(0));

        let payload = InitDataPayload::parse_query("auth_date=soon&hash=1").unwrap();
        assert!(payload.auth_date().is_err());
    }

    #[test]
    fn user_requires_integer_id() {
        let payload = InitDataPayload::parse_query(SAMPLE).unwrap();
        let user = payload.user().unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.username.as_deref(), Some("alice"));
        assert_eq!(user.first_name, None);

        let payload =
            InitDataPayload::parse_query("user=%7B%22id%22%3A%22x%22%7D&hash=1").unwrap();
        assert_eq!(payload.user(), None);
    }

    #[test]
    fn fragment_extraction_stops_at_first_known_param() {
        let fragment = "#tgWebAppData=query_id%3DAA%26user%3D1%26hash%3Dff&tgWebAppThemeParams=%7B%7D&tgWebAppVersion=7.0";
        assert_eq!(
            init_data_from_launch_fragment(fragment).as_deref(),
            Some("query_id=AA&user=1&hash=ff")
        );

        let fragment = "tgWebAppData=user=1&hash=ff&tgWebAppVersion=7.0&tgWebAppThemeParams=x";
        assert_eq!(
            init_data_from_launch_fragment(fragment).as_deref(),
            Some("user=1&hash=ff")
        );

        assert_eq!(init_data_from_launch_fragment("#tgWebAppVersion=7.0"), None);
    }

    #[test]
    fn fragment_with_bad_escape_is_returned_raw() {
        let fragment = "tgWebAppData=user%ZZ&tgWebAppVersion=7.0";
        assert_eq!(
            init_data_from_launch_fragment(fragment).as_deref(),
            Some("user%ZZ")
        );
    }

    #[test]
    fn mock_init_data_parses_to_mock_user() {
        let payload = InitDataPayload::decode(&mock_init_data(1_700_000_000)).unwrap();
        assert_eq!(payload.hash(), Some(MOCK_HASH));
        assert_eq!(payload.user().map(|u| u.id), Some(MOCK_USER_ID));
        assert_eq!(payload.get("chat_type"), Some("private"));
    }
}
