// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;
use tg_storefront::config::Config;
use tg_storefront::db::{FirestoreDb, MemoryOrderStore};
use tg_storefront::routes::create_router;
use tg_storefront::telegram::sign_data_check_string;
use tg_storefront::AppState;

/// Bot token used by `Config::test_default()`.
#[allow(dead_code)]
pub const TEST_BOT_TOKEN: &str = "123456:TEST-TOKEN";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app over a fresh in-memory store.
/// Returns the router, the shared state and the store for direct inspection.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryOrderStore>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
) -> (axum::Router, Arc<AppState>, Arc<MemoryOrderStore>) {
    let store = Arc::new(MemoryOrderStore::new());
    let state = Arc::new(AppState::new(config, store.clone()));
    (create_router(state.clone()), state, store)
}

/// Build signed init data as the Telegram client would, fields in the given
/// order with `hash` appended last.
#[allow(dead_code)]
pub fn signed_init_data(fields: &[(&str, &str)]) -> String {
    let mut lines: Vec<String> = fields.iter().map(|(k, v)| format!("{k}={v}")).collect();
    lines.sort();
    let hash = sign_data_check_string(TEST_BOT_TOKEN, &lines.join("\n"));

    let mut query: Vec<String> = fields
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect();
    query.push(format!("hash={hash}"));
    query.join("&")
}

/// Signed init data for `user_id`, issued now.
#[allow(dead_code)]
pub fn init_data_for_user(user_id: i64) -> String {
    let user = format!(r#"{{"id":{user_id},"first_name":"Test","username":"user{user_id}"}}"#);
    let auth_date = chrono::Utc::now().timestamp().to_string();
    signed_init_data(&[
        ("query_id", "AAHdF6IQAAAAAN0XohDhrOrc"),
        ("user", &user),
        ("auth_date", &auth_date),
    ])
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("valid JSON body")
}
