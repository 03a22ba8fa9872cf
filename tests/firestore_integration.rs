// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and are skipped
//! when FIRESTORE_EMULATOR_HOST is unset.

use tg_storefront::db::OrderStore;
use tg_storefront::models::{Order, OrderItem, OrderStatus};
use tg_storefront::time_utils::now_rfc3339;

mod common;
use common::test_db;

/// Generate a unique Telegram user id for test isolation.
fn unique_user_id() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    (SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
        % 1_000_000_000_000) as i64
}

fn test_order(owner: i64, created_at: &str) -> Order {
    Order {
        id: uuid::Uuid::new_v4().to_string(),
        telegram_user_id: owner,
        telegram_user_name: Some("tester".to_string()),
        status: OrderStatus::PendingProof,
        total_amount: 9.5,
        items: vec![OrderItem {
            name: "Mug".to_string(),
            price: 9.5,
            quantity: 1,
            image: None,
        }],
        shipping_address: None,
        shipping_method: None,
        payment_method: None,
        payment_proof: None,
        created_at: created_at.to_string(),
        updated_at: created_at.to_string(),
    }
}

#[tokio::test]
async fn test_insert_and_list_for_user() {
    require_emulator!();

    let db = test_db().await;
    let owner = unique_user_id();

    let older = test_order(owner, "2026-01-01T00:00:00.000Z");
    let newer = test_order(owner, "2026-02-01T00:00:00.000Z");
    let foreign = test_order(owner + 1, "2026-03-01T00:00:00.000Z");

    db.insert_order(&older).await.unwrap();
    db.insert_order(&newer).await.unwrap();
    db.insert_order(&foreign).await.unwrap();

    let mine = db.orders_for_user(owner).await.unwrap();
    let ids: Vec<&str> = mine.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);

    assert_eq!(db.get_order(&older.id).await.unwrap(), Some(older));
}

#[tokio::test]
async fn test_attach_proof_respects_owner() {
    require_emulator!();

    let db = test_db().await;
    let owner = unique_user_id();
    let order = test_order(owner, &now_rfc3339());
    db.insert_order(&order).await.unwrap();

    let denied = db
        .attach_payment_proof(&order.id, owner + 1, "https://evil/p.png", &now_rfc3339())
        .await
        .unwrap();
    assert!(denied.is_none());
    assert_eq!(db.get_order(&order.id).await.unwrap(), Some(order.clone()));

    let updated = db
        .attach_payment_proof(&order.id, owner, "https://cdn/p.png", &now_rfc3339())
        .await
        .unwrap()
        .expect("owner can attach proof");
    assert_eq!(updated.status, OrderStatus::UnderReview);

    let stored = db.get_order(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_proof.as_deref(), Some("https://cdn/p.png"));
    assert_eq!(stored.status, OrderStatus::UnderReview);
    assert_eq!(stored.items, order.items);
}

#[tokio::test]
async fn test_update_status() {
    require_emulator!();

    let db = test_db().await;
    let order = test_order(unique_user_id(), &now_rfc3339());
    db.insert_order(&order).await.unwrap();

    let updated = db
        .update_status(&order.id, OrderStatus::Shipped, &now_rfc3339())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);

    assert!(db
        .update_status("does-not-exist", OrderStatus::Paid, &now_rfc3339())
        .await
        .unwrap()
        .is_none());
}
