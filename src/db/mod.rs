// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: the order store seam and its backends.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use self::memory::MemoryOrderStore;

use crate::error::AppError;
use crate::models::{Order, OrderStatus};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const ORDERS: &str = "orders";
}

/// Order persistence.
///
/// Every write touches a single document, so the backend's per-document
/// atomicity is all the coordination needed. Customer-facing callers always
/// pass the verified Telegram user id; only admin routes use the unscoped
/// operations.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Store a new order.
    async fn insert_order(&self, order: &Order) -> Result<(), AppError>;

    /// Orders owned by `telegram_user_id`, newest first.
    async fn orders_for_user(&self, telegram_user_id: i64) -> Result<Vec<Order>, AppError>;

    /// Every order, newest first (admin).
    async fn all_orders(&self) -> Result<Vec<Order>, AppError>;

    /// Attach a payment proof and move the order to `under_review`, but only
    /// if the stored owner is `telegram_user_id`.
    ///
    /// Returns `None`, leaving the order untouched, when it does not exist or
    /// belongs to someone else.
    async fn attach_payment_proof(
        &self,
        order_id: &str,
        telegram_user_id: i64,
        proof_url: &str,
        updated_at: &str,
    ) -> Result<Option<Order>, AppError>;

    /// Set an order's status (admin). `None` if the order does not exist.
    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        updated_at: &str,
    ) -> Result<Option<Order>, AppError>;
}

/// Newest first; ties broken by id so listings are stable.
pub(crate) fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
