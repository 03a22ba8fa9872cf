// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory order store for local development (`STORE_BACKEND=memory`)
//! and tests.

use super::{sort_newest_first, OrderStore};
use crate::error::AppError;
use crate::models::{Order, OrderStatus};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};

/// Orders keyed by id. Each update holds the entry's shard lock, giving the
/// same single-document atomicity Firestore does.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: DashMap<String, Order>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch an order by id regardless of owner.
    pub fn get(&self, order_id: &str) -> Option<Order> {
        self.orders.get(order_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert_order(&self, order: &Order) -> Result<(), AppError> {
        match self.orders.entry(order.id.clone()) {
            Entry::Occupied(_) => Err(AppError::Database(format!(
                "Order {} already exists",
                order.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(order.clone());
                Ok(())
            }
        }
    }

    async fn orders_for_user(&self, telegram_user_id: i64) -> Result<Vec<Order>, AppError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.telegram_user_id == telegram_user_id)
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    async fn all_orders(&self) -> Result<Vec<Order>, AppError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    async fn attach_payment_proof(
        &self,
        order_id: &str,
        telegram_user_id: i64,
        proof_url: &str,
        updated_at: &str,
    ) -> Result<Option<Order>, AppError> {
        let Some(mut entry) = self.orders.get_mut(order_id) else {
            return Ok(None);
        };
        if entry.telegram_user_id != telegram_user_id {
            return Ok(None);
        }

        entry.payment_proof = Some(proof_url.to_string());
        entry.status = OrderStatus::UnderReview;
        entry.updated_at = updated_at.to_string();
        Ok(Some(entry.value().clone()))
    }

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        updated_at: &str,
    ) -> Result<Option<Order>, AppError> {
        let Some(mut entry) = self.orders.get_mut(order_id) else {
            return Ok(None);
        };
        entry.status = status;
        entry.updated_at = updated_at.to_string();
        Ok(Some(entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, owner: i64, created_at: &str) -> Order {
        Order {
            id: id.to_string(),
            telegram_user_id: owner,
            telegram_user_name: None,
            status: OrderStatus::PendingProof,
            total_amount: 10.0,
            items: vec![],
            shipping_address: None,
            shipping_method: None,
            payment_method: None,
            payment_proof: None,
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_orders_for_user_filters_and_sorts() {
        let store = MemoryOrderStore::new();
        store
            .insert_order(&order("a", 1, "2026-01-01T00:00:00.000Z"))
            .await
            .unwrap();
        store
            .insert_order(&order("b", 2, "2026-01-02T00:00:00.000Z"))
            .await
            .unwrap();
        store
            .insert_order(&order("c", 1, "2026-01-03T00:00:00.000Z"))
            .await
            .unwrap();

        let mine = store.orders_for_user(1).await.unwrap();
        let ids: Vec<&str> = mine.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);

        let all = store.all_orders().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, "c");
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = MemoryOrderStore::new();
        let o = order("a", 1, "2026-01-01T00:00:00.000Z");
        store.insert_order(&o).await.unwrap();
        assert!(matches!(
            store.insert_order(&o).await,
            Err(AppError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_attach_proof_is_owner_scoped() {
        let store = MemoryOrderStore::new();
        store
            .insert_order(&order("a", 1, "2026-01-01T00:00:00.000Z"))
            .await
            .unwrap();

        let denied = store
            .attach_payment_proof("a", 2, "https://x/proof.png", "later")
            .await
            .unwrap();
        assert!(denied.is_none());
        assert_eq!(store.get("a").unwrap().status, OrderStatus::PendingProof);
        assert_eq!(store.get("a").unwrap().payment_proof, None);

        let updated = store
            .attach_payment_proof("a", 1, "https://x/proof.png", "later")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, OrderStatus::UnderReview);
        assert_eq!(updated.payment_proof.as_deref(), Some("https://x/proof.png"));
        assert_eq!(updated.updated_at, "later");

        assert!(store
            .attach_payment_proof("missing", 1, "https://x/p.png", "later")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = MemoryOrderStore::new();
        store
            .insert_order(&order("a", 1, "2026-01-01T00:00:00.000Z"))
            .await
            .unwrap();

        let updated = store
            .update_status("a", OrderStatus::Shipped, "later")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Shipped);
        assert!(store
            .update_status("nope", OrderStatus::Paid, "later")
            .await
            .unwrap()
            .is_none());
    }
}
