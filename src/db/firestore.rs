// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed order operations.
//!
//! Orders live in the `orders` collection with the order id as document id.

use super::{collections, sort_newest_first, OrderStore};
use crate::error::AppError;
use crate::models::{Order, OrderStatus};
use async_trait::async_trait;
use firestore::paths;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator takes no credentials; skip ADC lookup entirely.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client. Every operation returns a database error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Get an order by id, regardless of owner.
    pub async fn get_order(&self, order_id: &str) -> Result<Option<Order>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::ORDERS)
            .obj()
            .one(order_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write only `status`, `payment_proof` and `updated_at` of `order`, so a
    /// concurrent update to other fields is not clobbered.
    async fn write_order_state(&self, order: &Order) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(paths!(Order::{status, payment_proof, updated_at}))
            .in_col(collections::ORDERS)
            .document_id(&order.id)
            .object(order)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for FirestoreDb {
    async fn insert_order(&self, order: &Order) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::ORDERS)
            .document_id(&order.id)
            .object(order)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn orders_for_user(&self, telegram_user_id: i64) -> Result<Vec<Order>, AppError> {
        let mut orders: Vec<Order> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ORDERS)
            .filter(move |q| q.for_all([q.field("telegram_user_id").eq(telegram_user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Sorted here rather than with order_by to avoid needing a composite
        // index on (telegram_user_id, created_at); per-user lists are small.
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    async fn all_orders(&self) -> Result<Vec<Order>, AppError> {
        let mut orders: Vec<Order> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ORDERS)
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Equal timestamps come back in index order; make ties stable.
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
        let Some(mut order) = self.get_order(order_id).await? else {
            return Ok(None);
        };

        // Ownership never changes after creation, so checking it on the read
        // is enough; the write below only touches the proof fields.
        if order.telegram_user_id != telegram_user_id {
            tracing::warn!(
                order_id,
                telegram_user_id,
                "Payment proof attach refused: order owned by another user"
            );
            return Ok(None);
        }

        order.payment_proof = Some(proof_url.to_string());
        order.status = OrderStatus::UnderReview;
        order.updated_at = updated_at.to_string();
        self.write_order_state(&order).await?;

        Ok(Some(order))
    }

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        updated_at: &str,
    ) -> Result<Option<Order>, AppError> {
        let Some(mut order) = self.get_order(order_id).await? else {
            return Ok(None);
        };

        order.status = status;
        order.updated_at = updated_at.to_string();
        self.write_order_state(&order).await?;

        Ok(Some(order))
    }
}
