// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Customer order operations, gated on verified Telegram init data.
//!
//! Every operation verifies the caller's init data before touching the
//! store, then scopes all reads and writes to the verified Telegram user id.
//! No client-supplied user id is ever consulted.

use super::notifier::AdminNotifier;
use crate::db::OrderStore;
use crate::error::AppError;
use crate::models::{
    Order, OrderItem, OrderStatus, PaymentChoice, ShippingAddress, ShippingChoice,
};
use crate::telegram::{TelegramAuthenticator, VerifiedIdentity};
use crate::time_utils::now_rfc3339;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// One line of the customer's cart as sent by the Mini App.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 1, max = 1000))]
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl CartItem {
    /// First gallery image, else the single `image`.
    fn primary_image(&self) -> Option<String> {
        self.images
            .first()
            .cloned()
            .or_else(|| self.image.clone())
    }
}

/// Checkout contents, everything except the init data.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Cart is empty"), nested)]
    pub cart_items: Vec<CartItem>,
    #[serde(default)]
    #[validate(nested)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    #[validate(nested)]
    pub shipping_method: Option<ShippingChoice>,
    #[serde(default)]
    #[validate(nested)]
    pub payment_method: Option<PaymentChoice>,
    #[serde(default)]
    #[validate(url)]
    pub payment_proof: Option<String>,
}

impl NewOrder {
    /// Sum of price × quantity over the cart.
    pub fn total_amount(&self) -> f64 {
        self.cart_items
            .iter()
            .map(|item| item.price * f64::from(item.quantity))
            .sum()
    }
}

/// Order operations for Mini App customers.
#[derive(Clone)]
pub struct OrderService {
    authenticator: TelegramAuthenticator,
    store: Arc<dyn OrderStore>,
    notifier: AdminNotifier,
}

impl OrderService {
    pub fn new(
        authenticator: TelegramAuthenticator,
        store: Arc<dyn OrderStore>,
        notifier: AdminNotifier,
    ) -> Self {
        Self {
            authenticator,
            store,
            notifier,
        }
    }

    pub fn authenticator(&self) -> &TelegramAuthenticator {
        &self.authenticator
    }

    /// Verify raw init data from a request.
    ///
    /// Absent or blank init data is a plain bad request; anything else goes
    /// through the authenticator and a rejection becomes
    /// [`AppError::AuthRejected`].
    pub fn authenticate(&self, raw: Option<&str>) -> Result<VerifiedIdentity, AppError> {
        let raw = raw
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| AppError::BadRequest("Missing payload".to_string()))?;

        Ok(self.authenticator.authenticate(raw).into_result()?)
    }

    /// Create an order owned by the verified caller.
    pub async fn create_order(
        &self,
        raw_init_data: Option<&str>,
        new_order: NewOrder,
    ) -> Result<Order, AppError> {
        let identity = self.authenticate(raw_init_data)?;
        new_order.validate()?;

        let total_amount = new_order.total_amount();
        let items = new_order
            .cart_items
            .iter()
            .map(|item| OrderItem {
                name: item.name.clone(),
                price: item.price,
                quantity: item.quantity,
                image: item.primary_image(),
            })
            .collect();

        let status = if new_order.payment_proof.is_some() {
            OrderStatus::UnderReview
        } else {
            OrderStatus::PendingProof
        };

        let now = now_rfc3339();
        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            telegram_user_id: identity.telegram_user_id(),
            telegram_user_name: identity.display_name().map(str::to_string),
            status,
            total_amount,
            items,
            shipping_address: new_order.shipping_address,
            shipping_method: new_order.shipping_method,
            payment_method: new_order.payment_method,
            payment_proof: new_order.payment_proof,
            created_at: now.clone(),
            updated_at: now,
        };

        self.store.insert_order(&order).await?;

        tracing::info!(
            order_id = %order.id,
            telegram_user_id = order.telegram_user_id,
            total_amount = order.total_amount,
            status = ?order.status,
            "Order created"
        );

        self.notifier.spawn_new_order(order.clone());
        Ok(order)
    }

    /// The verified caller's orders, newest first.
    pub async fn list_own_orders(&self, raw_init_data: Option<&str>) -> Result<Vec<Order>, AppError> {
        let identity = self.authenticate(raw_init_data)?;
        self.store
            .orders_for_user(identity.telegram_user_id())
            .await
    }

    /// Attach a payment proof to one of the caller's own orders.
    ///
    /// An order that does not exist and one owned by someone else are both
    /// reported as not found.
    pub async fn attach_payment_proof(
        &self,
        raw_init_data: Option<&str>,
        order_id: &str,
        proof_url: &str,
    ) -> Result<Order, AppError> {
        let identity = self.authenticate(raw_init_data)?;

        let updated = self
            .store
            .attach_payment_proof(
                order_id,
                identity.telegram_user_id(),
                proof_url,
                &now_rfc3339(),
            )
            .await?;

        match updated {
            Some(order) => {
                tracing::info!(
                    order_id,
                    telegram_user_id = identity.telegram_user_id(),
                    "Payment proof attached"
                );
                Ok(order)
            }
            None => Err(AppError::NotFound("Order not found".to_string())),
        }
    }
}
