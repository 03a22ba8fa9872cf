// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Order model for storage and API.

use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Legacy state from before payment proofs existed
    Pending,
    /// Waiting for the customer to upload a payment proof
    PendingProof,
    /// Proof uploaded, admin checking
    UnderReview,
    Paid,
    Shipped,
    Completed,
    Cancelled,
}

/// One purchased line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Every field is optional at checkout; missing ones are stored empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub full_name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub address: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub city: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub country: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub zip_code: String,
    #[serde(default)]
    #[validate(length(max = 64))]
    pub phone: String,
}

/// Shipping method as chosen at checkout (a snapshot, not a reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ShippingChoice {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

/// Payment method as chosen at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PaymentChoice {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

/// Order document stored in Firestore (collection `orders`, keyed by `id`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID (also used as document ID)
    pub id: String,
    /// Verified Telegram user who placed the order
    pub telegram_user_id: i64,
    /// Telegram username or first name, for admins
    pub telegram_user_name: Option<String>,
    pub status: OrderStatus,
    /// Sum of item price × quantity
    pub total_amount: f64,
    pub items: Vec<OrderItem>,
    pub shipping_address: Option<ShippingAddress>,
    pub shipping_method: Option<ShippingChoice>,
    pub payment_method: Option<PaymentChoice>,
    /// Public URL of the uploaded payment proof image
    pub payment_proof: Option<String>,
    /// RFC3339, see `time_utils::format_utc_rfc3339`
    pub created_at: String,
    pub updated_at: String,
}

/// Order as returned by the API (camelCase, `_id`, matching the Mini App).
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub telegram_user_id: i64,
    pub telegram_user_name: Option<String>,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub items: Vec<OrderItem>,
    pub shipping_address: Option<ShippingAddress>,
    pub shipping_method: Option<ShippingChoice>,
    pub payment_method: Option<PaymentChoice>,
    pub payment_proof: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            telegram_user_id: order.telegram_user_id,
            telegram_user_name: order.telegram_user_name,
            status: order.status,
            total_amount: order.total_amount,
            items: order.items,
            shipping_address: order.shipping_address,
            shipping_method: order.shipping_method,
            payment_method: order.payment_method,
            payment_proof: order.payment_proof,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}
