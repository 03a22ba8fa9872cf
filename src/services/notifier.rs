// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! New-order notifications to the shop admin over the Telegram Bot API.

use crate::config::Secret;
use crate::error::AppError;
use crate::models::Order;
use serde::Serialize;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Sends `sendMessage` calls to the configured admin chat.
///
/// With no chat configured every notification is a no-op.
#[derive(Clone)]
pub struct AdminNotifier {
    http: reqwest::Client,
    bot_token: Secret,
    chat_id: Option<i64>,
    base_url: String,
}

impl AdminNotifier {
    pub fn new(bot_token: Secret, chat_id: Option<i64>) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
            chat_id,
            base_url: TELEGRAM_API_BASE.to_string(),
        }
    }

    /// A notifier that never sends anything.
    pub fn disabled() -> Self {
        Self::new(Secret::default(), None)
    }

    /// Point at another Bot API server (a local stub in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.chat_id.is_some() && !self.bot_token.is_empty()
    }

    /// Tell the admin chat about a newly created order.
    pub async fn notify_new_order(&self, order: &Order) -> Result<(), AppError> {
        let Some(chat_id) = self.chat_id else {
            return Ok(());
        };
        if self.bot_token.is_empty() {
            return Ok(());
        }

        let text = format_order_message(order);
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token.expose());

        let response = self
            .http
            .post(&url)
            .json(&SendMessageRequest {
                chat_id,
                text: &text,
                disable_web_page_preview: true,
            })
            .send()
            .await
            // reqwest errors include the URL, which contains the token
            .map_err(|e| anyhow::anyhow!("sendMessage request failed: {}", e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("sendMessage returned HTTP {}: {}", status, body).into());
        }

        tracing::info!(order_id = %order.id, "Admin notified of new order");
        Ok(())
    }

    /// Send the notification on a detached task. Failures are logged only.
    pub fn spawn_new_order(&self, order: Order) {
        if !self.is_enabled() {
            return;
        }

        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_new_order(&order).await {
                tracing::warn!(order_id = %order.id, error = %e, "Failed to notify admin of new order");
            }
        });
    }
}

/// Plain-text summary of an order for the admin chat.
pub fn format_order_message(order: &Order) -> String {
    let item_count: u32 = order.items.iter().map(|item| item.quantity).sum();
    let customer = match &order.telegram_user_name {
        Some(name) => format!("{} (id {})", name, order.telegram_user_id),
        None => format!("id {}", order.telegram_user_id),
    };

    let mut text = format!(
        "New order {}\nCustomer: {}\nItems: {}\nTotal: {:.2}",
        order.id, customer, item_count, order.total_amount
    );
    if let Some(method) = &order.payment_method {
        text.push_str(&format!("\nPayment: {}", method.name));
    }
    if order.payment_proof.is_some() {
        text.push_str("\nPayment proof attached");
    }
    text
}
