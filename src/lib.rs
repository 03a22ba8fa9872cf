// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Telegram Mini App storefront backend.
//!
//! Customers are identified only by signed Telegram WebApp init data; every
//! order they create, list or update is scoped to the verified Telegram user.
//! Admins manage orders behind a separate password session.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod telegram;
pub mod time_utils;

use config::Config;
use db::OrderStore;
use services::OrderService;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn OrderStore>,
    pub order_service: OrderService,
}

impl AppState {
    /// Wire the order service to `store` using the secrets in `config`.
    pub fn new(config: Config, store: Arc<dyn OrderStore>) -> Self {
        let authenticator = telegram::TelegramAuthenticator::new(
            config.bot_token.expose(),
            telegram::MockBypass::for_environment(config.environment),
        );
        let notifier = services::AdminNotifier::new(config.bot_token.clone(), config.admin_chat_id);
        let order_service = OrderService::new(authenticator, store.clone(), notifier);

        Self {
            config,
            store,
            order_service,
        }
    }
}
