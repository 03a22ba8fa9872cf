// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod notifier;
pub mod orders;

pub use notifier::{format_order_message, AdminNotifier};
pub use orders::{CartItem, NewOrder, OrderService};
