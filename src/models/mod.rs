// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod order;

pub use order::{
    Order, OrderItem, OrderResponse, OrderStatus, PaymentChoice, ShippingAddress, ShippingChoice,
};
