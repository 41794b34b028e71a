//! Order entities.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CartLineId, OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// A line item inside a placed order, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<OrderItemId>,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
}

/// A line item inside an order *draft*, built from the cart at checkout.
///
/// `cart_line_id` carries the server-assigned cart entry the order→cart
/// coupling removes after the order is accepted. Lines added before the
/// first cart sync have no id and are skipped by the removal pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default, rename = "id")]
    pub cart_line_id: Option<CartLineId>,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
