//! Product entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, ProductId};

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub discounted_price: Option<Decimal>,
    pub stock: i64,
    #[serde(default)]
    pub image: Option<String>,
    pub category_id: CategoryId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The price the customer actually pays.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.price)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}
