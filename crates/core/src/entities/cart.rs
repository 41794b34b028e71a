//! Cart line item entity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CartLineId, ProductId};

/// One line of the shopping cart.
///
/// `id` is server-assigned and absent before the first sync. Name, price,
/// and image are denormalized copies for display. Quantity is always at
/// least 1; a decrement that reaches 0 removes the line instead of
/// persisting a zero quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(default)]
    pub id: Option<CartLineId>,
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub discounted_price: Option<Decimal>,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartItem {
    /// Line subtotal at the effective unit price.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.price) * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_cart_item_parses_without_id() {
        let item: CartItem = serde_json::from_str(
            r#"{"productId": 7, "name": "Mug", "price": 10.0, "quantity": 2}"#,
        )
        .expect("parse cart item");
        assert_eq!(item.id, None);
        assert_eq!(item.subtotal(), dec!(20.0));
    }

    #[test]
    fn test_cart_item_subtotal_uses_discount() {
        let item: CartItem = serde_json::from_str(
            r#"{"id": 1, "productId": 7, "name": "Mug", "price": 10.0,
                "discountedPrice": 8.0, "quantity": 3}"#,
        )
        .expect("parse cart item");
        assert_eq!(item.subtotal(), dec!(24.0));
    }
}
