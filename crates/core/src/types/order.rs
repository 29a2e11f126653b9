//! Orders placed at checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CartLine, OrderId, OrderStatus, PaymentMethod, Price};

/// Where the order is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Flat / house number / street.
    pub address: String,
    pub city: String,
    pub phone: String,
}

impl ShippingAddress {
    /// Whether street, city and phone are all filled in.
    ///
    /// Whitespace-only values count as empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.address, &self.city, &self.phone]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// Payload for `POST /orders/create`.
///
/// A snapshot of the cart and its checkout total at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub order_items: Vec<CartLine>,
    pub shipping_address: ShippingAddress,
    pub total_price: Price,
    pub payment_method: PaymentMethod,
}

/// An order as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order ID. A creation response without one is treated as a failure.
    #[serde(rename = "_id", default)]
    pub id: Option<OrderId>,
    #[serde(default)]
    pub order_items: Vec<CartLine>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    pub total_price: Price,
    /// Payment label as stored by the server.
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total number of units across all items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.order_items
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity))
    }
}
