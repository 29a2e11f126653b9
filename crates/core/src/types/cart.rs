//! Cart line items.
//!
//! The cart itself is owned by the server; these are the line records it
//! returns and the payload used to add or adjust a line.

use serde::{Deserialize, Deserializer, Serialize};

use super::{Price, Product, ProductId};

/// One product entry in a cart.
///
/// The server guarantees at most one line per `product_id` and a quantity
/// of at least one; lines whose quantity reaches zero are removed
/// server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product this line refers to.
    ///
    /// Order history responses may embed the whole product document here;
    /// only its id is kept.
    #[serde(deserialize_with = "product_id_or_document")]
    pub product_id: ProductId,
    /// Product name at the time it was added.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Server-relative image path.
    #[serde(default)]
    pub image: String,
    /// Number of units, at least one.
    pub quantity: u32,
}

impl CartLine {
    /// Price of all units on this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Build the add/adjust payload for this line with a quantity delta.
    #[must_use]
    pub fn adjustment(&self, delta: i32) -> CartLineInput {
        CartLineInput {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
            quantity: delta,
        }
    }
}

/// Payload for `POST /cart/add`.
///
/// `quantity` is a delta: the server inserts a new line or adds the delta
/// to the existing line for `product_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub quantity: i32,
}

impl CartLineInput {
    /// Add `quantity` units of a menu product.
    #[must_use]
    pub fn for_product(product: &Product, quantity: i32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProductRef {
    Id(ProductId),
    Document {
        #[serde(rename = "_id")]
        id: ProductId,
    },
}

fn product_id_or_document<'de, D>(deserializer: D) -> Result<ProductId, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ProductRef::deserialize(deserializer)? {
        ProductRef::Id(id) | ProductRef::Document { id } => id,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_cart_line() {
        let line: CartLine = serde_json::from_value(json!({
            "_id": "line-1",
            "productId": "p-biryani",
            "name": "Prawn Biryani",
            "price": 200,
            "image": "uploads\\prawn.jpg",
            "quantity": 2
        }))
        .unwrap();

        assert_eq!(line.product_id.as_str(), "p-biryani");
        assert_eq!(line.line_total(), Price::rupees(400));
    }

    #[test]
    fn test_populated_product_reference() {
        let line: CartLine = serde_json::from_value(json!({
            "productId": { "_id": "p-curry", "category": "Coastal Curries" },
            "name": "Fish Curry",
            "price": 150,
            "quantity": 1
        }))
        .unwrap();

        assert_eq!(line.product_id.as_str(), "p-curry");
        assert!(line.image.is_empty());
    }

    #[test]
    fn test_adjustment_payload_uses_camel_case() {
        let line = CartLine {
            product_id: ProductId::new("p-1"),
            name: "Crab Roast".to_string(),
            price: Price::rupees(320),
            image: "uploads/crab.jpg".to_string(),
            quantity: 3,
        };

        let payload = serde_json::to_value(line.adjustment(-1)).unwrap();
        assert_eq!(
            payload,
            json!({
                "productId": "p-1",
                "name": "Crab Roast",
                "price": 320.0,
                "image": "uploads/crab.jpg",
                "quantity": -1
            })
        );
    }
}
