//! Menu products.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Category label for biryani dishes.
pub const CATEGORY_BIRYANI: &str = "Biryani";
/// Category label for main courses (listed alongside biryanis).
pub const CATEGORY_MAIN_COURSE: &str = "Main Course";
/// Category label for coastal curries.
pub const CATEGORY_COASTAL_CURRIES: &str = "Coastal Curries";

/// A dish on the stall's menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Dish name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Server-relative image path (may use Windows separators).
    #[serde(default)]
    pub image: String,
    /// Menu category, kept verbatim.
    #[serde(default)]
    pub category: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

impl Product {
    /// Description to show, falling back to the stall's house blurb.
    #[must_use]
    pub fn description_or_default(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("Authentic spices blended with premium coastal flavors.")
    }
}
