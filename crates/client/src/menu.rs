//! Menu browsing.
//!
//! Products come from `GET /product/getProducts` and are grouped into the
//! sections the stall shows on its home page.

use beachstall_core::{
    CATEGORY_BIRYANI, CATEGORY_COASTAL_CURRIES, CATEGORY_MAIN_COURSE, Product, ProductId,
};
use tracing::instrument;
use url::Url;

use crate::api::{ApiError, StallApi};
use crate::error::report;

/// Image shown for products without a stored image.
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/400x500?text=No+Image";

/// Heading and categories of each home-page section, in display order.
const SECTIONS: &[(&str, &[&str])] = &[
    ("Signature Biryanis", &[CATEGORY_BIRYANI, CATEGORY_MAIN_COURSE]),
    ("Coastal Curries", &[CATEGORY_COASTAL_CURRIES]),
];

/// A titled group of products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection<'a> {
    pub title: &'static str,
    pub products: Vec<&'a Product>,
}

/// The full product list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    products: Vec<Product>,
}

impl Menu {
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Fetch the menu.
    ///
    /// # Errors
    ///
    /// Returns the API error if the product list could not be loaded.
    #[instrument(skip_all)]
    pub async fn load<A: StallApi>(api: &A) -> Result<Self, ApiError> {
        match api.products().await {
            Ok(products) => Ok(Self::new(products)),
            Err(e) => {
                report(&e, "Failed to load menu");
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products whose category matches exactly.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products.iter().filter(move |p| p.category == category)
    }

    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Home-page sections. Products in other categories are not shown.
    #[must_use]
    pub fn sections(&self) -> Vec<MenuSection<'_>> {
        SECTIONS
            .iter()
            .map(|&(title, categories)| MenuSection {
                title,
                products: self
                    .products
                    .iter()
                    .filter(|p| categories.iter().any(|c| *c == p.category))
                    .collect(),
            })
            .collect()
    }
}

/// Absolute URL for a stored image path.
///
/// Paths saved on Windows hosts use back-slashes; they are normalised before
/// joining. An empty path, or one that cannot be joined, yields
/// [`PLACEHOLDER_IMAGE_URL`].
#[must_use]
pub fn image_url(asset_base: &Url, path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        return PLACEHOLDER_IMAGE_URL.to_string();
    }
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let normalised = path.replace('\\', "/");
    asset_base
        .join(normalised.trim_start_matches('/'))
        .map_or_else(|_| PLACEHOLDER_IMAGE_URL.to_string(), String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::api::fake::{Endpoint, FakeApi, product};

    fn menu() -> Menu {
        Menu::new(vec![
            product("p-1", "Prawn Biryani", 260, "Biryani"),
            product("p-2", "Fish Curry", 180, "Coastal Curries"),
            product("p-3", "Ghee Rice", 120, "Main Course"),
            product("p-4", "Lime Soda", 40, "Drinks"),
        ])
    }

    #[test]
    fn test_sections_group_categories() {
        let menu = menu();
        let sections = menu.sections();

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Signature Biryanis");
        let names: Vec<_> = sections[0].products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Prawn Biryani", "Ghee Rice"]);
        assert_eq!(sections[1].title, "Coastal Curries");
        assert_eq!(sections[1].products.len(), 1);
    }

    #[test]
    fn test_by_category_and_find() {
        let menu = menu();
        assert_eq!(menu.by_category("Drinks").count(), 1);
        assert_eq!(menu.by_category("drinks").count(), 0);
        assert_eq!(
            menu.find(&ProductId::new("p-3")).map(|p| p.name.as_str()),
            Some("Ghee Rice")
        );
        assert!(menu.find(&ProductId::new("p-9")).is_none());
    }

    #[test]
    fn test_image_url_normalises_backslashes() {
        let base = Url::parse("https://beachstall-server.vercel.app/").unwrap();
        assert_eq!(
            image_url(&base, "uploads\\prawn-biryani.jpg"),
            "https://beachstall-server.vercel.app/uploads/prawn-biryani.jpg"
        );
        assert_eq!(
            image_url(&base, "/uploads/curry.png"),
            "https://beachstall-server.vercel.app/uploads/curry.png"
        );
    }

    #[test]
    fn test_image_url_placeholder_and_absolute() {
        let base = Url::parse("https://beachstall-server.vercel.app/").unwrap();
        assert_eq!(image_url(&base, ""), PLACEHOLDER_IMAGE_URL);
        assert_eq!(image_url(&base, "   "), PLACEHOLDER_IMAGE_URL);
        assert_eq!(
            image_url(&base, "https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
    }

    #[tokio::test]
    async fn test_load_menu() {
        let api = FakeApi::new().with_products(menu().products().to_vec());

        let loaded = Menu::load(&api).await.unwrap();
        assert_eq!(loaded, menu());

        api.fail(Endpoint::Products, 503, None);
        assert!(Menu::load(&api).await.is_err());
    }
}
