//! Client state shared by a front end.

use std::sync::Arc;

use beachstall_core::{BookingCategory, CartLineInput, Email, NewBooking, Order, Product};
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use url::Url;

use crate::api::{ApiError, HttpApi, StallApi};
use crate::booking::{self, BookingError};
use crate::cart::{CartError, CartStore};
use crate::checkout::{CheckoutCoordinator, CheckoutError, CheckoutOutcome};
use crate::config::ClientConfig;
use crate::menu::{self, Menu};
use crate::orders::{self, OrdersError};
use crate::session::{AuthError, Session, SessionStore};
use crate::token::{FileTokenStore, TokenStore};

/// The session, cart and checkout stores wired to one API client.
///
/// The session store is the single writer of the session; the cart and
/// checkout stores only ever see it by reference.
pub struct Storefront<A, T> {
    api: Arc<A>,
    session: SessionStore<A, T>,
    cart: CartStore<A>,
    checkout: CheckoutCoordinator<A>,
    asset_url: Url,
}

impl Storefront<HttpApi, FileTokenStore> {
    /// Build the stores for the configured API and token file.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            Arc::new(HttpApi::new(config)),
            FileTokenStore::new(&config.token_file),
            config.asset_url.clone(),
        )
    }
}

impl<A: StallApi, T: TokenStore> Storefront<A, T> {
    /// Create a new storefront state.
    ///
    /// # Arguments
    ///
    /// * `api` - API client shared by every store
    /// * `tokens` - Where the bearer token is persisted
    /// * `asset_url` - Base URL for product images
    pub fn new(api: Arc<A>, tokens: T, asset_url: Url) -> Self {
        Self {
            session: SessionStore::new(api.clone(), tokens),
            cart: CartStore::new(api.clone()),
            checkout: CheckoutCoordinator::new(api.clone()),
            api,
            asset_url,
        }
    }

    /// Restore the session, then load the cart for it.
    ///
    /// The cart is only fetched once the session check has finished, so it
    /// is never requested with a token that is about to be discarded. A
    /// failed cart fetch leaves the cart empty; it is logged, not returned.
    pub async fn start(&mut self) -> &Session {
        self.session.check_session().await;
        self.refresh_cart().await;
        self.session.session()
    }

    /// Log in and load the user's cart.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the login fails; the session stays
    /// anonymous.
    pub async fn login(
        &mut self,
        email: &Email,
        password: SecretString,
    ) -> Result<&Session, AuthError> {
        self.session.login(email, password).await?;
        self.refresh_cart().await;
        Ok(self.session.session())
    }

    /// Log out and drop the local cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted token could not be removed.
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.cart.clear();
        self.session.logout()
    }

    async fn refresh_cart(&self) {
        if let Err(e) = self.cart.fetch_cart(self.session.session()).await {
            tracing::warn!(error = %e, "Could not load cart");
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        self.session.session()
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<A> {
        &self.cart
    }

    #[must_use]
    pub const fn checkout(&self) -> &CheckoutCoordinator<A> {
        &self.checkout
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch the menu.
    ///
    /// # Errors
    ///
    /// Returns the API error if the products could not be loaded.
    pub async fn menu(&self) -> Result<Menu, ApiError> {
        Menu::load(self.api.as_ref()).await
    }

    /// Absolute URL of a product's image.
    #[must_use]
    pub fn image_url(&self, product: &Product) -> String {
        menu::image_url(&self.asset_url, &product.image)
    }

    /// Add `quantity` units of a product to the cart.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_or_adjust`].
    pub async fn add_to_cart(&self, product: &Product, quantity: i32) -> Result<(), CartError> {
        self.cart
            .add_or_adjust(self.session(), CartLineInput::for_product(product, quantity))
            .await
    }

    /// Place an order from the current cart.
    ///
    /// # Errors
    ///
    /// See [`CheckoutCoordinator::submit`].
    pub async fn submit_checkout(&self) -> Result<CheckoutOutcome, CheckoutError> {
        self.checkout.submit(self.session(), &self.cart).await
    }

    /// The user's past orders.
    ///
    /// # Errors
    ///
    /// See [`orders::order_history`].
    pub async fn order_history(&self) -> Result<Vec<Order>, OrdersError> {
        orders::order_history(self.api.as_ref(), self.session()).await
    }

    /// Book an event for `event_date`.
    ///
    /// # Errors
    ///
    /// See [`booking::book`].
    pub async fn book(
        &self,
        event_date: DateTime<Utc>,
        category: BookingCategory,
    ) -> Result<NewBooking, BookingError> {
        booking::book(
            self.api.as_ref(),
            self.session(),
            event_date,
            category,
            Utc::now(),
        )
        .await
    }
}
