//! `reqwest` implementation of [`StallApi`].
//!
//! Caches the menu using `moka` (5-minute TTL). Cart, order and booking
//! calls are never cached.

use std::sync::Arc;
use std::time::Duration;

use beachstall_core::{
    CartLine, CartLineInput, NewBooking, NewOrder, Order, Product, ProductId, UserProfile,
};
use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, Credentials, LoginResponse, StallApi, extract_message};
use crate::config::ClientConfig;
use crate::token::AuthToken;

const PRODUCTS_CACHE_KEY: &str = "products";

/// Longest slice of a response body copied into logs.
const LOGGED_BODY_CHARS: usize = 500;

/// Cart responses wrap the line list in a cart document.
#[derive(Debug, Deserialize)]
struct CartEnvelope {
    #[serde(default)]
    items: Vec<CartLine>,
}

// =============================================================================
// HttpApi
// =============================================================================

/// Client for the stall's REST API.
///
/// Cheap to clone; clones share the connection pool and menu cache.
#[derive(Clone)]
pub struct HttpApi {
    inner: Arc<HttpApiInner>,
}

struct HttpApiInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<&'static str, Vec<Product>>,
}

impl HttpApi {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config.api_url.clone())
    }

    /// Create a client around an existing `reqwest::Client`.
    ///
    /// `base_url` should end in `/` so endpoint paths are appended to it.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(HttpApiInner {
                client,
                base_url,
                cache,
            }),
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop the cached menu so the next call refetches it.
    pub async fn invalidate_products(&self) {
        self.inner.cache.invalidate(PRODUCTS_CACHE_KEY).await;
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and decode a JSON success body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send_raw(request).await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse stall API response"
            );
            ApiError::Parse(e.to_string())
        })
    }

    /// Send a request and return the success body as text.
    async fn send_raw(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = extract_message(&body);
            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    body = %truncate(&body),
                    "Stall API returned server error"
                );
            } else {
                debug!(status = %status, message = ?message, "Stall API rejected request");
            }
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOGGED_BODY_CHARS).collect()
}

impl StallApi for HttpApi {
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let body = serde_json::json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });
        let request = self
            .inner
            .client
            .post(self.endpoint("auth/login")?)
            .json(&body);
        self.send(request).await
    }

    #[instrument(skip_all)]
    async fn me(&self, token: &AuthToken) -> Result<UserProfile, ApiError> {
        let request = self
            .inner
            .client
            .get(self.endpoint("auth/me")?)
            .bearer_auth(token.expose());
        self.send(request).await
    }

    #[instrument(skip_all)]
    async fn get_cart(&self, token: &AuthToken) -> Result<Vec<CartLine>, ApiError> {
        let request = self
            .inner
            .client
            .get(self.endpoint("cart")?)
            .bearer_auth(token.expose());
        let cart: CartEnvelope = self.send(request).await?;
        Ok(cart.items)
    }

    #[instrument(skip(self, token, line), fields(product_id = %line.product_id, delta = line.quantity))]
    async fn add_to_cart(
        &self,
        token: &AuthToken,
        line: &CartLineInput,
    ) -> Result<Vec<CartLine>, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("cart/add")?)
            .bearer_auth(token.expose())
            .json(line);
        let cart: CartEnvelope = self.send(request).await?;
        Ok(cart.items)
    }

    #[instrument(skip(self, token), fields(product_id = %product_id))]
    async fn remove_from_cart(
        &self,
        token: &AuthToken,
        product_id: &ProductId,
    ) -> Result<Vec<CartLine>, ApiError> {
        let path = format!("cart/remove/{}", urlencoding::encode(product_id.as_str()));
        let request = self
            .inner
            .client
            .delete(self.endpoint(&path)?)
            .bearer_auth(token.expose());
        let cart: CartEnvelope = self.send(request).await?;
        Ok(cart.items)
    }

    #[instrument(skip(self, token, order), fields(items = order.order_items.len(), total = %order.total_price))]
    async fn create_order(&self, token: &AuthToken, order: &NewOrder) -> Result<Order, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("orders/create")?)
            .bearer_auth(token.expose())
            .json(order);
        self.send(request).await
    }

    #[instrument(skip_all)]
    async fn my_orders(&self, token: &AuthToken) -> Result<Vec<Order>, ApiError> {
        let request = self
            .inner
            .client
            .get(self.endpoint("orders/myorders")?)
            .bearer_auth(token.expose());
        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(products) = self.inner.cache.get(PRODUCTS_CACHE_KEY).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let request = self.inner.client.get(self.endpoint("product/getProducts")?);
        let products: Vec<Product> = self.send(request).await?;

        self.inner
            .cache
            .insert(PRODUCTS_CACHE_KEY, products.clone())
            .await;

        Ok(products)
    }

    #[instrument(skip(self, token), fields(category = %booking.category))]
    async fn create_booking(&self, token: &AuthToken, booking: &NewBooking) -> Result<(), ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint("bookings")?)
            .bearer_auth(token.expose())
            .json(booking);
        self.send_raw(request).await.map(drop)
    }
}
