//! Cart store.
//!
//! The server owns the cart. This store holds a copy of the last line list
//! the server returned and replaces it wholesale on every successful
//! response; nothing is merged locally. A failed call leaves the copy as it
//! was.
//!
//! Mutations are serialized: while one is in flight, another is rejected
//! with [`CartError::MutationInFlight`] instead of racing it.

use std::sync::{Arc, PoisonError, RwLock};

use beachstall_core::{CartLine, CartLineInput, PriceBreakdown, ProductId};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::api::{ApiError, StallApi};
use crate::error::{add_breadcrumb, report};
use crate::session::Session;
use crate::token::AuthToken;

/// Shown when an anonymous user tries to change the cart.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login to add items to cart";

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Please login to add items to cart")]
    LoginRequired,

    /// Another cart request has not finished yet.
    #[error("Another cart update is still in progress")]
    MutationInFlight,

    /// `adjust_line` was asked about a product that is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Client-side copy of the server cart.
pub struct CartStore<A> {
    api: Arc<A>,
    lines: RwLock<Vec<CartLine>>,
    in_flight: Mutex<()>,
}

impl<A: StallApi> CartStore<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            lines: RwLock::new(Vec::new()),
            in_flight: Mutex::new(()),
        }
    }

    /// Snapshot of the current lines.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Total units across all lines, for the cart badge.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity))
    }

    /// Cart-page pricing, derived from the current lines.
    #[must_use]
    pub fn pricing(&self) -> PriceBreakdown {
        PriceBreakdown::cart(&self.lines.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Whether a cart request is currently outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Local-only reset. The server cart is left alone.
    pub fn clear(&self) {
        self.replace(Vec::new());
    }

    /// Replace the local copy with the server's list.
    ///
    /// Anonymous sessions get an empty cart without a network call.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MutationInFlight`] if another cart request is
    /// outstanding, or [`CartError::Api`] if the server call fails (the
    /// local copy is unchanged).
    #[instrument(skip_all)]
    pub async fn fetch_cart(&self, session: &Session) -> Result<(), CartError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| CartError::MutationInFlight)?;

        let Some(token) = session.token() else {
            debug!("Anonymous session, cart is empty");
            self.clear();
            return Ok(());
        };

        let lines = self
            .api
            .get_cart(token)
            .await
            .map_err(|e| Self::failed("fetch", e))?;
        self.replace(lines);
        Ok(())
    }

    /// Add a product or change its quantity by `line.quantity` (a delta).
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LoginRequired`] for anonymous sessions (no
    /// network call), [`CartError::MutationInFlight`] if another cart request
    /// is outstanding, or [`CartError::Api`] if the server call fails.
    #[instrument(skip_all, fields(product_id = %line.product_id, delta = line.quantity))]
    pub async fn add_or_adjust(
        &self,
        session: &Session,
        line: CartLineInput,
    ) -> Result<(), CartError> {
        let token = Self::require_token(session)?;
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| CartError::MutationInFlight)?;

        let lines = self
            .api
            .add_to_cart(token, &line)
            .await
            .map_err(|e| Self::failed("add", e))?;

        let delta = line.quantity.to_string();
        add_breadcrumb(
            "cart",
            "Cart line adjusted",
            Some(&[("product_id", line.product_id.as_str()), ("delta", delta.as_str())]),
        );
        self.replace(lines);
        Ok(())
    }

    /// Change the quantity of a line already in the cart.
    ///
    /// Unit fields are taken from the cached line. A delta that takes the
    /// quantity to zero is still sent; the server drops the line.
    ///
    /// # Errors
    ///
    /// As [`add_or_adjust`](Self::add_or_adjust), plus
    /// [`CartError::NotInCart`] if no cached line matches.
    pub async fn adjust_line(
        &self,
        session: &Session,
        product_id: &ProductId,
        delta: i32,
    ) -> Result<(), CartError> {
        Self::require_token(session)?;

        let input = self
            .lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|line| &line.product_id == product_id)
            .map(|line| line.adjustment(delta))
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;

        self.add_or_adjust(session, input).await
    }

    /// Remove a line entirely.
    ///
    /// # Errors
    ///
    /// Same as [`add_or_adjust`](Self::add_or_adjust).
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn remove_line(
        &self,
        session: &Session,
        product_id: &ProductId,
    ) -> Result<(), CartError> {
        let token = Self::require_token(session)?;
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| CartError::MutationInFlight)?;

        let lines = self
            .api
            .remove_from_cart(token, product_id)
            .await
            .map_err(|e| Self::failed("remove", e))?;

        add_breadcrumb(
            "cart",
            "Cart line removed",
            Some(&[("product_id", product_id.as_str())]),
        );
        self.replace(lines);
        Ok(())
    }

    fn require_token(session: &Session) -> Result<&AuthToken, CartError> {
        session.token().ok_or(CartError::LoginRequired)
    }

    fn replace(&self, lines: Vec<CartLine>) {
        *self.lines.write().unwrap_or_else(PoisonError::into_inner) = lines;
    }

    fn failed(operation: &str, error: ApiError) -> CartError {
        report(&error, &format!("Cart {operation} failed"));
        CartError::Api(error)
    }
}
