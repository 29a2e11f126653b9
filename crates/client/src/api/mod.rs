//! Beach Stall REST API access.
//!
//! # Architecture
//!
//! - [`StallApi`] is the seam between the stores and the network. The
//!   stores only ever talk to the server through it, which keeps them
//!   testable against an in-memory fake.
//! - [`HttpApi`] implements it with `reqwest`, bearer-token auth and JSON
//!   bodies.
//! - The server is the source of truth for carts and orders; only the menu
//!   is cached (5 minute TTL via `moka`).
//!
//! # Endpoints
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | POST | `/auth/login` | - |
//! | GET | `/auth/me` | bearer |
//! | GET | `/cart` | bearer |
//! | POST | `/cart/add` | bearer |
//! | DELETE | `/cart/remove/{productId}` | bearer |
//! | POST | `/orders/create` | bearer |
//! | GET | `/orders/myorders` | bearer |
//! | GET | `/product/getProducts` | - |
//! | POST | `/bookings` | bearer |

mod http;

#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpApi;

use std::future::Future;

use beachstall_core::{
    CartLine, CartLineInput, Email, NewBooking, NewOrder, Order, Product, ProductId, UserProfile,
};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use crate::token::AuthToken;

/// Errors that can occur when talking to the stall API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("API error: {status} - {}", message.as_deref().unwrap_or("(no message)"))]
    Api {
        status: u16,
        /// The `message` field of the error body, when there was one.
        message: Option<String>,
    },

    /// Response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Message supplied by the server, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }

    /// Whether the server rejected the credentials or token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

/// Login request.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

/// Login response body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token; absent means the login did not succeed.
    #[serde(default)]
    pub token: Option<String>,
}

/// Operations the stores need from the stall API.
///
/// Every cart mutation returns the server's full line list, which callers
/// use to replace their local copy.
pub trait StallApi: Send + Sync {
    /// `POST /auth/login`.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    /// `GET /auth/me`.
    fn me(&self, token: &AuthToken) -> impl Future<Output = Result<UserProfile, ApiError>> + Send;

    /// `GET /cart`.
    fn get_cart(
        &self,
        token: &AuthToken,
    ) -> impl Future<Output = Result<Vec<CartLine>, ApiError>> + Send;

    /// `POST /cart/add` with a quantity delta.
    fn add_to_cart(
        &self,
        token: &AuthToken,
        line: &CartLineInput,
    ) -> impl Future<Output = Result<Vec<CartLine>, ApiError>> + Send;

    /// `DELETE /cart/remove/{productId}`.
    fn remove_from_cart(
        &self,
        token: &AuthToken,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<Vec<CartLine>, ApiError>> + Send;

    /// `POST /orders/create`.
    fn create_order(
        &self,
        token: &AuthToken,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send;

    /// `GET /orders/myorders`.
    fn my_orders(&self, token: &AuthToken)
    -> impl Future<Output = Result<Vec<Order>, ApiError>> + Send;

    /// `GET /product/getProducts`.
    fn products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// `POST /bookings`.
    fn create_booking(
        &self,
        token: &AuthToken,
        booking: &NewBooking,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Error body shape used by the stall API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Pull a human-readable message out of an error response body.
fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}
