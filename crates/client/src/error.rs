//! Unified error handling with Sentry integration.
//!
//! Each store has its own error enum; [`ClientError`] gathers them for
//! callers that drive several stores. Server and network failures are
//! captured to Sentry through [`report`]; validation and "please log in"
//! errors are expected and never reported.

use thiserror::Error;

use crate::api::ApiError;
use crate::booking::BookingError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::orders::OrdersError;
use crate::session::AuthError;
use crate::token::TokenStoreError;

/// Any error the client library can return.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Orders error: {0}")]
    Orders(#[from] OrdersError),

    #[error("Booking error: {0}")]
    Booking(#[from] BookingError),

    #[error("Token storage error: {0}")]
    TokenStore(#[from] TokenStoreError),
}

impl ClientError {
    /// Text suitable for showing to the user.
    ///
    /// Store errors already carry user-facing messages; transport and
    /// parsing details are replaced by a generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e)
            | Self::Cart(CartError::Api(e))
            | Self::Orders(OrdersError::Api(e)) => e
                .server_message()
                .unwrap_or("Something went wrong")
                .to_string(),
            Self::Auth(e) => e.to_string(),
            Self::Cart(e) => e.to_string(),
            Self::Checkout(e) => e.to_string(),
            Self::Orders(e) => e.to_string(),
            Self::Booking(e) => e.to_string(),
            Self::Config(_) | Self::TokenStore(_) => self.to_string(),
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Log a failed API call and capture it to Sentry.
///
/// Rejected credentials are logged at warn level only: an expired token is
/// routine and the caller demotes the session instead.
pub fn report(error: &ApiError, context: &str) {
    if error.is_unauthorized() {
        tracing::warn!(error = %error, "{context}");
        return;
    }

    let event_id = sentry::capture_error(error);
    tracing::error!(
        error = %error,
        sentry_event_id = %event_id,
        "{context}"
    );
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Cart line removed", Some(&[("product_id", "p-1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = ClientError::from(CartError::Api(ApiError::Api {
            status: 400,
            message: Some("Product unavailable".to_string()),
        }));
        assert_eq!(err.user_message(), "Product unavailable");

        let err = ClientError::from(ApiError::Parse("expected value".to_string()));
        assert_eq!(err.user_message(), "Something went wrong");
    }

    #[test]
    fn test_user_message_for_store_errors() {
        let err = ClientError::from(CartError::LoginRequired);
        assert_eq!(err.user_message(), "Please login to add items to cart");

        let err = ClientError::from(CheckoutError::IncompleteAddress);
        assert_eq!(err.user_message(), "Please fill all shipping details");

        let err = ClientError::from(AuthError::LoginFailed("Invalid email or password".to_string()));
        assert_eq!(err.user_message(), "Invalid email or password");
    }

    #[test]
    fn test_client_error_display() {
        let err = ClientError::from(CartError::MutationInFlight);
        assert_eq!(
            err.to_string(),
            "Cart error: Another cart update is still in progress"
        );
    }
}
