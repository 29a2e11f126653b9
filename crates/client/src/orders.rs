//! Order history.

use beachstall_core::Order;
use thiserror::Error;
use tracing::instrument;

use crate::api::{ApiError, StallApi};
use crate::error::report;
use crate::session::Session;

#[derive(Debug, Error)]
pub enum OrdersError {
    #[error("Please login to view your orders")]
    LoginRequired,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Orders placed by the logged-in user, as the server returns them.
///
/// # Errors
///
/// Returns [`OrdersError::LoginRequired`] for anonymous sessions without
/// calling the server, or the API error if the request fails.
#[instrument(skip_all)]
pub async fn order_history<A: StallApi>(
    api: &A,
    session: &Session,
) -> Result<Vec<Order>, OrdersError> {
    let token = session.token().ok_or(OrdersError::LoginRequired)?;
    api.my_orders(token).await.map_err(|e| {
        report(&e, "Failed to load order history");
        OrdersError::Api(e)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use beachstall_core::{OrderId, OrderStatus, Price, ShippingAddress, UserId, UserProfile, UserRole};

    use super::*;
    use crate::api::fake::{Endpoint, FakeApi};

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: Some(OrderId::new(id)),
            order_items: Vec::new(),
            shipping_address: ShippingAddress::default(),
            total_price: Price::rupees(250),
            payment_method: "UPI".to_string(),
            status,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_anonymous_history_makes_no_request() {
        let api = FakeApi::new();
        let err = order_history(&api, &Session::Anonymous).await.unwrap_err();
        assert!(matches!(err, OrdersError::LoginRequired));
        assert_eq!(api.calls(Endpoint::MyOrders), 0);
    }

    #[tokio::test]
    async fn test_history_is_returned_in_server_order() {
        let api = FakeApi::new().with_history(vec![
            order("o-2", OrderStatus::Pending),
            order("o-1", OrderStatus::Delivered),
        ]);
        let session = Session::Authenticated {
            token: FakeApi::token(),
            user: UserProfile {
                id: UserId::new("u-asha"),
                name: "Asha".to_string(),
                email: None,
                role: UserRole::User,
            },
        };

        let orders = order_history(&api, &session).await.unwrap();
        let ids: Vec<_> = orders.iter().filter_map(|o| o.id.as_ref()).map(OrderId::as_str).collect();
        assert_eq!(ids, ["o-2", "o-1"]);
    }
}
