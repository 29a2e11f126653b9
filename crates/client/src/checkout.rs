//! Checkout coordinator.
//!
//! A small state machine around order placement:
//!
//! ```text
//! Editing ──submit──▶ Submitting ──▶ Succeeded
//!    ▲                    │
//!    └──── failure ◀──────┘
//! ```
//!
//! Validation happens locally before anything is sent: an empty cart or an
//! incomplete address never reaches the network. A failed submission returns
//! to `Editing` with the form untouched so the user can retry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use beachstall_core::{NewOrder, Order, OrderId, PaymentMethod, PriceBreakdown, ShippingAddress};
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::{ApiError, StallApi};
use crate::cart::CartStore;
use crate::error::{add_breadcrumb, report};
use crate::session::Session;

/// Where the user is sent after a successful order.
pub const ORDER_HISTORY_PATH: &str = "/profile/orders";

/// How long the confirmation is shown before redirecting.
pub const CONFIRMATION_DELAY: Duration = Duration::from_secs(2);

/// Shown when order creation fails without a server message.
pub const CHECKOUT_FAILED_FALLBACK: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please login to place an order")]
    LoginRequired,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please fill all shipping details")]
    IncompleteAddress,

    #[error("Your order is already being placed")]
    SubmissionInFlight,

    /// The order went through; call `start_new_order` before editing again.
    #[error("This order has already been placed")]
    AlreadyPlaced,

    /// Order creation failed; `message` is what the user sees.
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: Option<ApiError>,
    },
}

impl CheckoutError {
    /// Whether the error was caught locally, before any request was sent.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyCart | Self::IncompleteAddress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    #[default]
    Editing,
    Submitting,
    Succeeded,
}

/// One of the three shipping form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Address,
    City,
    Phone,
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub order_id: OrderId,
    /// View to navigate to once the confirmation has been shown.
    pub redirect_to: &'static str,
    pub redirect_after: Duration,
}

#[derive(Debug, Default)]
struct CheckoutState {
    phase: CheckoutPhase,
    address: ShippingAddress,
    payment_method: PaymentMethod,
    last_error: Option<String>,
}

/// Drives a single checkout form.
pub struct CheckoutCoordinator<A> {
    api: Arc<A>,
    state: Mutex<CheckoutState>,
}

/// Puts the coordinator back into `Editing` if a submission ends (or is
/// dropped) without reaching `Succeeded`.
struct SubmittingGuard<'a> {
    state: &'a Mutex<CheckoutState>,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.phase == CheckoutPhase::Submitting {
            state.phase = CheckoutPhase::Editing;
        }
    }
}

impl<A: StallApi> CheckoutCoordinator<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Mutex::new(CheckoutState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CheckoutState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn editable(&self) -> Result<MutexGuard<'_, CheckoutState>, CheckoutError> {
        let state = self.lock();
        match state.phase {
            CheckoutPhase::Editing => Ok(state),
            CheckoutPhase::Submitting => Err(CheckoutError::SubmissionInFlight),
            CheckoutPhase::Succeeded => Err(CheckoutError::AlreadyPlaced),
        }
    }

    #[must_use]
    pub fn phase(&self) -> CheckoutPhase {
        self.lock().phase
    }

    #[must_use]
    pub fn address(&self) -> ShippingAddress {
        self.lock().address.clone()
    }

    #[must_use]
    pub fn payment_method(&self) -> PaymentMethod {
        self.lock().payment_method
    }

    /// Message from the last failed submit, cleared by the next attempt.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Replace the whole shipping address.
    ///
    /// # Errors
    ///
    /// Rejected unless the form is in `Editing`.
    pub fn set_address(&self, address: ShippingAddress) -> Result<(), CheckoutError> {
        self.editable()?.address = address;
        Ok(())
    }

    /// Update one shipping field.
    ///
    /// # Errors
    ///
    /// Rejected unless the form is in `Editing`.
    pub fn set_field(&self, field: AddressField, value: impl Into<String>) -> Result<(), CheckoutError> {
        let mut state = self.editable()?;
        let slot = match field {
            AddressField::Address => &mut state.address.address,
            AddressField::City => &mut state.address.city,
            AddressField::Phone => &mut state.address.phone,
        };
        *slot = value.into();
        Ok(())
    }

    /// # Errors
    ///
    /// Rejected unless the form is in `Editing`.
    pub fn set_payment_method(&self, method: PaymentMethod) -> Result<(), CheckoutError> {
        self.editable()?.payment_method = method;
        Ok(())
    }

    /// Checkout pricing for the cart as it stands, GST included.
    #[must_use]
    pub fn preview(&self, cart: &CartStore<A>) -> PriceBreakdown {
        PriceBreakdown::checkout(&cart.lines())
    }

    /// Reset a placed order's form so another order can be started.
    pub fn start_new_order(&self) {
        let mut state = self.lock();
        if state.phase == CheckoutPhase::Succeeded {
            *state = CheckoutState::default();
        }
    }

    /// Validate the form and place the order.
    ///
    /// On success the cart is cleared locally and the outcome says where to
    /// send the user. On failure the form is back in `Editing` with every
    /// field as it was.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::SubmissionInFlight`] / [`CheckoutError::AlreadyPlaced`]
    ///   if the form is not in `Editing`
    /// - [`CheckoutError::LoginRequired`] for anonymous sessions
    /// - [`CheckoutError::EmptyCart`] / [`CheckoutError::IncompleteAddress`]
    ///   when validation fails; nothing is sent
    /// - [`CheckoutError::Failed`] when the server rejects the order
    #[instrument(skip_all)]
    pub async fn submit(
        &self,
        session: &Session,
        cart: &CartStore<A>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let (token, order) = {
            let mut state = self.editable()?;
            let token = session.token().ok_or(CheckoutError::LoginRequired)?;

            let lines = cart.lines();
            let invalid = if lines.is_empty() {
                Some(CheckoutError::EmptyCart)
            } else if !state.address.is_complete() {
                Some(CheckoutError::IncompleteAddress)
            } else {
                None
            };
            if let Some(err) = invalid {
                state.last_error = Some(err.to_string());
                return Err(err);
            }

            let total_price = PriceBreakdown::checkout(&lines).total();
            state.phase = CheckoutPhase::Submitting;
            state.last_error = None;

            let order = NewOrder {
                order_items: lines,
                shipping_address: state.address.clone(),
                total_price,
                payment_method: state.payment_method,
            };
            (token, order)
        };

        let _guard = SubmittingGuard { state: &self.state };
        let total = order.total_price.to_string();
        add_breadcrumb(
            "checkout",
            "Order submitted",
            Some(&[("total", total.as_str())]),
        );

        let result = self.api.create_order(token, &order).await;

        match result {
            Ok(created) => match created.id.clone() {
                Some(order_id) => {
                    info!(order_id = %order_id, total = %order.total_price, "Order placed");
                    self.lock().phase = CheckoutPhase::Succeeded;
                    cart.clear();
                    Ok(CheckoutOutcome {
                        order: created,
                        order_id,
                        redirect_to: ORDER_HISTORY_PATH,
                        redirect_after: CONFIRMATION_DELAY,
                    })
                }
                None => {
                    tracing::error!("Order creation response had no id");
                    Err(self.fail(CHECKOUT_FAILED_FALLBACK.to_string(), None))
                }
            },
            Err(e) => {
                report(&e, "Order creation failed");
                let message = e
                    .server_message()
                    .unwrap_or(CHECKOUT_FAILED_FALLBACK)
                    .to_string();
                Err(self.fail(message, Some(e)))
            }
        }
    }

    fn fail(&self, message: String, source: Option<ApiError>) -> CheckoutError {
        let mut state = self.lock();
        state.phase = CheckoutPhase::Editing;
        state.last_error = Some(message.clone());
        CheckoutError::Failed { message, source }
    }
}
