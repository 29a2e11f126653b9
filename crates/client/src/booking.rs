//! Event and table bookings.

use beachstall_core::{BookingCategory, NewBooking};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, instrument};

use crate::api::{ApiError, StallApi};
use crate::error::{add_breadcrumb, report};
use crate::session::Session;

/// Shown when a booking fails without a server message.
pub const BOOKING_FAILED_FALLBACK: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Please login to make a booking")]
    LoginRequired,

    #[error("Please choose a date in the future")]
    DateInPast,

    /// The server rejected the booking; `message` is what the user sees.
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: ApiError,
    },
}

/// Book an event or a table.
///
/// `now` is the reference time for rejecting past dates.
///
/// # Errors
///
/// Returns [`BookingError::LoginRequired`] or [`BookingError::DateInPast`]
/// without calling the server, or [`BookingError::Failed`] with the server's
/// message (or [`BOOKING_FAILED_FALLBACK`]).
#[instrument(skip_all, fields(category = %category, event_date = %event_date))]
pub async fn book<A: StallApi>(
    api: &A,
    session: &Session,
    event_date: DateTime<Utc>,
    category: BookingCategory,
    now: DateTime<Utc>,
) -> Result<NewBooking, BookingError> {
    let token = session.token().ok_or(BookingError::LoginRequired)?;
    if event_date < now {
        return Err(BookingError::DateInPast);
    }

    let booking = NewBooking {
        event_date,
        category,
    };

    if let Err(e) = api.create_booking(token, &booking).await {
        report(&e, "Booking failed");
        let message = e
            .server_message()
            .unwrap_or(BOOKING_FAILED_FALLBACK)
            .to_string();
        return Err(BookingError::Failed { message, source: e });
    }

    info!(event_date = %booking.event_date, "Booking confirmed");
    add_breadcrumb("booking", "Booking confirmed", Some(&[("category", category.as_str())]));
    Ok(booking)
}
