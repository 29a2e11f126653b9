//! Event and table bookings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BookingCategory;

/// Payload for `POST /bookings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    /// When the event takes place.
    pub event_date: DateTime<Utc>,
    /// What is being booked.
    pub category: BookingCategory,
}
