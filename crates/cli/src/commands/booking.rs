//! Booking command.

use beachstall_core::BookingCategory;
use chrono::{DateTime, NaiveDate, Utc};

use super::{App, CommandResult};

/// Parse an event date.
///
/// Accepts RFC 3339 timestamps, or a bare `YYYY-MM-DD` which is taken as
/// noon UTC on that day.
pub fn parse_event_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .map(|at| at.and_utc())
        .ok_or_else(|| format!("invalid date: {value} (expected YYYY-MM-DD)"))
}

#[allow(clippy::print_stdout)]
pub async fn book(app: &App, date: &str, category: &str) -> CommandResult {
    let event_date = parse_event_date(date)?;
    let category: BookingCategory = category.parse()?;

    let booking = app.book(event_date, category).await?;
    println!(
        "{} booked for {}",
        booking.category,
        booking.event_date.format("%A, %d %B %Y")
    );
    Ok(())
}
