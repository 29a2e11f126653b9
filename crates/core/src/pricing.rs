//! Cart pricing.
//!
//! Pure functions of the cart's line list. Nothing here is cached: callers
//! recompute a [`PriceBreakdown`] whenever they need one, so it can never
//! drift from the cart it was derived from.
//!
//! - subtotal: `Σ price × quantity`, exact
//! - delivery fee: free above ₹500 or for an empty cart, otherwise a flat ₹40
//! - GST: 5% of the subtotal, applied only at checkout

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{CartLine, Price};

/// Subtotal above which delivery is free (exclusive).
pub const FREE_DELIVERY_THRESHOLD: Price = Price::new(Decimal::from_parts(500, 0, 0, false, 0));

/// Flat delivery fee charged at or below the threshold.
pub const DELIVERY_FEE: Price = Price::new(Decimal::from_parts(40, 0, 0, false, 0));

/// GST rate applied to the subtotal at checkout (5%).
pub const GST_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Sum of `price × quantity` over all lines.
#[must_use]
pub fn subtotal(lines: &[CartLine]) -> Price {
    lines.iter().map(CartLine::line_total).sum()
}

/// Delivery fee for a subtotal.
///
/// A step function: zero for an empty cart or a subtotal strictly above
/// [`FREE_DELIVERY_THRESHOLD`], otherwise [`DELIVERY_FEE`]. A subtotal of
/// exactly ₹500 still pays delivery.
#[must_use]
pub fn delivery_fee(subtotal: Price) -> Price {
    if subtotal.is_zero() || subtotal > FREE_DELIVERY_THRESHOLD {
        Price::ZERO
    } else {
        DELIVERY_FEE
    }
}

/// GST on a subtotal.
#[must_use]
pub fn gst(subtotal: Price) -> Price {
    subtotal * GST_RATE
}

/// Derived prices for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    pub subtotal: Price,
    pub delivery_fee: Price,
    /// GST, present only for checkout breakdowns.
    pub gst: Option<Price>,
}

impl PriceBreakdown {
    /// Breakdown shown on the cart page: subtotal plus delivery.
    #[must_use]
    pub fn cart(lines: &[CartLine]) -> Self {
        let subtotal = subtotal(lines);
        Self {
            subtotal,
            delivery_fee: delivery_fee(subtotal),
            gst: None,
        }
    }

    /// Breakdown charged at checkout: subtotal, delivery and GST.
    #[must_use]
    pub fn checkout(lines: &[CartLine]) -> Self {
        let subtotal = subtotal(lines);
        Self {
            subtotal,
            delivery_fee: delivery_fee(subtotal),
            gst: Some(gst(subtotal)),
        }
    }

    /// Whether delivery is free for this breakdown.
    #[must_use]
    pub const fn free_delivery(&self) -> bool {
        self.delivery_fee.is_zero()
    }

    /// Grand total.
    #[must_use]
    pub fn total(&self) -> Price {
        self.subtotal + self.delivery_fee + self.gst.unwrap_or(Price::ZERO)
    }
}
