//! Beach Stall Core - Shared types and pricing.
//!
//! This crate provides the domain types used across the Beach Stall client
//! components:
//! - `client` - API client and the session, cart and checkout stores
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Everything the server owns (cart, orders, bookings) is modelled
//! here as plain serializable data matching the wire format.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, emails, statuses and entity models
//! - [`pricing`] - Subtotal, delivery fee, GST and totals for a cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::PriceBreakdown;
pub use types::*;
