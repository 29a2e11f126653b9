//! Core types for Beach Stall.
//!
//! This module provides type-safe wrappers and wire models for the stall's
//! domain concepts.

pub mod booking;
pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;
pub mod user;

pub use booking::NewBooking;
pub use cart::{CartLine, CartLineInput};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{NewOrder, Order, ShippingAddress};
pub use price::Price;
pub use product::{CATEGORY_BIRYANI, CATEGORY_COASTAL_CURRIES, CATEGORY_MAIN_COURSE, Product};
pub use status::*;
pub use user::UserProfile;
