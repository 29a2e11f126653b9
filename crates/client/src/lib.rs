//! Beach Stall storefront client library.
//!
//! Talks to the stall's REST API and keeps the client-side state a front end
//! needs: the login session, a copy of the server-held cart, and the
//! checkout form. Pricing lives in `beachstall-core`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod booking;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod menu;
pub mod orders;
pub mod session;
pub mod state;
pub mod token;

pub use api::{ApiError, HttpApi, StallApi};
pub use cart::{CartError, CartStore};
pub use checkout::{AddressField, CheckoutCoordinator, CheckoutError, CheckoutOutcome, CheckoutPhase};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use session::{AuthError, Session, SessionStore};
pub use state::Storefront;
pub use token::{AuthToken, FileTokenStore, MemoryTokenStore, TokenStore};
