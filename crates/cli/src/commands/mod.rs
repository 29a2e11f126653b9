//! CLI command implementations.

use beachstall_client::{FileTokenStore, HttpApi, Storefront};
use beachstall_core::PriceBreakdown;

pub mod account;
pub mod booking;
pub mod cart;
pub mod checkout;
pub mod menu;
pub mod orders;

/// Storefront wired to the real API and the token file.
pub type App = Storefront<HttpApi, FileTokenStore>;

/// Result type shared by every command.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

#[allow(clippy::print_stdout)]
fn print_breakdown(pricing: &PriceBreakdown) {
    println!("  {:<14}{}", "Subtotal", pricing.subtotal);
    if pricing.free_delivery() {
        println!("  {:<14}FREE", "Delivery");
    } else {
        println!("  {:<14}{}", "Delivery", pricing.delivery_fee);
    }
    if let Some(gst) = pricing.gst {
        println!("  {:<14}{gst}", "GST (5%)");
    }
    println!("  {:<14}{}", "Total", pricing.total());
}
