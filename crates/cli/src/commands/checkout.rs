//! Checkout command.

use beachstall_client::AddressField;
use beachstall_core::PaymentMethod;

use super::{App, CommandResult, print_breakdown};

/// Shipping and payment details from the command line.
pub struct CheckoutForm {
    pub address: String,
    pub city: String,
    pub phone: String,
    pub payment: String,
}

/// Place the order, then show the order history once the confirmation delay
/// has passed.
#[allow(clippy::print_stdout)]
pub async fn place_order(app: &App, form: CheckoutForm) -> CommandResult {
    let payment: PaymentMethod = form.payment.parse()?;

    let checkout = app.checkout();
    checkout.set_field(AddressField::Address, form.address)?;
    checkout.set_field(AddressField::City, form.city)?;
    checkout.set_field(AddressField::Phone, form.phone)?;
    checkout.set_payment_method(payment)?;

    if !app.cart().is_empty() {
        println!("Order summary");
        print_breakdown(&checkout.preview(app.cart()));
        println!();
    }

    let outcome = app.submit_checkout().await?;
    println!("Order placed successfully! Order ID: {}", outcome.order_id);
    println!("Taking you to your orders...");
    tokio::time::sleep(outcome.redirect_after).await;

    super::orders::list(app).await
}
