//! Cart commands.

use beachstall_core::ProductId;

use super::{App, CommandResult, print_breakdown};

#[allow(clippy::print_stdout)]
pub fn show(app: &App) {
    if !app.session().is_authenticated() {
        println!("Please login to see your cart");
        return;
    }

    let lines = app.cart().lines();
    if lines.is_empty() {
        println!("Your cart is empty");
        return;
    }

    for line in &lines {
        println!(
            "  {:<26} {:>3} x {:>8} = {}",
            line.name,
            line.quantity,
            line.price.to_string(),
            line.line_total()
        );
    }
    println!();
    print_breakdown(&app.cart().pricing());
}

/// Add a menu product to the cart.
pub async fn add(app: &App, product_id: &str, quantity: i32) -> CommandResult {
    if quantity < 1 {
        return Err("Quantity must be at least 1".into());
    }

    let menu = app.menu().await?;
    let product = menu
        .find(&ProductId::new(product_id))
        .ok_or_else(|| format!("No product with id {product_id} on the menu"))?;

    app.add_to_cart(product, quantity).await?;
    show(app);
    Ok(())
}

/// Change the quantity of a line in the cart by `delta`.
pub async fn adjust(app: &App, product_id: &str, delta: i32) -> CommandResult {
    app.cart()
        .adjust_line(app.session(), &ProductId::new(product_id), delta)
        .await?;
    show(app);
    Ok(())
}

pub async fn remove(app: &App, product_id: &str) -> CommandResult {
    app.cart()
        .remove_line(app.session(), &ProductId::new(product_id))
        .await?;
    show(app);
    Ok(())
}
