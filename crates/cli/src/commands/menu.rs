//! Menu listing.

use beachstall_core::Product;

use super::{App, CommandResult};

#[allow(clippy::print_stdout)]
pub async fn list(app: &App, category: Option<&str>) -> CommandResult {
    let menu = app.menu().await?;

    if let Some(category) = category {
        let products: Vec<_> = menu.by_category(category).collect();
        if products.is_empty() {
            println!("Nothing on the menu under \"{category}\"");
        }
        for product in products {
            print_product(app, product);
        }
        return Ok(());
    }

    for section in menu.sections() {
        println!("{}", section.title);
        println!("{}", "-".repeat(section.title.len()));
        for product in section.products {
            print_product(app, product);
        }
        println!();
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_product(app: &App, product: &Product) {
    println!("  {:<26} {:>8}  [{}]", product.name, product.price.to_string(), product.id);
    println!("    {}", product.description_or_default());
    println!("    {}", app.image_url(product));
}
