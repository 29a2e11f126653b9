//! Order history.

use super::{App, CommandResult};

#[allow(clippy::print_stdout)]
pub async fn list(app: &App) -> CommandResult {
    let orders = app.order_history().await?;
    if orders.is_empty() {
        println!("No orders yet");
        return Ok(());
    }

    for order in &orders {
        let id = order.id.as_ref().map_or("-", |id| id.as_str());
        let placed = order
            .created_at
            .map(|at| at.format("%d %b %Y").to_string())
            .unwrap_or_default();
        println!(
            "  {id:<26} {placed:<12} {:<12} {:>3} item(s)  {}",
            order.status.as_str(),
            order.item_count(),
            order.total_price
        );
    }
    Ok(())
}
