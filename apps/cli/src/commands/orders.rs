//! Order history, newest first.

use pageturner_core::Order;

use super::print_json;
use crate::error::CliResult;
use crate::state::AppState;

pub async fn run(state: &AppState, json: bool) -> CliResult<()> {
    let orders = state.session.client().orders().await?;
    if json {
        print_json(&orders);
        return Ok(());
    }

    if orders.is_empty() {
        println!("No orders yet.");
    }
    for order in &orders {
        print_order(order);
    }
    Ok(())
}

fn print_order(order: &Order) {
    println!(
        "{}  {}  {}  {}",
        order.created_at.format("%Y-%m-%d"),
        order.id,
        order.status,
        order.total_amount
    );
    for item in &order.items {
        println!("    {:>3} x {:<40} {:>9}", item.quantity, item.title, item.line_total().to_string());
    }
}
