//! # Cart Commands
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  show / add / clear        local projector only                         │
//! │  set / remove              signed in → CartSync (server, then local)    │
//! │                            guest     → local projector only             │
//! │  count / pull / push       server-side cart, signed in only            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::Subcommand;
use tracing::info;

use pageturner_core::{Cart, RequiredRole};

use super::print_json;
use crate::error::CliResult;
use crate::state::AppState;

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Lines and total.
    Show,

    /// Add one copy of a book.
    Add { book_id: String },

    /// Drop a line.
    Remove { id: String },

    /// Set a line's quantity; zero or less removes it.
    Set {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Empty the cart.
    Clear,

    /// Items in the server-side cart.
    Count,

    /// Replace the local cart with the server's.
    Pull,

    /// Make the server's cart match the local one.
    Push,
}

impl CartCommand {
    pub fn required_role(&self) -> Option<RequiredRole> {
        match self {
            CartCommand::Count | CartCommand::Pull | CartCommand::Push => {
                Some(RequiredRole::Authenticated)
            }
            _ => None,
        }
    }
}

pub async fn run(state: &AppState, command: CartCommand, json: bool) -> CliResult<()> {
    let session = &state.session;
    let projector = session.projector();
    let signed_in = session.is_logged_in();

    match command {
        CartCommand::Show => {}

        CartCommand::Add { book_id } => {
            let book = session.client().get_book(&book_id).await?;
            let quantity = projector.add_item(&book)?;
            println!("{} x{quantity}", book.title);
        }

        CartCommand::Remove { id } => {
            if signed_in {
                session.cart_sync(&projector).remove(&id).await?;
            } else {
                projector.remove_item(&id);
            }
        }

        CartCommand::Set { id, quantity } => {
            if signed_in {
                session.cart_sync(&projector).set_quantity(&id, quantity).await?;
            } else {
                projector.set_quantity(&id, quantity)?;
            }
        }

        CartCommand::Clear => projector.clear(),

        CartCommand::Count => {
            let count = session.client().cart_count().await?;
            if json {
                print_json(&count);
            } else {
                println!("{count}");
            }
            return Ok(());
        }

        CartCommand::Pull => {
            session.cart_sync(&projector).pull().await?;
        }

        CartCommand::Push => {
            let sent = session.cart_sync(&projector).push().await?;
            info!(sent, "Cart pushed");
            println!("Sent {sent} line(s)");
            return Ok(());
        }
    }

    let cart = projector.snapshot();
    if json {
        print_json(&cart);
    } else {
        print_cart(&cart);
    }
    Ok(())
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }
    for item in cart.items() {
        println!(
            "{:<26} {:<40} {:>4} x {:>9} = {:>10}",
            item.id,
            item.title,
            item.quantity,
            item.unit_price.to_string(),
            item.line_total().to_string()
        );
    }
    println!("{:>95}", format!("Total {}", cart.total()));
}
