//! # Book Commands
//!
//! Catalog listing is public; the admin panel's create, update and delete
//! sit behind the admin guard.

use clap::{Args, Subcommand};
use tracing::debug;

use pageturner_core::{Book, BookDraft, Money, Page, RequiredRole};

use super::print_json;
use crate::error::CliResult;
use crate::state::AppState;

#[derive(Debug, Subcommand)]
pub enum BooksCommand {
    /// One page of the catalog.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Defaults to the configured page limit.
        #[arg(long)]
        limit: Option<u32>,
    },

    /// A single book.
    Show { id: String },

    /// Create a book (admin).
    Add(BookFields),

    /// Replace a book's fields (admin). Omitted fields keep their value.
    Update {
        id: String,
        #[command(flatten)]
        fields: BookPatch,
    },

    /// Delete a book (admin).
    Delete { id: String },
}

impl BooksCommand {
    pub fn required_role(&self) -> Option<RequiredRole> {
        match self {
            BooksCommand::List { .. } | BooksCommand::Show { .. } => None,
            BooksCommand::Add(_) | BooksCommand::Update { .. } | BooksCommand::Delete { .. } => {
                Some(RequiredRole::Admin)
            }
        }
    }
}

/// The admin form for a new book.
#[derive(Debug, Args)]
pub struct BookFields {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub author: String,
    #[arg(long)]
    pub isbn: String,
    #[arg(long)]
    pub price: Money,
    #[arg(long, default_value_t = 0)]
    pub stock: i64,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub cover: Option<String>,
}

impl From<BookFields> for BookDraft {
    fn from(fields: BookFields) -> Self {
        BookDraft {
            title: fields.title,
            author: fields.author,
            isbn: fields.isbn,
            price: fields.price,
            stock_quantity: fields.stock,
            description: fields.description,
            cover_image: fields.cover,
        }
    }
}

/// The admin edit form; starts from the current book.
#[derive(Debug, Args)]
pub struct BookPatch {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub isbn: Option<String>,
    #[arg(long)]
    pub price: Option<Money>,
    #[arg(long)]
    pub stock: Option<i64>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub cover: Option<String>,
}

impl BookPatch {
    /// `current` with every given field overwritten.
    pub fn apply(self, current: &Book) -> BookDraft {
        let mut draft = BookDraft::from(current);
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(author) = self.author {
            draft.author = author;
        }
        if let Some(isbn) = self.isbn {
            draft.isbn = isbn;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(stock) = self.stock {
            draft.stock_quantity = stock;
        }
        if self.description.is_some() {
            draft.description = self.description;
        }
        if self.cover.is_some() {
            draft.cover_image = self.cover;
        }
        draft
    }
}

pub async fn run(state: &AppState, command: BooksCommand, json: bool) -> CliResult<()> {
    let client = state.session.client();

    match command {
        BooksCommand::List { page, limit } => {
            let limit = limit.unwrap_or(state.config.api.page_limit);
            let books = client.list_books(page, limit).await?;
            if json {
                print_json(&books);
            } else {
                print_page(&books);
            }
        }

        BooksCommand::Show { id } => {
            let book = client.get_book(&id).await?;
            if json {
                print_json(&book);
            } else {
                print_book(&book);
            }
        }

        BooksCommand::Add(fields) => {
            let book = client.create_book(&fields.into()).await?;
            println!("Created {} ({})", book.title, book.id);
        }

        BooksCommand::Update { id, fields } => {
            let current = client.get_book(&id).await?;
            let draft = fields.apply(&current);
            debug!(id = %id, "Submitting book update");
            let book = client.update_book(&id, &draft).await?;
            println!("Updated {} ({})", book.title, book.id);
        }

        BooksCommand::Delete { id } => {
            client.delete_book(&id).await?;
            println!("Deleted {id}");
        }
    }

    Ok(())
}

fn print_page(page: &Page<Book>) {
    if page.items.is_empty() {
        println!("No books found.");
        return;
    }
    for book in &page.items {
        let stock = if book.in_stock() { "" } else { "  (out of stock)" };
        println!(
            "{:<26} {:<40} {:<24} {:>9}{stock}",
            book.id,
            book.title,
            book.author,
            book.price.to_string()
        );
    }
    println!(
        "page {} of {} ({} books){}{}",
        page.current_page,
        page.total_pages,
        page.total_count,
        if page.has_previous() { "  [prev]" } else { "" },
        if page.has_next() { "  [next]" } else { "" },
    );
}

fn print_book(book: &Book) {
    println!("{}", book.title);
    println!("  by {}", book.author);
    println!("  ISBN  {}", book.isbn);
    println!("  Price {}", book.price);
    println!("  Stock {}", book.stock_quantity);
    if let Some(description) = &book.description {
        println!();
        println!("{description}");
    }
}
