//! Catalog endpoints.

use reqwest::Method;
use tracing::{debug, info, instrument};

use pageturner_core::validation::validate_book_draft;
use pageturner_core::{Book, BookDraft, Page};

use crate::api::schema::{BookPageWire, PageQuery};
use crate::client::{Access, ApiClient};
use crate::error::ClientResult;

impl ApiClient {
    /// `GET /books?page&limit`, normalized to one page shape.
    #[instrument(skip(self))]
    pub async fn list_books(&self, page: u32, limit: u32) -> ClientResult<Page<Book>> {
        let query = PageQuery {
            page: page.max(1),
            limit: limit.max(1),
        };
        let wire: BookPageWire = self.get_with_query(&["books"], &query).await?;
        let page: Page<Book> = wire.into();
        debug!(
            count = page.items.len(),
            current = page.current_page,
            total_pages = page.total_pages,
            "Fetched catalog page"
        );
        Ok(page)
    }

    /// `GET /books/:id`
    #[instrument(skip(self))]
    pub async fn get_book(&self, id: &str) -> ClientResult<Book> {
        self.get(&["books", id]).await
    }

    /// `POST /books` (admin). The draft is validated before sending.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_book(&self, draft: &BookDraft) -> ClientResult<Book> {
        validate_book_draft(draft)?;
        let book: Book = self.post(&["books"], draft, Access::Authenticated).await?;
        info!(id = %book.id, "Book created");
        Ok(book)
    }

    /// `PUT /books/:id` (admin). The draft is validated before sending.
    #[instrument(skip(self, draft))]
    pub async fn update_book(&self, id: &str, draft: &BookDraft) -> ClientResult<Book> {
        validate_book_draft(draft)?;
        let book: Book = self.put(&["books", id], draft).await?;
        info!(id = %book.id, "Book updated");
        Ok(book)
    }

    /// `DELETE /books/:id` (admin).
    #[instrument(skip(self))]
    pub async fn delete_book(&self, id: &str) -> ClientResult<()> {
        self.send_ignoring_body(Method::DELETE, &["books", id])
            .await?;
        info!(id, "Book deleted");
        Ok(())
    }
}
