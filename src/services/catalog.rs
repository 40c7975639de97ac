//! Catalog management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a new book to the catalog
    pub async fn add_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let created = self.repository.books.create(&book).await?;
        tracing::info!(book_id = created.book_id, isbn = %created.isbn, "Book added: {}", created.title);
        Ok(created)
    }

    /// Get book by ISBN
    pub async fn get_book(&self, isbn: &str) -> AppResult<Book> {
        self.repository.books.get_by_isbn(isbn).await
    }

    /// List the catalog
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }
}
