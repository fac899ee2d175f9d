//! Catalog (books) service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookInput},
    repository::LibraryStore,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn LibraryStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    /// List every book, ordered by id
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.store.list_books().await
    }

    /// Create a new book
    pub async fn create_book(&self, data: BookInput) -> AppResult<Book> {
        let data = data.normalized();
        data.validate()?;

        let book = self.store.create_book(&data).await?;
        tracing::debug!(book_id = book.id, "book created");
        Ok(book)
    }

    /// Replace all mutable fields of a book
    pub async fn update_book(&self, id: i32, data: BookInput) -> AppResult<Book> {
        if id <= 0 {
            return Err(AppError::Validation("book id is required".to_string()));
        }
        let data = data.normalized();
        data.validate()?;

        let book = self
            .store
            .update_book(id, &data)
            .await?
            .ok_or_else(|| AppError::NotFound("book not found".to_string()))?;
        tracing::debug!(book_id = book.id, "book updated");
        Ok(book)
    }
}
