//! Book domain methods on Repository

use super::Repository;
use crate::{
    error::AppResult,
    models::book::{Book, BookInput},
};

impl Repository {
    /// List all books
    pub async fn books_list(&self) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, isbn, published_year FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a book
    pub async fn books_create(&self, data: &BookInput) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, published_year)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, author, isbn, published_year
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.isbn)
        .bind(data.published_year)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Overwrite every mutable field of a book
    pub async fn books_update(&self, id: i32, data: &BookInput) -> AppResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1,
                author = $2,
                isbn = $3,
                published_year = $4
            WHERE id = $5
            RETURNING id, title, author, isbn, published_year
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.isbn)
        .bind(data.published_year)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }
}
