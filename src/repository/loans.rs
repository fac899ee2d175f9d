//! Loans repository for database operations

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::loan::Loan,
};

/// Partial unique index: one row per book with `returned_at IS NULL`
const ONE_OPEN_LOAN_PER_BOOK: &str = "loans_one_open_per_book";

impl Repository {
    /// Create a loan after checking the book is free.
    ///
    /// The book row is locked `FOR UPDATE` so concurrent borrows of the same
    /// book queue behind each other; the unique index is the backstop.
    pub async fn loans_open(
        &self,
        book_id: i32,
        member_id: i32,
        due_at: Option<DateTime<Utc>>,
    ) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("book not found".to_string()))?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM members WHERE id = $1 FOR SHARE")
            .bind(member_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("member not found".to_string()))?;

        let already_borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND returned_at IS NULL)",
        )
        .bind(book_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowed {
            return Err(already_checked_out());
        }

        let loan = Self::loans_insert_open(&mut *tx, book_id, member_id, due_at).await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Insert an outstanding loan on an existing connection.
    ///
    /// A second outstanding loan for the same book violates
    /// `loans_one_open_per_book` and maps to `FailedPrecondition`.
    pub async fn loans_insert_open(
        conn: &mut PgConnection,
        book_id: i32,
        member_id: i32,
        due_at: Option<DateTime<Utc>>,
    ) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, member_id, due_at)
            VALUES ($1, $2, $3)
            RETURNING id, book_id, member_id, borrowed_at, due_at, returned_at
            "#,
        )
        .bind(book_id)
        .bind(member_id)
        .bind(due_at)
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.constraint() == Some(ONE_OPEN_LOAN_PER_BOOK) => {
                already_checked_out()
            }
            other => AppError::Database(other),
        })
    }

    /// Mark a loan returned, only if it is still outstanding
    pub async fn loans_close(&self, loan_id: i32) -> AppResult<Option<Loan>> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET returned_at = NOW()
            WHERE id = $1 AND returned_at IS NULL
            RETURNING id, book_id, member_id, borrowed_at, due_at, returned_at
            "#,
        )
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Get outstanding loans for a member
    pub async fn loans_list_open(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, book_id, member_id, borrowed_at, due_at, returned_at
            FROM loans
            WHERE member_id = $1 AND returned_at IS NULL
            ORDER BY borrowed_at DESC, id DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }
}

fn already_checked_out() -> AppError {
    AppError::FailedPrecondition("book already checked out".to_string())
}
