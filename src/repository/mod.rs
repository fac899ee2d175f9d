//! Repository layer for database operations
//!
//! [`LibraryStore`] is the seam between the services and the datastore. Each
//! method is one atomic unit of work: the Postgres [`Repository`] runs it in a
//! single transaction, the [`memory::MemoryStore`] under a single lock.

pub mod books;
pub mod loans;
pub mod members;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Book, BookInput, Loan, Member, MemberInput},
};

pub use memory::MemoryStore;

/// Transactional access to books, members and loans
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryStore: Send + Sync {
    async fn create_book(&self, book: &BookInput) -> AppResult<Book>;

    /// `None` when no book has this id
    async fn update_book(&self, id: i32, book: &BookInput) -> AppResult<Option<Book>>;

    async fn list_books(&self) -> AppResult<Vec<Book>>;

    async fn create_member(&self, member: &MemberInput) -> AppResult<Member>;

    /// `None` when no member has this id
    async fn update_member(&self, id: i32, member: &MemberInput) -> AppResult<Option<Member>>;

    async fn list_members(&self) -> AppResult<Vec<Member>>;

    /// Open a loan for `book_id`.
    ///
    /// Fails with `NotFound` when the book or member is missing and with
    /// `FailedPrecondition` when the book already has an outstanding loan.
    /// The check and the insert are atomic with respect to other callers.
    async fn open_loan(
        &self,
        book_id: i32,
        member_id: i32,
        due_at: Option<DateTime<Utc>>,
    ) -> AppResult<Loan>;

    /// Set `returned_at` on an outstanding loan.
    /// `None` when the loan does not exist or was already returned.
    async fn close_loan(&self, loan_id: i32) -> AppResult<Option<Loan>>;

    /// Outstanding loans of a member, most recently borrowed first
    async fn list_open_loans(&self, member_id: i32) -> AppResult<Vec<Loan>>;

    /// Check datastore connectivity
    async fn ping(&self) -> AppResult<()>;
}

/// Postgres-backed store holding the connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LibraryStore for Repository {
    async fn create_book(&self, book: &BookInput) -> AppResult<Book> {
        self.books_create(book).await
    }

    async fn update_book(&self, id: i32, book: &BookInput) -> AppResult<Option<Book>> {
        self.books_update(id, book).await
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.books_list().await
    }

    async fn create_member(&self, member: &MemberInput) -> AppResult<Member> {
        self.members_create(member).await
    }

    async fn update_member(&self, id: i32, member: &MemberInput) -> AppResult<Option<Member>> {
        self.members_update(id, member).await
    }

    async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.members_list().await
    }

    async fn open_loan(
        &self,
        book_id: i32,
        member_id: i32,
        due_at: Option<DateTime<Utc>>,
    ) -> AppResult<Loan> {
        self.loans_open(book_id, member_id, due_at).await
    }

    async fn close_loan(&self, loan_id: i32) -> AppResult<Option<Loan>> {
        self.loans_close(loan_id).await
    }

    async fn list_open_loans(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        self.loans_list_open(member_id).await
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
