//! Loan management service
//!
//! A book is available until a loan is opened on it and on loan until that
//! loan is returned. The store enforces that a book never has two
//! outstanding loans; this layer validates input before any statement runs.

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::loan::{parse_due_at, BorrowBook, Loan},
    repository::LibraryStore,
};

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn LibraryStore>,
}

impl LoansService {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    /// Borrow a book.
    ///
    /// Callers must not blindly retry on timeout: the loan may already exist.
    pub async fn borrow_book(&self, request: BorrowBook) -> AppResult<Loan> {
        request.validate()?;
        let due_at = parse_due_at(request.due_at.as_deref())?;

        match self
            .store
            .open_loan(request.book_id, request.member_id, due_at)
            .await
        {
            Ok(loan) => {
                tracing::info!(
                    loan_id = loan.id,
                    book_id = loan.book_id,
                    member_id = loan.member_id,
                    "loan opened"
                );
                Ok(loan)
            }
            Err(e @ AppError::FailedPrecondition(_)) => {
                tracing::warn!(
                    book_id = request.book_id,
                    member_id = request.member_id,
                    "borrow rejected: book already checked out"
                );
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Return a borrowed book. A loan can only be returned once.
    pub async fn return_book(&self, loan_id: i32) -> AppResult<Loan> {
        if loan_id <= 0 {
            return Err(AppError::Validation("loan_id is required".to_string()));
        }

        let loan = self
            .store
            .close_loan(loan_id)
            .await?
            .ok_or_else(|| AppError::NotFound("loan not found or already returned".to_string()))?;

        tracing::info!(loan_id = loan.id, book_id = loan.book_id, "loan closed");
        Ok(loan)
    }

    /// Outstanding loans of a member, most recent first
    pub async fn list_borrowed_books(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        if member_id <= 0 {
            return Err(AppError::Validation("member_id is required".to_string()));
        }
        self.store.list_open_loans(member_id).await
    }
}
