//! In-memory store
//!
//! Keeps all three record sets behind one async mutex. Every operation takes
//! the lock exactly once, so a borrow's check and insert cannot interleave
//! with another borrow.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::LibraryStore;
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookInput, Loan, Member, MemberInput},
};

#[derive(Default)]
struct Tables {
    books: Vec<Book>,
    members: Vec<Member>,
    loans: Vec<Loan>,
}

/// Next id for a table holding `len` rows; ids start at 1 and are never reused
fn next_id(len: usize) -> AppResult<i32> {
    i32::try_from(len)
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or_else(|| AppError::Internal(format!("id space exhausted after {} rows", len)))
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every loan ever recorded, returned or not
    pub async fn all_loans(&self) -> Vec<Loan> {
        self.tables.lock().await.loans.clone()
    }
}

#[async_trait]
impl LibraryStore for MemoryStore {
    async fn create_book(&self, book: &BookInput) -> AppResult<Book> {
        let mut tables = self.tables.lock().await;
        let row = Book {
            id: next_id(tables.books.len())?,
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            published_year: book.published_year,
        };
        tables.books.push(row.clone());
        Ok(row)
    }

    async fn update_book(&self, id: i32, book: &BookInput) -> AppResult<Option<Book>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.books.iter_mut().find(|b| b.id == id).map(|row| {
            row.title = book.title.clone();
            row.author = book.author.clone();
            row.isbn = book.isbn.clone();
            row.published_year = book.published_year;
            row.clone()
        }))
    }

    async fn list_books(&self) -> AppResult<Vec<Book>> {
        // ids are assigned in insertion order
        Ok(self.tables.lock().await.books.clone())
    }

    async fn create_member(&self, member: &MemberInput) -> AppResult<Member> {
        let mut tables = self.tables.lock().await;
        let row = Member {
            id: next_id(tables.members.len())?,
            name: member.name.clone(),
            email: member.email.clone(),
            phone: member.phone.clone(),
        };
        tables.members.push(row.clone());
        Ok(row)
    }

    async fn update_member(&self, id: i32, member: &MemberInput) -> AppResult<Option<Member>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.members.iter_mut().find(|m| m.id == id).map(|row| {
            row.name = member.name.clone();
            row.email = member.email.clone();
            row.phone = member.phone.clone();
            row.clone()
        }))
    }

    async fn list_members(&self) -> AppResult<Vec<Member>> {
        Ok(self.tables.lock().await.members.clone())
    }

    async fn open_loan(
        &self,
        book_id: i32,
        member_id: i32,
        due_at: Option<DateTime<Utc>>,
    ) -> AppResult<Loan> {
        let mut tables = self.tables.lock().await;

        if !tables.books.iter().any(|b| b.id == book_id) {
            return Err(AppError::NotFound("book not found".to_string()));
        }
        if !tables.members.iter().any(|m| m.id == member_id) {
            return Err(AppError::NotFound("member not found".to_string()));
        }
        if tables
            .loans
            .iter()
            .any(|l| l.book_id == book_id && l.is_outstanding())
        {
            return Err(AppError::FailedPrecondition(
                "book already checked out".to_string(),
            ));
        }

        let loan = Loan {
            id: next_id(tables.loans.len())?,
            book_id,
            member_id,
            borrowed_at: Utc::now(),
            due_at,
            returned_at: None,
        };
        tables.loans.push(loan.clone());
        Ok(loan)
    }

    async fn close_loan(&self, loan_id: i32) -> AppResult<Option<Loan>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .loans
            .iter_mut()
            .find(|l| l.id == loan_id && l.is_outstanding())
            .map(|loan| {
                loan.returned_at = Some(Utc::now());
                loan.clone()
            }))
    }

    async fn list_open_loans(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        let tables = self.tables.lock().await;
        let mut loans: Vec<Loan> = tables
            .loans
            .iter()
            .filter(|l| l.member_id == member_id && l.is_outstanding())
            .cloned()
            .collect();
        loans.sort_by(|a, b| b.borrowed_at.cmp(&a.borrowed_at).then(b.id.cmp(&a.id)));
        Ok(loans)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
