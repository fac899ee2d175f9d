//! Data models for the library server

pub mod book;
pub mod loan;
pub mod member;

// Re-export commonly used types
pub use book::{Book, BookInput};
pub use loan::{BorrowBook, Loan};
pub use member::{Member, MemberInput};

/// Trimmed value, or `None` when the caller sent an empty string
pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
