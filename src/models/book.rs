//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::blank_to_none;

/// Book record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub published_year: Option<i32>,
}

/// Book fields supplied on create and update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "title and author are required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "title and author are required"))]
    pub author: String,
    pub isbn: Option<String>,
    /// Publication year; 0 means unknown
    #[validate(range(min = 1, message = "published_year must be a positive year"))]
    pub published_year: Option<i32>,
}

impl BookInput {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Default::default()
        }
    }

    /// Trim text fields and fold wire defaults ("" and 0) into absent values
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: blank_to_none(self.isbn),
            published_year: self.published_year.filter(|year| *year != 0),
        }
    }
}
