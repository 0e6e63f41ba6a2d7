//! Book and book copy models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::status::{CatalogStatus, CopyStatus};

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub page_count: i32,
    pub publishing_year: i16,
    pub description: Option<String>,
    pub print_count: Option<i32>,
    pub status: CatalogStatus,
    pub publisher_id: Option<i64>,
    pub location_id: Option<i32>,
    #[serde(skip)]
    pub row_version: i32,
}

/// Physical copy of a book (the unit of lending)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookCopy {
    pub id: i64,
    pub book_id: i64,
    pub status: CopyStatus,
    #[serde(skip)]
    pub row_version: i32,
}

/// Number of copies of a book in each status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CopyCounts {
    pub active: i64,
    pub borrowed: i64,
    pub inactive: i64,
    pub banned: i64,
}

impl CopyCounts {
    pub fn total(&self) -> i64 {
        self.active + self.borrowed + self.inactive + self.banned
    }
}

/// Book with its copy counts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub copies: CopyCounts,
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 10, max = 13, message = "ISBN must be between 10 and 13 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(range(min = 1, message = "Page count must be greater than zero"))]
    pub page_count: i32,
    #[validate(custom(function = "validate_publishing_year"))]
    pub publishing_year: i16,
    #[validate(length(max = 2000, message = "Description cannot be longer than 2000 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Print count must be positive"))]
    pub print_count: Option<i32>,
    /// Number of physical copies acquired with the book
    #[validate(range(min = 0, max = 1000, message = "Copy count must be between 0 and 1000"))]
    pub copy_count: i16,
    pub publisher_id: Option<i64>,
    pub location_id: Option<i32>,
    #[serde(default)]
    pub author_ids: Vec<i64>,
    #[serde(default)]
    pub language_ids: Vec<i16>,
    #[serde(default)]
    pub subcategory_ids: Vec<i16>,
}

fn validate_publishing_year(year: i16) -> Result<(), ValidationError> {
    if (-4000..=2100).contains(&year) {
        Ok(())
    } else {
        let mut err = ValidationError::new("range");
        err.message = Some("Publishing year must be between -4000 and 2100".into());
        Err(err)
    }
}

/// Copy count adjustment request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdjustCopies {
    /// Positive to acquire copies, negative to retire active ones
    pub delta: i16,
}

/// Outcome of a copy adjustment
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CopyAdjustmentReport {
    pub book_id: i64,
    pub added: i64,
    pub retired: i64,
    pub copies: CopyCounts,
}

/// Outcome of a book status change
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookStatusReport {
    pub book_id: i64,
    pub status: CatalogStatus,
    /// Copies relabeled, borrowed ones included
    pub copies_updated: u64,
}
