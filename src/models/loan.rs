//! Loan (borrow) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{penalty::Penalty, status::LoanStatus};

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub book_copy_id: i64,
    pub member_id: Uuid,
    pub employee_id: Uuid,
    pub loaned_date: DateTime<Utc>,
    pub day_count: i16,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    #[schema(value_type = String)]
    pub status: LoanStatus,
    #[serde(skip)]
    pub row_version: i32,
}

/// Loan with names resolved for display
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i64,
    pub book_copy_id: i64,
    pub book_title: String,
    pub loaned_date: DateTime<Utc>,
    pub day_count: i16,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    #[schema(value_type = String)]
    pub status: LoanStatus,
    pub member_id: Uuid,
    pub member_name: String,
    pub member_id_number: String,
    pub employee_id: Uuid,
    pub employee_name: String,
}

/// Create loan request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLoan {
    pub book_copy_id: i64,
    /// External identity number of the borrowing member
    #[validate(length(min = 1, message = "Member id number is required"))]
    pub member_id_number: String,
    /// Loan duration in days
    #[validate(range(min = 1, max = 365, message = "Count of days must be between 1 and 365"))]
    pub day_count: i16,
}

/// Update loan request (unrestricted status overwrite)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateLoan {
    #[schema(value_type = String, max_length = 20)]
    #[validate(custom(function = "validate_loan_status"))]
    pub status: LoanStatus,
}

/// Loan statuses are stored in a 20 character column
fn validate_loan_status(status: &LoanStatus) -> Result<(), ValidationError> {
    let len = status.as_str().chars().count();
    if (1..=20).contains(&len) {
        Ok(())
    } else {
        let mut err = ValidationError::new("length");
        err.message = Some("Status must be between 1 and 20 characters".into());
        Err(err)
    }
}

/// Audit record written whenever a loan status changes
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanTransaction {
    pub id: i64,
    pub loan_id: i64,
    pub employee_id: Uuid,
    #[sqlx(default)]
    pub employee_name: Option<String>,
    #[schema(value_type = String)]
    pub status: LoanStatus,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of returning a book
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnOutcome {
    pub loan: Loan,
    /// Penalty assessed for a late return, if any
    pub penalty: Option<Penalty>,
}
