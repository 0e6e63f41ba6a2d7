//! Overdue penalty model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::status::PenaltyType;

/// Penalty model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Penalty {
    pub id: i64,
    pub member_id: Uuid,
    pub daily_fee: Decimal,
    pub total_fee: Decimal,
    /// Due date of the late loan
    pub start_date: DateTime<Utc>,
    /// Actual return date
    pub end_date: DateTime<Utc>,
    pub overdue_days: i32,
    pub penalty_type: PenaltyType,
    #[sqlx(default)]
    pub member_name: Option<String>,
}

/// Penalty computed for a late return, before it is persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltyAssessment {
    pub daily_fee: Decimal,
    pub total_fee: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub overdue_days: i32,
    pub penalty_type: PenaltyType,
}
