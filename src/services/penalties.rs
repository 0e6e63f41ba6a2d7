//! Overdue penalty assessment

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        penalty::{Penalty, PenaltyAssessment},
        status::PenaltyType,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct PenaltiesService {
    repository: Repository,
    daily_fee: Decimal,
}

impl PenaltiesService {
    pub fn new(repository: Repository, daily_fee: Decimal) -> Self {
        Self {
            repository,
            daily_fee,
        }
    }

    /// Assess a return against its due date using the configured daily fee
    pub fn assess(
        &self,
        due_date: DateTime<Utc>,
        return_date: DateTime<Utc>,
    ) -> Option<PenaltyAssessment> {
        assess(self.daily_fee, due_date, return_date)
    }

    /// Get penalty by ID
    pub async fn get_penalty(&self, id: i64) -> AppResult<Penalty> {
        self.repository.penalties.get_by_id(id).await
    }

    /// Get all penalties of a member
    pub async fn get_member_penalties(&self, member_id: Uuid) -> AppResult<Vec<Penalty>> {
        self.repository.people.member_by_id(member_id).await?;
        self.repository.penalties.list_by_member(member_id).await
    }
}

/// Classify a number of whole overdue days
pub fn classify(overdue_days: i64) -> PenaltyType {
    if overdue_days > 30 && overdue_days <= 60 {
        PenaltyType::TwoMonths
    } else if overdue_days > 60 && overdue_days <= 365 {
        PenaltyType::OneYear
    } else if overdue_days > 365 {
        PenaltyType::Limitless
    } else if overdue_days > 10 {
        PenaltyType::TenDays
    } else {
        PenaltyType::None
    }
}

/// Compute the penalty owed for a late return.
///
/// Returns `None` when the book came back on time or within the ten day
/// grace window. Partial days are not counted.
pub fn assess(
    daily_fee: Decimal,
    due_date: DateTime<Utc>,
    return_date: DateTime<Utc>,
) -> Option<PenaltyAssessment> {
    if return_date <= due_date {
        return None;
    }

    let overdue_days = (return_date - due_date).num_days();
    let penalty_type = classify(overdue_days);
    if penalty_type == PenaltyType::None {
        return None;
    }

    Some(PenaltyAssessment {
        daily_fee,
        total_fee: daily_fee * Decimal::from(overdue_days),
        start_date: due_date,
        end_date: return_date,
        overdue_days: i32::try_from(overdue_days).unwrap_or(i32::MAX),
        penalty_type,
    })
}
