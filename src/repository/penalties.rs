//! Penalties repository

use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::penalty::{Penalty, PenaltyAssessment},
};

#[derive(Clone)]
pub struct PenaltiesRepository {
    pool: Pool<Postgres>,
}

impl PenaltiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Persist an assessed penalty for a member
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        member_id: Uuid,
        assessment: &PenaltyAssessment,
    ) -> AppResult<Penalty> {
        let penalty = sqlx::query_as::<_, Penalty>(
            r#"
            INSERT INTO penalties (member_id, daily_fee, total_fee, start_date, end_date,
                                   overdue_days, penalty_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(member_id)
        .bind(assessment.daily_fee)
        .bind(assessment.total_fee)
        .bind(assessment.start_date)
        .bind(assessment.end_date)
        .bind(assessment.overdue_days)
        .bind(assessment.penalty_type)
        .fetch_one(&mut *conn)
        .await?;
        Ok(penalty)
    }

    /// Get penalty by ID, with the member's name
    pub async fn get_by_id(&self, id: i64) -> AppResult<Penalty> {
        sqlx::query_as::<_, Penalty>(
            r#"
            SELECT p.*, m.name AS member_name
            FROM penalties p
            JOIN members m ON m.id = p.member_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Penalty with id {} not found", id)))
    }

    /// Get all penalties of a member, most recent first
    pub async fn list_by_member(&self, member_id: Uuid) -> AppResult<Vec<Penalty>> {
        let penalties = sqlx::query_as::<_, Penalty>(
            r#"
            SELECT p.*, m.name AS member_name
            FROM penalties p
            JOIN members m ON m.id = p.member_id
            WHERE p.member_id = $1
            ORDER BY p.end_date DESC, p.id DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(penalties)
    }
}
