//! Loans repository for database operations

use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use super::lost_update;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::BookCopy,
        loan::{Loan, LoanDetails, LoanTransaction},
        status::{CopyStatus, LoanStatus},
    },
};

const LOAN_DETAILS_SELECT: &str = r#"
    SELECT l.id, l.book_copy_id, b.title AS book_title,
           l.loaned_date, l.day_count, l.due_date, l.return_date, l.status,
           m.id AS member_id, m.name AS member_name, m.id_number AS member_id_number,
           e.id AS employee_id, e.name AS employee_name
    FROM loans l
    JOIN book_copies bc ON bc.id = l.book_copy_id
    JOIN books b ON b.id = bc.book_id
    JOIN members m ON m.id = l.member_id
    JOIN employees e ON e.id = l.employee_id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loan by ID and lock it until the transaction ends
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Loan not found".to_string()))
    }

    /// Get loan with book title, member and employee names
    pub async fn get_details(&self, id: i64) -> AppResult<LoanDetails> {
        let query = format!("{} WHERE l.id = $1", LOAN_DETAILS_SELECT);
        sqlx::query_as::<_, LoanDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get all loans of a member, most recent first
    pub async fn list_by_member(&self, member_id: Uuid) -> AppResult<Vec<LoanDetails>> {
        let query = format!(
            "{} WHERE l.member_id = $1 ORDER BY l.loaned_date DESC, l.id DESC",
            LOAN_DETAILS_SELECT
        );
        let loans = sqlx::query_as::<_, LoanDetails>(&query)
            .bind(member_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// Get all loans handed out by an employee, most recent first
    pub async fn list_by_employee(&self, employee_id: Uuid) -> AppResult<Vec<LoanDetails>> {
        let query = format!(
            "{} WHERE l.employee_id = $1 ORDER BY l.loaned_date DESC, l.id DESC",
            LOAN_DETAILS_SELECT
        );
        let loans = sqlx::query_as::<_, LoanDetails>(&query)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    // ---- Copy reservation ----

    /// Atomically flip a copy from Active to Borrowed.
    ///
    /// Returns `None` when the copy is missing or not lendable; the caller
    /// tells the two apart with [`Self::copy_exists`].
    pub async fn reserve_copy(
        &self,
        conn: &mut PgConnection,
        copy_id: i64,
    ) -> AppResult<Option<BookCopy>> {
        let copy = sqlx::query_as::<_, BookCopy>(
            r#"
            UPDATE book_copies
            SET status = $2, row_version = row_version + 1
            WHERE id = $1 AND status = $3
            RETURNING *
            "#,
        )
        .bind(copy_id)
        .bind(CopyStatus::Borrowed)
        .bind(CopyStatus::Active)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(copy)
    }

    pub async fn copy_exists(&self, conn: &mut PgConnection, copy_id: i64) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM book_copies WHERE id = $1)")
                .bind(copy_id)
                .fetch_one(&mut *conn)
                .await?;
        Ok(exists)
    }

    /// Put a copy back on the shelf, unless it was relabeled while out
    pub async fn release_copy(&self, conn: &mut PgConnection, copy_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE book_copies
            SET status = $2, row_version = row_version + 1
            WHERE id = $1 AND status = $3
            "#,
        )
        .bind(copy_id)
        .bind(CopyStatus::Active)
        .bind(CopyStatus::Borrowed)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- Loan writes ----

    /// Create a new open loan on an already reserved copy
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        copy_id: i64,
        member_id: Uuid,
        employee_id: Uuid,
        day_count: i16,
        loaned_date: DateTime<Utc>,
    ) -> AppResult<Loan> {
        let due_date = loaned_date + Duration::days(i64::from(day_count));

        sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_copy_id, member_id, employee_id, loaned_date,
                               day_count, due_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(copy_id)
        .bind(member_id)
        .bind(employee_id)
        .bind(loaned_date)
        .bind(day_count)
        .bind(due_date)
        .bind(LoanStatus::Borrowed)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Book copy already has an open loan"))
    }

    /// Close a loan as returned, if its row version is unchanged
    pub async fn mark_returned(
        &self,
        conn: &mut PgConnection,
        loan: &Loan,
        return_date: DateTime<Utc>,
    ) -> AppResult<Loan> {
        let updated = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET status = $2, return_date = $3, row_version = row_version + 1
            WHERE id = $1 AND row_version = $4
            RETURNING *
            "#,
        )
        .bind(loan.id)
        .bind(LoanStatus::Returned)
        .bind(return_date)
        .bind(loan.row_version)
        .fetch_optional(&mut *conn)
        .await?;

        match updated {
            Some(loan) => Ok(loan),
            None => Err(lost_update(conn, "loans", loan.id, "Loan").await),
        }
    }

    /// Overwrite a loan's status, if its row version is unchanged
    pub async fn update_status(
        &self,
        conn: &mut PgConnection,
        loan: &Loan,
        status: &LoanStatus,
    ) -> AppResult<Loan> {
        let updated = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET status = $2, row_version = row_version + 1
            WHERE id = $1 AND row_version = $3
            RETURNING *
            "#,
        )
        .bind(loan.id)
        .bind(status)
        .bind(loan.row_version)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            AppError::on_unique_violation(e, "Book copy already has another open loan")
        })?;

        match updated {
            Some(loan) => Ok(loan),
            None => Err(lost_update(conn, "loans", loan.id, "Loan").await),
        }
    }

    // ---- Transactions ----

    /// Append an audit record for a loan status change
    pub async fn insert_transaction(
        &self,
        conn: &mut PgConnection,
        loan_id: i64,
        employee_id: Uuid,
        status: &LoanStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<LoanTransaction> {
        let transaction = sqlx::query_as::<_, LoanTransaction>(
            r#"
            INSERT INTO loan_transactions (loan_id, employee_id, status, updated_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(loan_id)
        .bind(employee_id)
        .bind(status)
        .bind(updated_at)
        .fetch_one(&mut *conn)
        .await?;
        Ok(transaction)
    }

    /// Get the audit trail of a loan, oldest first
    pub async fn list_transactions(&self, loan_id: i64) -> AppResult<Vec<LoanTransaction>> {
        let transactions = sqlx::query_as::<_, LoanTransaction>(
            r#"
            SELECT t.id, t.loan_id, t.employee_id, e.name AS employee_name,
                   t.status, t.updated_at
            FROM loan_transactions t
            LEFT JOIN employees e ON e.id = t.employee_id
            WHERE t.loan_id = $1
            ORDER BY t.updated_at, t.id
            "#,
        )
        .bind(loan_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }
}
