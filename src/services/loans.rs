//! Loan lifecycle service

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::penalties::PenaltiesService;
use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{CreateLoan, Loan, LoanDetails, LoanTransaction, ReturnOutcome, UpdateLoan},
        status::LoanStatus,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    penalties: PenaltiesService,
}

impl LoansService {
    pub fn new(repository: Repository, penalties: PenaltiesService) -> Self {
        Self {
            repository,
            penalties,
        }
    }

    /// Get loan by ID
    pub async fn get_loan(&self, id: i64) -> AppResult<LoanDetails> {
        self.repository.loans.get_details(id).await
    }

    /// Get all loans of a member
    pub async fn get_member_loans(&self, member_id: Uuid) -> AppResult<Vec<LoanDetails>> {
        self.repository.people.member_by_id(member_id).await?;
        self.repository.loans.list_by_member(member_id).await
    }

    /// Get all loans handed out by an employee
    pub async fn get_employee_loans(&self, employee_id: Uuid) -> AppResult<Vec<LoanDetails>> {
        self.repository.people.employee_by_id(employee_id).await?;
        self.repository.loans.list_by_employee(employee_id).await
    }

    /// Get the status history of a loan
    pub async fn get_transactions(&self, loan_id: i64) -> AppResult<Vec<LoanTransaction>> {
        let transactions = self.repository.loans.list_transactions(loan_id).await?;
        if transactions.is_empty() {
            return Err(AppError::NotFound(format!(
                "No transactions found for loan {}",
                loan_id
            )));
        }
        Ok(transactions)
    }

    /// Lend a copy to a member.
    ///
    /// The copy flips from Active to Borrowed in the same statement that
    /// checks it, so two desks lending the same copy cannot both succeed.
    pub async fn create_loan(&self, request: CreateLoan, employee_id: Uuid) -> AppResult<Loan> {
        request.validate()?;

        let member = self
            .repository
            .people
            .member_by_id_number(&request.member_id_number)
            .await?;
        let employee = self.repository.people.employee_by_id(employee_id).await?;

        let loans = &self.repository.loans;
        let mut tx = self.repository.begin().await?;

        if loans.reserve_copy(&mut tx, request.book_copy_id).await?.is_none() {
            if !loans.copy_exists(&mut tx, request.book_copy_id).await? {
                return Err(AppError::NotFound("Book copy not found".to_string()));
            }
            tracing::warn!("Book copy {} is not available", request.book_copy_id);
            return Err(AppError::Conflict(
                "Book copy not available for loan".to_string(),
            ));
        }

        let loan = loans
            .insert(
                &mut tx,
                request.book_copy_id,
                member.id,
                employee.id,
                request.day_count,
                Utc::now(),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Loan {} created: copy {} to member {} for {} days",
            loan.id,
            loan.book_copy_id,
            member.id,
            loan.day_count
        );
        Ok(loan)
    }

    /// Overwrite a loan's status and record who did it.
    ///
    /// Any status is accepted, except that `Returned` requires the loan to be
    /// currently borrowed. Use [`Self::return_book`] for the checked path
    /// that also releases the copy and assesses penalties.
    pub async fn update_loan(
        &self,
        loan_id: i64,
        request: UpdateLoan,
        employee_id: Uuid,
    ) -> AppResult<Loan> {
        request.validate()?;
        let status = request.status;

        self.repository.people.employee_by_id(employee_id).await?;

        let loans = &self.repository.loans;
        let mut tx = self.repository.begin().await?;

        let loan = loans.lock(&mut tx, loan_id).await?;

        if status == LoanStatus::Returned && !loan.status.is_open() {
            return Err(AppError::Conflict("Book is not borrowed".to_string()));
        }

        if loan.status == status {
            return Ok(loan);
        }

        if !loan.status.can_transition_to(&status) {
            tracing::warn!(
                "Loan {} forced from {} to {} outside the transition table",
                loan.id,
                loan.status,
                status
            );
        }

        let updated = loans.update_status(&mut tx, &loan, &status).await?;
        loans
            .insert_transaction(&mut tx, loan.id, employee_id, &status, Utc::now())
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Loan {} status changed from {} to {} by employee {}",
            loan.id,
            loan.status,
            updated.status,
            employee_id
        );
        Ok(updated)
    }

    /// Take a borrowed copy back, releasing it and assessing any penalty.
    ///
    /// The copy goes back to `Active` only while it is still `Borrowed`. A
    /// copy relabeled during the loan (for example banned with its book)
    /// keeps that status.
    pub async fn return_book(&self, loan_id: i64) -> AppResult<ReturnOutcome> {
        let loans = &self.repository.loans;
        let mut tx = self.repository.begin().await?;

        let loan = loans.lock(&mut tx, loan_id).await?;
        if !loan.status.is_open() {
            tracing::warn!("Loan {} cannot be returned from {}", loan.id, loan.status);
            return Err(AppError::Conflict("Book is not borrowed".to_string()));
        }

        let now = Utc::now();
        let returned = loans.mark_returned(&mut tx, &loan, now).await?;
        loans
            .insert_transaction(
                &mut tx,
                loan.id,
                loan.employee_id,
                &LoanStatus::Returned,
                now,
            )
            .await?;

        if !loans.release_copy(&mut tx, loan.book_copy_id).await? {
            tracing::info!(
                "Copy {} was relabeled while on loan, keeping its status",
                loan.book_copy_id
            );
        }

        let penalty = match self.penalties.assess(loan.due_date, now) {
            Some(assessment) => Some(
                self.repository
                    .penalties
                    .insert(&mut tx, loan.member_id, &assessment)
                    .await?,
            ),
            None => None,
        };

        tx.commit().await?;

        match &penalty {
            Some(p) => tracing::info!(
                "Loan {} returned {} days late, {} penalty of {}",
                loan.id,
                p.overdue_days,
                p.penalty_type,
                p.total_fee
            ),
            None => tracing::info!("Loan {} returned", loan.id),
        }

        Ok(ReturnOutcome {
            loan: returned,
            penalty,
        })
    }
}
