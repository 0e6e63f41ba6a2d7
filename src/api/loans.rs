//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan, LoanDetails, LoanTransaction, ReturnOutcome, UpdateLoan},
};

use super::{ActingEmployee, ApiJson, ApiResponse};

/// Lend a book copy to a member
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    params(("X-Employee-Id" = Uuid, Header, description = "Acting employee")),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = Loan),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Member, employee or copy not found"),
        (status = 409, description = "Copy not available")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    ActingEmployee(employee_id): ActingEmployee,
    ApiJson(request): ApiJson<CreateLoan>,
) -> AppResult<(StatusCode, Json<ApiResponse<Loan>>)> {
    let loan = state.services.loans.create_loan(request, employee_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(loan, "Book borrowed successfully")),
    ))
}

/// Get loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(("id" = i64, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<LoanDetails>>> {
    let loan = state.services.loans.get_loan(id).await?;
    Ok(Json(ApiResponse::success(loan)))
}

/// Overwrite a loan's status
#[utoipa::path(
    put,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Loan ID"),
        ("X-Employee-Id" = Uuid, Header, description = "Acting employee")
    ),
    request_body = UpdateLoan,
    responses(
        (status = 200, description = "Loan updated", body = Loan),
        (status = 404, description = "Loan or employee not found"),
        (status = 409, description = "Loan is not borrowed, or copy already on loan")
    )
)]
pub async fn update_loan(
    State(state): State<crate::AppState>,
    ActingEmployee(employee_id): ActingEmployee,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<UpdateLoan>,
) -> AppResult<Json<ApiResponse<Loan>>> {
    let loan = state
        .services
        .loans
        .update_loan(id, request, employee_id)
        .await?;
    Ok(Json(ApiResponse::with_message(loan, "Loan updated successfully")))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(("id" = i64, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Book returned", body = ReturnOutcome),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Book is not borrowed")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<ReturnOutcome>>> {
    let outcome = state.services.loans.return_book(id).await?;
    Ok(Json(ApiResponse::with_message(outcome, "Book returned successfully")))
}

/// Get the status history of a loan
#[utoipa::path(
    get,
    path = "/loans/{id}/transactions",
    tag = "loans",
    params(("id" = i64, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan transactions", body = Vec<LoanTransaction>),
        (status = 404, description = "No transactions for this loan")
    )
)]
pub async fn get_loan_transactions(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<LoanTransaction>>>> {
    let transactions = state.services.loans.get_transactions(id).await?;
    Ok(Json(ApiResponse::success(transactions)))
}

/// Get all loans of a member
#[utoipa::path(
    get,
    path = "/members/{id}/loans",
    tag = "loans",
    params(("id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member's loans", body = Vec<LoanDetails>),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member_loans(
    State(state): State<crate::AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<LoanDetails>>>> {
    let loans = state.services.loans.get_member_loans(member_id).await?;
    Ok(Json(ApiResponse::success(loans)))
}

/// Get all loans handed out by an employee
#[utoipa::path(
    get,
    path = "/employees/{id}/loans",
    tag = "loans",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee's loans", body = Vec<LoanDetails>),
        (status = 404, description = "Employee not found")
    )
)]
pub async fn get_employee_loans(
    State(state): State<crate::AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<LoanDetails>>>> {
    let loans = state.services.loans.get_employee_loans(employee_id).await?;
    Ok(Json(ApiResponse::success(loans)))
}
