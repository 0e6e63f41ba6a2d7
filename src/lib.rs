//! Library circulation server
//!
//! Book acquisition and copy inventory, catalog status cascades, the loan
//! lifecycle and overdue penalties, served as a REST JSON API.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub repository: repository::Repository,
}

/// Routes served under `/api/v1`
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Books and copies
        .route("/books", post(api::books::create_book))
        .route("/books/:id", get(api::books::get_book))
        .route(
            "/books/:id/copies",
            get(api::books::list_copies).put(api::books::adjust_copies),
        )
        .route("/books/:id/status", put(api::books::set_book_status))
        // Catalog containers
        .route("/catalog/:kind/:id", get(api::catalog::get_container))
        .route(
            "/catalog/:kind/:id/status",
            put(api::catalog::set_container_status),
        )
        // Loans
        .route("/loans", post(api::loans::create_loan))
        .route(
            "/loans/:id",
            get(api::loans::get_loan).put(api::loans::update_loan),
        )
        .route("/loans/:id/return", post(api::loans::return_book))
        .route(
            "/loans/:id/transactions",
            get(api::loans::get_loan_transactions),
        )
        .route("/members/:id/loans", get(api::loans::get_member_loans))
        .route("/employees/:id/loans", get(api::loans::get_employee_loans))
        // Penalties
        .route("/penalties/:id", get(api::penalties::get_penalty))
        .route(
            "/members/:id/penalties",
            get(api::penalties::get_member_penalties),
        )
        .with_state(state)
}
