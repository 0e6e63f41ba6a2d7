//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, catalog, health, loans, penalties};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulation API",
        version = "1.0.0",
        description = "Library circulation REST API: catalog status, copy inventory, loans and penalties"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::create_book,
        books::get_book,
        books::list_copies,
        books::adjust_copies,
        books::set_book_status,
        // Catalog
        catalog::get_container,
        catalog::set_container_status,
        // Loans
        loans::create_loan,
        loans::get_loan,
        loans::update_loan,
        loans::return_book,
        loans::get_loan_transactions,
        loans::get_member_loans,
        loans::get_employee_loans,
        // Penalties
        penalties::get_penalty,
        penalties::get_member_penalties,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::BookCopy,
            crate::models::book::BookDetails,
            crate::models::book::CopyCounts,
            crate::models::book::CreateBook,
            crate::models::book::AdjustCopies,
            crate::models::book::CopyAdjustmentReport,
            crate::models::book::BookStatusReport,
            // Catalog
            crate::models::catalog::ContainerKind,
            crate::models::catalog::ContainerRow,
            crate::models::catalog::SetStatus,
            crate::models::catalog::CascadeReport,
            crate::models::status::CatalogStatus,
            crate::models::status::CopyStatus,
            crate::models::status::PenaltyType,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::CreateLoan,
            crate::models::loan::UpdateLoan,
            crate::models::loan::LoanTransaction,
            crate::models::loan::ReturnOutcome,
            // Penalties
            crate::models::penalty::Penalty,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorKind,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book acquisition and copy inventory"),
        (name = "catalog", description = "Catalog container status and cascade"),
        (name = "loans", description = "Loan lifecycle"),
        (name = "penalties", description = "Overdue penalties")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
