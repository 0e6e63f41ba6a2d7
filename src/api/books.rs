//! Book acquisition, copy inventory and book status endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        book::{
            AdjustCopies, BookCopy, BookDetails, BookStatusReport, CopyAdjustmentReport,
            CreateBook,
        },
        catalog::SetStatus,
    },
};

use super::{ApiJson, ApiResponse};

/// Register a new book together with its initial copies
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookDetails),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Location not found"),
        (status = 409, description = "Duplicate ISBN or location full")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<CreateBook>,
) -> AppResult<(StatusCode, Json<ApiResponse<BookDetails>>)> {
    let book = state.services.inventory.create_book(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(book, "Book added successfully")),
    ))
}

/// Get a book with its copy counts
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<BookDetails>>> {
    let book = state.services.inventory.get_book(id).await?;
    Ok(Json(ApiResponse::success(book)))
}

/// List all copies of a book
#[utoipa::path(
    get,
    path = "/books/{id}/copies",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Copies of the book", body = Vec<BookCopy>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_copies(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<BookCopy>>>> {
    let copies = state.services.inventory.list_copies(id).await?;
    Ok(Json(ApiResponse::success(copies)))
}

/// Acquire or retire copies of a book
#[utoipa::path(
    put,
    path = "/books/{id}/copies",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = AdjustCopies,
    responses(
        (status = 200, description = "Copies adjusted", body = CopyAdjustmentReport),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Not enough active copies")
    )
)]
pub async fn adjust_copies(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<AdjustCopies>,
) -> AppResult<Json<ApiResponse<CopyAdjustmentReport>>> {
    let report = state.services.inventory.adjust_copies(id, request.delta).await?;
    Ok(Json(ApiResponse::with_message(
        report,
        "Book copies updated successfully",
    )))
}

/// Set a book's status and relabel its copies
#[utoipa::path(
    put,
    path = "/books/{id}/status",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = SetStatus,
    responses(
        (status = 200, description = "Status updated", body = BookStatusReport),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Concurrent modification")
    )
)]
pub async fn set_book_status(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    ApiJson(request): ApiJson<SetStatus>,
) -> AppResult<Json<ApiResponse<BookStatusReport>>> {
    let report = state.services.cascade.set_book_status(id, request.status).await?;
    Ok(Json(ApiResponse::with_message(
        report,
        "Book status updated successfully",
    )))
}
