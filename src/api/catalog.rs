//! Catalog container status endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::catalog::{CascadeReport, ContainerKind, ContainerRow, SetStatus},
};

use super::{ApiJson, ApiResponse};

fn parse_kind(kind: &str) -> AppResult<ContainerKind> {
    kind.parse::<ContainerKind>().map_err(AppError::BadRequest)
}

/// Get a container's status
#[utoipa::path(
    get,
    path = "/catalog/{kind}/{id}",
    tag = "catalog",
    params(
        ("kind" = String, Path, description = "category, subcategory, language, author, publisher or location"),
        ("id" = i64, Path, description = "Container ID")
    ),
    responses(
        (status = 200, description = "Container status", body = ContainerRow),
        (status = 400, description = "Unknown container kind"),
        (status = 404, description = "Container not found")
    )
)]
pub async fn get_container(
    State(state): State<crate::AppState>,
    Path((kind, id)): Path<(String, i64)>,
) -> AppResult<Json<ApiResponse<ContainerRow>>> {
    let kind = parse_kind(&kind)?;
    let row = state.services.cascade.get_container(kind, id).await?;
    Ok(Json(ApiResponse::success(row)))
}

/// Set a container's status and cascade it to the books it owns
#[utoipa::path(
    put,
    path = "/catalog/{kind}/{id}/status",
    tag = "catalog",
    params(
        ("kind" = String, Path, description = "category, subcategory, language, author, publisher or location"),
        ("id" = i64, Path, description = "Container ID")
    ),
    request_body = SetStatus,
    responses(
        (status = 200, description = "Status updated", body = CascadeReport),
        (status = 400, description = "Unknown container kind"),
        (status = 404, description = "Container not found"),
        (status = 409, description = "Container still holds active books, or concurrent modification")
    )
)]
pub async fn set_container_status(
    State(state): State<crate::AppState>,
    Path((kind, id)): Path<(String, i64)>,
    ApiJson(request): ApiJson<SetStatus>,
) -> AppResult<Json<ApiResponse<CascadeReport>>> {
    let kind = parse_kind(&kind)?;
    let report = state
        .services
        .cascade
        .set_container_status(kind, id, request.status)
        .await?;
    let message = format!("{} status updated successfully", kind.label());
    Ok(Json(ApiResponse::with_message(report, message)))
}
