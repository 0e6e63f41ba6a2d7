//! Penalty endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{error::AppResult, models::penalty::Penalty};

use super::ApiResponse;

/// Get penalty by ID
#[utoipa::path(
    get,
    path = "/penalties/{id}",
    tag = "penalties",
    params(("id" = i64, Path, description = "Penalty ID")),
    responses(
        (status = 200, description = "Penalty details", body = Penalty),
        (status = 404, description = "Penalty not found")
    )
)]
pub async fn get_penalty(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Penalty>>> {
    let penalty = state.services.penalties.get_penalty(id).await?;
    Ok(Json(ApiResponse::success(penalty)))
}

/// Get all penalties of a member
#[utoipa::path(
    get,
    path = "/members/{id}/penalties",
    tag = "penalties",
    params(("id" = Uuid, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member's penalties", body = Vec<Penalty>),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_member_penalties(
    State(state): State<crate::AppState>,
    Path(member_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Penalty>>>> {
    let penalties = state.services.penalties.get_member_penalties(member_id).await?;
    Ok(Json(ApiResponse::success(penalties)))
}
