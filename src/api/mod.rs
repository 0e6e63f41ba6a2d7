//! API handlers for the circulation REST endpoints

pub mod books;
pub mod catalog;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod penalties;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{AppError, ErrorKind},
    AppState,
};

/// Header carrying the id of the employee performing the request
pub const EMPLOYEE_ID_HEADER: &str = "x-employee-id";

/// Envelope wrapping every API response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error_message: None,
            success_message: None,
            error_kind: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success_message: Some(message.into()),
            ..Self::success(data)
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error_message: Some(message.into()),
            success_message: None,
            error_kind: Some(kind),
        }
    }
}

/// JSON body extractor whose rejections use the failure envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Employee acting on the request, as asserted by the upstream identity layer
pub struct ActingEmployee(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for ActingEmployee {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(EMPLOYEE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::BadRequest("Missing X-Employee-Id header".to_string()))?;

        let id = Uuid::parse_str(value.trim())
            .map_err(|_| AppError::BadRequest("Invalid X-Employee-Id header".to_string()))?;

        Ok(ActingEmployee(id))
    }
}
