//! Borrow and return endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::{
    error::AppResult,
    models::borrow::{BorrowRecordResponse, CreateBorrow},
    AppState,
};

use super::{ApiJson, ApiPath, AuthenticatedUser};

/// Return response with the closed record
#[derive(Serialize)]
pub struct ReturnResponse {
    pub status: String,
    pub record: BorrowRecordResponse,
}

/// Borrow a book.
///
/// 201 with the new record, 409 when no copies are available, 404 for an unknown book.
pub async fn create_borrow(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreateBorrow>,
) -> AppResult<(StatusCode, Json<BorrowRecordResponse>)> {
    let record = state.services.lending.borrow(request).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Return a borrowed book (409 if it was already returned)
pub async fn return_borrow(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(record_id): ApiPath<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let record = state.services.lending.return_book(record_id).await?;

    Ok(Json(ReturnResponse {
        status: "book returned".to_string(),
        record: record.into(),
    }))
}
