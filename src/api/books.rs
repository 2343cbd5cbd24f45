//! Book endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{BookInput, BookResponse},
    AppState,
};

use super::{ApiJson, ApiPath, AuthenticatedUser};

pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookResponse>>> {
    Ok(Json(state.services.catalog.list_books().await?))
}

pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<BookResponse>> {
    Ok(Json(state.services.catalog.get_book(id).await?))
}

/// Create a book (400 with an `isbn` field error on duplicate ISBN)
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiJson(input): ApiJson<BookInput>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    let book = state.services.catalog.create_book(input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Full update of a book
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<BookInput>,
) -> AppResult<Json<BookResponse>> {
    Ok(Json(state.services.catalog.update_book(id, input).await?))
}

/// Delete a book and its borrow records
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
