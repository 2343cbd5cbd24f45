//! Registration and token endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::user::{RegisterUser, RegisteredUser},
    services::users::TokenPair,
    AppState,
};

use super::ApiJson;

#[derive(Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterUser>,
) -> AppResult<(StatusCode, Json<RegisteredUser>)> {
    let user = state.services.users.register(request).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Obtain an access/refresh token pair
pub async fn obtain_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TokenRequest>,
) -> AppResult<Json<TokenPair>> {
    let pair = state
        .services
        .users
        .obtain_tokens(&request.username, &request.password)
        .await?;
    Ok(Json(pair))
}

/// Exchange a refresh token for a new access token
pub async fn refresh_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let access = state.services.users.refresh(&request.refresh).await?;
    Ok(Json(RefreshResponse { access }))
}

/// Check that a token is valid
pub async fn verify_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VerifyRequest>,
) -> AppResult<Json<VerifyResponse>> {
    state.services.users.verify(&request.token)?;
    Ok(Json(VerifyResponse {}))
}
