//! API route handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::cookies::{clear_refresh_cookie, refresh_cookie, REFRESH_COOKIE};
use super::server::AppState;
use crate::auth::{cookie_value, AuthUser, LoginRequest, SignupRequest, UpdateProfileRequest};
use crate::error::{Error, Result};

/// Turn a body that failed to decode into the same shape as a validation error
pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::Validation(vec![rejection.body_text()]))
}

// Health check

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

pub async fn not_found(uri: Uri) -> Error {
    Error::not_found(format!("Route {} not found", uri.path()))
}

// Auth routes

pub async fn signup(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let user = state.auth.signup(json_body(payload)?).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "message": "Account created successfully.",
            "user": user,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let outcome = state.auth.login(json_body(payload)?).await?;

    let cookie = refresh_cookie(
        &outcome.refresh_token,
        state.auth.tokens().refresh_ttl(),
        state.config.auth.secure_cookies,
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "status": "success",
            "message": "Logged in successfully.",
            "accessToken": outcome.access_token,
            "user": outcome.user,
        })),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse> {
    state.auth.logout(Some(user.id())).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_refresh_cookie(state.config.auth.secure_cookies))],
        Json(json!({ "message": "Logged out successfully" })),
    ))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let response = state
        .auth
        .refresh(cookie_value(&headers, REFRESH_COOKIE))
        .await?;
    Ok((StatusCode::OK, Json(response)))
}

pub async fn update_income_goal(
    State(state): State<AppState>,
    user: AuthUser,
    payload: std::result::Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let user = state
        .auth
        .update_profile(Some(user.id()), json_body(payload)?)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": "Profile updated successfully.",
            "user": user,
        })),
    ))
}
