use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use vendora_core::SessionClaims;

use crate::api_types::{ApiResponse, LoginRequest, LoginResponse, SessionInfo};
use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let Json(request) = payload
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let token = state
        .login_service()
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(ApiResponse::success(LoginResponse::from(token))))
}

/// Echo the claims of the presented session token.
pub async fn current_session(
    Extension(claims): Extension<SessionClaims>,
) -> Json<ApiResponse<SessionInfo>> {
    Json(ApiResponse::success(SessionInfo::from(claims)))
}
