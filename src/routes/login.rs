use axum::{Json, extract::State};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{LoginRequest, LoginResponse},
    utils::{jwt, password},
};

/// Existence and verification are checked before the password, so an
/// unverified account reports `NotVerified` whatever password was sent.
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user = state
        .store
        .find_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !user.is_verified {
        return Err(AppError::NotVerified);
    }

    if !password::verify_password(&payload.password, &user.password).await? {
        return Err(AppError::InvalidCredentials);
    }

    let token = jwt::generate_token(&state.auth, user.id, &user.email)?;

    tracing::info!("User {} logged in", user.id);

    Ok(Json(LoginResponse { user, token }))
}
