use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{Account, UpdateAccountRequest},
    utils::{extractors::extract_user_id, jwt::Claims},
};

pub async fn get_all(State(state): State<AppState>) -> Result<Json<Vec<Account>>> {
    let users = state.store.find_all().await?;
    Ok(Json(users))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Account>> {
    let user = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

    Ok(Json(user))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<Json<Account>> {
    if let Some(email) = &payload.email {
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
    }

    let user = state
        .store
        .update(id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

    Ok(Json(user))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<i32>) -> Result<StatusCode> {
    state.store.delete(id).await?;

    tracing::info!("User {} deleted", id);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn logged_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Account>> {
    let user_id = extract_user_id(&claims)?;

    let user = state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User no longer exists".to_string()))?;

    Ok(Json(user))
}
