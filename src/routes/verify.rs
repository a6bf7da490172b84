use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::Result,
    models::{Account, ResendVerificationRequest},
    services::verification_service,
};

pub async fn verify_user_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Account>> {
    let user = verification_service::redeem(state.store.as_ref(), &code).await?;
    Ok(Json(user))
}

/// Answers 204 whether or not the address belongs to a pending account.
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(payload): Json<ResendVerificationRequest>,
) -> Result<StatusCode> {
    let Some(user) = state.store.find_by_email(&payload.email).await? else {
        return Ok(StatusCode::NO_CONTENT);
    };

    if user.is_verified {
        return Ok(StatusCode::NO_CONTENT);
    }

    verification_service::issue(
        state.store.as_ref(),
        state.mailer.as_ref(),
        &user,
        &state.verification.base_url,
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
