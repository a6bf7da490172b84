use axum::{Json, extract::State, http::StatusCode};
use url::Url;

use crate::{
    AppState,
    config::VerificationConfig,
    error::{AppError, Result},
    models::{Account, NewAccount, RegisterRequest},
    services::verification_service,
    utils::password,
};

/// Creates the account and mails its verification link. If the link cannot be
/// delivered the account is removed again and the delivery error returned.
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Account>)> {
    validate_registration(&payload)?;
    let base_url = resolve_base_url(&state.verification, payload.front_base_url.as_deref())?;

    if state.store.find_by_email(&payload.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash =
        password::hash_password(&payload.password, state.auth.bcrypt_cost).await?;

    let user = state
        .store
        .create(NewAccount {
            email: payload.email,
            password: password_hash,
            first_name: payload.first_name,
            last_name: payload.last_name,
            country: payload.country,
            image: payload.image,
        })
        .await?;

    if let Err(err) =
        verification_service::issue(state.store.as_ref(), state.mailer.as_ref(), &user, &base_url)
            .await
    {
        if let Err(cleanup) = state.store.delete(user.id).await {
            tracing::error!("Failed to roll back user {}: {}", user.id, cleanup);
        }
        return Err(err);
    }

    tracing::info!("User {} registered", user.id);

    Ok((StatusCode::CREATED, Json(user)))
}

/// A client-supplied base URL is only honoured when it parses as an http(s)
/// URL on a known frontend origin. The re-serialized form is used, so any
/// markup characters in it come back percent-encoded.
fn resolve_base_url(config: &VerificationConfig, requested: Option<&str>) -> Result<String> {
    let Some(requested) = requested else {
        return Ok(config.base_url.clone());
    };

    let url = Url::parse(requested)
        .map_err(|_| AppError::BadRequest("front_base_url is not a valid URL".to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || !is_allowed(config, &url) {
        return Err(AppError::BadRequest(
            "front_base_url is not an allowed origin".to_string(),
        ));
    }

    Ok(url.to_string())
}

fn is_allowed(config: &VerificationConfig, url: &Url) -> bool {
    config
        .allowed_origins
        .iter()
        .filter_map(|origin| Url::parse(origin).ok())
        .any(|origin| origin.origin() == url.origin())
}

fn validate_registration(payload: &RegisterRequest) -> Result<()> {
    if payload.email.is_empty() || !payload.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(AppError::BadRequest("Name cannot be empty".to_string()));
    }

    if payload.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    Ok(())
}
