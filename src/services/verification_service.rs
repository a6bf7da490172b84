//! One-time email verification codes: issue, deliver, redeem.
//!
//! An account keeps one live code; a new code only supersedes the old one
//! after it has been mailed. Redemption consumes the code and flips
//! `is_verified` in a single store operation, so a code can never be spent
//! twice and a verified account never keeps a code around.

use crate::{
    error::{AppError, Result},
    models::Account,
    services::email_service::{self, Mailer},
    store::AccountStore,
    utils::code::{self, CODE_BYTES},
};

pub fn verification_link(base_url: &str, code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), code)
}

/// Generates a fresh code for `account`, mails the link and then retires any
/// older code.
///
/// When delivery fails the new code is removed again and earlier codes stay
/// redeemable, so the store never holds a code its owner could not have
/// received and never strands an account without one.
pub async fn issue(
    store: &dyn AccountStore,
    mailer: &dyn Mailer,
    account: &Account,
    base_url: &str,
) -> Result<String> {
    if account.is_verified {
        return Err(AppError::Conflict("User already verified".to_string()));
    }

    let code = code::random_token(CODE_BYTES);
    store.insert_code(account.id, &code).await?;

    let link = verification_link(base_url, &code);
    let email = email_service::verification_email(&account.email, &account.first_name, &link);

    if let Err(err) = mailer.send(&email).await {
        if let Err(cleanup) = store.delete_code(&code).await {
            tracing::error!(
                "Failed to discard undelivered code for user {}: {}",
                account.id,
                cleanup
            );
        }
        return Err(match err {
            AppError::DeliveryError(_) => err,
            other => AppError::DeliveryError(other.to_string()),
        });
    }

    store.delete_other_codes(account.id, &code).await?;

    tracing::info!("Verification code issued for user {}", account.id);

    Ok(code)
}

pub async fn redeem(store: &dyn AccountStore, code: &str) -> Result<Account> {
    let account = store.redeem_code(code).await?.ok_or_else(|| {
        tracing::warn!("Rejected unknown or used verification code");
        AppError::InvalidCode
    })?;

    tracing::info!("Email verified for user {}", account.id);

    Ok(account)
}
