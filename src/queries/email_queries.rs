use sqlx::PgExecutor;

use crate::{error::Result, models::VerificationCode};

pub async fn create_verification_code(
    executor: impl PgExecutor<'_>,
    account_id: i32,
    code: &str,
) -> Result<VerificationCode> {
    let verification_code = sqlx::query_as::<_, VerificationCode>(
        "INSERT INTO verification_codes (code, account_id)
         VALUES ($1, $2)
         RETURNING *",
    )
    .bind(code)
    .bind(account_id)
    .fetch_one(executor)
    .await?;

    Ok(verification_code)
}

/// Deletes the code and hands back its row. The row lock taken by the
/// delete makes a concurrent caller see zero rows once this one commits.
pub async fn take_code(
    executor: impl PgExecutor<'_>,
    code: &str,
) -> Result<Option<VerificationCode>> {
    let verification_code = sqlx::query_as::<_, VerificationCode>(
        "DELETE FROM verification_codes WHERE code = $1 RETURNING *",
    )
    .bind(code)
    .fetch_optional(executor)
    .await?;

    Ok(verification_code)
}

pub async fn delete_code(executor: impl PgExecutor<'_>, code: &str) -> Result<()> {
    sqlx::query("DELETE FROM verification_codes WHERE code = $1")
        .bind(code)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn delete_other_codes(
    executor: impl PgExecutor<'_>,
    account_id: i32,
    keep: &str,
) -> Result<()> {
    sqlx::query("DELETE FROM verification_codes WHERE account_id = $1 AND code <> $2")
        .bind(account_id)
        .bind(keep)
        .execute(executor)
        .await?;

    Ok(())
}
