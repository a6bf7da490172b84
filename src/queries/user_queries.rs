use sqlx::PgExecutor;

use crate::{
    error::Result,
    models::{Account, NewAccount, UpdateAccountRequest},
};

pub async fn create_user(executor: impl PgExecutor<'_>, account: &NewAccount) -> Result<Account> {
    let user = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO users (email, password, first_name, last_name, country, image)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&account.email)
    .bind(&account.password)
    .bind(&account.first_name)
    .bind(&account.last_name)
    .bind(&account.country)
    .bind(&account.image)
    .fetch_one(executor)
    .await?;

    Ok(user)
}

pub async fn find_all(executor: impl PgExecutor<'_>) -> Result<Vec<Account>> {
    let users = sqlx::query_as::<_, Account>("SELECT * FROM users ORDER BY id")
        .fetch_all(executor)
        .await?;

    Ok(users)
}

pub async fn find_by_id(executor: impl PgExecutor<'_>, id: i32) -> Result<Option<Account>> {
    let user = sqlx::query_as::<_, Account>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(user)
}

pub async fn find_by_email(executor: impl PgExecutor<'_>, email: &str) -> Result<Option<Account>> {
    let user = sqlx::query_as::<_, Account>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(executor)
        .await?;

    Ok(user)
}

pub async fn update_user(
    executor: impl PgExecutor<'_>,
    id: i32,
    req: &UpdateAccountRequest,
) -> Result<Option<Account>> {
    let user = sqlx::query_as::<_, Account>(
        r#"
        UPDATE users
        SET
            email = COALESCE($1, email),
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            country = COALESCE($4, country),
            image = COALESCE($5, image),
            updated_at = NOW()
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(&req.email)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.country)
    .bind(&req.image)
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

pub async fn mark_verified(executor: impl PgExecutor<'_>, id: i32) -> Result<Option<Account>> {
    let user = sqlx::query_as::<_, Account>(
        "UPDATE users SET is_verified = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}

pub async fn delete_user(executor: impl PgExecutor<'_>, id: i32) -> Result<u64> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
