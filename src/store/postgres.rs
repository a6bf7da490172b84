use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    database,
    error::Result,
    models::{Account, NewAccount, UpdateAccountRequest, VerificationCode},
    queries::{email_queries, user_queries},
};

use super::AccountStore;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn ping(&self) -> Result<()> {
        database::check_health(&self.pool).await
    }

    async fn create(&self, account: NewAccount) -> Result<Account> {
        user_queries::create_user(&self.pool, &account).await
    }

    async fn find_all(&self) -> Result<Vec<Account>> {
        user_queries::find_all(&self.pool).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Account>> {
        user_queries::find_by_id(&self.pool, id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        user_queries::find_by_email(&self.pool, email).await
    }

    async fn update(&self, id: i32, fields: &UpdateAccountRequest) -> Result<Option<Account>> {
        user_queries::update_user(&self.pool, id, fields).await
    }

    async fn delete(&self, id: i32) -> Result<()> {
        user_queries::delete_user(&self.pool, id).await?;
        Ok(())
    }

    async fn insert_code(&self, account_id: i32, code: &str) -> Result<VerificationCode> {
        email_queries::create_verification_code(&self.pool, account_id, code).await
    }

    async fn delete_other_codes(&self, account_id: i32, keep: &str) -> Result<()> {
        email_queries::delete_other_codes(&self.pool, account_id, keep).await
    }

    async fn delete_code(&self, code: &str) -> Result<()> {
        email_queries::delete_code(&self.pool, code).await
    }

    async fn redeem_code(&self, code: &str) -> Result<Option<Account>> {
        let mut tx = self.pool.begin().await?;

        let Some(verification) = email_queries::take_code(&mut *tx, code).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        let Some(account) = user_queries::mark_verified(&mut *tx, verification.account_id).await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        tx.commit().await?;

        Ok(Some(account))
    }
}
