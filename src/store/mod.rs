//! Persistence seam for accounts and their verification codes.
//!
//! Handlers only ever talk to `dyn AccountStore`; the PostgreSQL
//! implementation backs the running service and the in-memory one backs
//! tests and local experiments.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{Account, NewAccount, UpdateAccountRequest, VerificationCode},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn ping(&self) -> Result<()>;

    async fn create(&self, account: NewAccount) -> Result<Account>;

    async fn find_all(&self) -> Result<Vec<Account>>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Account>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Applies the provided fields only. `None` when no account has `id`.
    async fn update(&self, id: i32, fields: &UpdateAccountRequest) -> Result<Option<Account>>;

    /// Removes the account and, with it, any codes it still owns.
    async fn delete(&self, id: i32) -> Result<()>;

    /// Adds `code` for `account_id`. Older codes stay live until
    /// `delete_other_codes` runs, so a failed delivery never strands the account.
    async fn insert_code(&self, account_id: i32, code: &str) -> Result<VerificationCode>;

    /// Drops every code of `account_id` except `keep`.
    async fn delete_other_codes(&self, account_id: i32, keep: &str) -> Result<()>;

    async fn delete_code(&self, code: &str) -> Result<()>;

    /// Consumes `code` and marks its owner verified as one atomic step.
    /// `None` when the code is unknown or already consumed.
    async fn redeem_code(&self, code: &str) -> Result<Option<Account>>;
}
