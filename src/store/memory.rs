use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    error::{AppError, Result},
    models::{Account, NewAccount, UpdateAccountRequest, VerificationCode},
};

use super::AccountStore;

#[derive(Default)]
struct Tables {
    next_id: i32,
    users: BTreeMap<i32, Account>,
    codes: HashMap<String, VerificationCode>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }
}

/// Process-local store. A single lock covers both tables, so every
/// operation is atomic with respect to the others.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live codes, all accounts included.
    pub async fn code_count(&self) -> usize {
        self.tables.lock().await.codes.len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn create(&self, account: NewAccount) -> Result<Account> {
        let mut tables = self.tables.lock().await;

        if tables.email_taken(&account.email, None) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        tables.next_id += 1;
        let now = Utc::now();
        let user = Account {
            id: tables.next_id,
            email: account.email,
            password: account.password,
            first_name: account.first_name,
            last_name: account.last_name,
            country: account.country,
            image: account.image,
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<Account>> {
        Ok(self.tables.lock().await.users.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Account>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update(&self, id: i32, fields: &UpdateAccountRequest) -> Result<Option<Account>> {
        let mut tables = self.tables.lock().await;

        if let Some(email) = &fields.email {
            if tables.email_taken(email, Some(id)) {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(email) = &fields.email {
            user.email = email.clone();
        }
        if let Some(first_name) = &fields.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &fields.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(country) = &fields.country {
            user.country = country.clone();
        }
        if let Some(image) = &fields.image {
            user.image = Some(image.clone());
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.users.remove(&id);
        tables.codes.retain(|_, code| code.account_id != id);
        Ok(())
    }

    async fn insert_code(&self, account_id: i32, code: &str) -> Result<VerificationCode> {
        let mut tables = self.tables.lock().await;

        if !tables.users.contains_key(&account_id) {
            return Err(AppError::NotFound(format!(
                "User with id {} not found",
                account_id
            )));
        }
        if tables.codes.contains_key(code) {
            return Err(AppError::Conflict("Verification code collision".to_string()));
        }

        let verification_code = VerificationCode {
            code: code.to_string(),
            account_id,
            created_at: Utc::now(),
        };
        tables
            .codes
            .insert(code.to_string(), verification_code.clone());

        Ok(verification_code)
    }

    async fn delete_other_codes(&self, account_id: i32, keep: &str) -> Result<()> {
        self.tables
            .lock()
            .await
            .codes
            .retain(|code, existing| existing.account_id != account_id || code == keep);
        Ok(())
    }

    async fn delete_code(&self, code: &str) -> Result<()> {
        self.tables.lock().await.codes.remove(code);
        Ok(())
    }

    async fn redeem_code(&self, code: &str) -> Result<Option<Account>> {
        let mut tables = self.tables.lock().await;

        let Some(verification) = tables.codes.get(code).cloned() else {
            return Ok(None);
        };
        let Some(user) = tables.users.get_mut(&verification.account_id) else {
            return Ok(None);
        };

        user.is_verified = true;
        user.updated_at = Utc::now();
        let user = user.clone();
        tables.codes.remove(code);

        Ok(Some(user))
    }
}
