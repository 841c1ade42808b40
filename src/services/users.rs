//! Account storage and credential checks.
//!
//! ARCHITECTURE
//! ============
//! Routes only see `Arc<dyn UserStore>`. `PgUserStore` is used when a
//! `DATABASE_URL` is configured; otherwise the server runs on
//! `MemoryUserStore`, which is also what route tests use.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::password::{self, PasswordError};
use crate::config::BootstrapAdmin;
use crate::models::{NewUser, User, UserRole};

#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("unknown role in storage: {0}")]
    UnknownRole(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("password task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up an account by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError>;

    /// Persist a new account. Fails with `DuplicateEmail` if the email exists.
    async fn insert(&self, user: User) -> Result<User, UserStoreError>;
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, UserStoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(UserStoreError::DuplicateEmail);
        }
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }
}

// =============================================================================
// POSTGRES STORE
// =============================================================================

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> Result<User, UserStoreError> {
    let role_raw: String = row.get("role");
    let role = UserRole::parse(&role_raw).ok_or(UserStoreError::UnknownRole(role_raw))?;
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        password_hash: row.get("password_hash"),
        role,
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        let row = sqlx::query(
            r"SELECT id, email, first_name, last_name, password_hash, role, is_active, created_at
              FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert(&self, user: User) -> Result<User, UserStoreError> {
        let result = sqlx::query(
            r"INSERT INTO users (id, email, first_name, last_name, password_hash, role, is_active, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
              ON CONFLICT (email) DO NOTHING",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(UserStoreError::DuplicateEmail);
        }
        Ok(user)
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Hash the password and store a new account.
///
/// # Errors
///
/// Returns an error for an invalid email, a duplicate, or a storage failure.
pub async fn register(store: &dyn UserStore, new_user: NewUser) -> Result<User, UserStoreError> {
    let email = normalize_email(&new_user.email).ok_or(UserStoreError::InvalidEmail)?;
    let plaintext = new_user.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plaintext)).await??;
    let user = User {
        id: Uuid::new_v4(),
        email,
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        password_hash,
        role: new_user.role,
        is_active: true,
        created_at: OffsetDateTime::now_utc(),
    };
    store.insert(user).await
}

/// Check credentials. Returns `Ok(None)` for an unknown email, an inactive
/// account, or a wrong password; callers must not distinguish between them.
///
/// # Errors
///
/// Returns an error only for storage or hashing failures.
pub async fn authenticate(store: &dyn UserStore, email: &str, password: &str) -> Result<Option<User>, UserStoreError> {
    let candidate = password.to_owned();
    let user = match normalize_email(email) {
        Some(email) => store.find_by_email(&email).await?,
        None => None,
    };
    let Some(user) = user.filter(|u| u.is_active) else {
        // Same argon2 cost as a real check so timing does not reveal accounts.
        tokio::task::spawn_blocking(move || password::verify_dummy(&candidate)).await?;
        return Ok(None);
    };

    let stored = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || password::verify_password(&stored, &candidate)).await??;
    Ok(matches.then_some(user))
}

/// Create the configured bootstrap admin if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the account cannot be created.
pub async fn ensure_bootstrap_admin(store: &Arc<dyn UserStore>, admin: &BootstrapAdmin) -> Result<bool, UserStoreError> {
    let email = normalize_email(&admin.email).ok_or(UserStoreError::InvalidEmail)?;
    if store.find_by_email(&email).await?.is_some() {
        return Ok(false);
    }
    let new_user = NewUser {
        email,
        first_name: "System".to_owned(),
        last_name: "Administrator".to_owned(),
        password: admin.password.clone(),
        role: UserRole::Admin,
    };
    match register(store.as_ref(), new_user).await {
        Ok(_) => Ok(true),
        Err(UserStoreError::DuplicateEmail) => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
