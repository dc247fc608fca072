//! Authentication Module
//!
//! Handles user registration, login, and lookup.
//! Passwords are hashed with bcrypt; sessions are stateless JWTs (see [`token`]).

pub mod handlers;
pub mod middleware;
pub mod token;

use bcrypt::{hash, verify};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{User, UserInfo};

/// Fields needed to create an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub avatar_url: Option<String>,
}

/// Auth manager handles all user persistence and credential checks
pub struct AuthManager {
    pool: SqlitePool,
    bcrypt_cost: u32,
}

impl AuthManager {
    pub fn new(pool: SqlitePool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    /// Register a new user
    ///
    /// Email uniqueness is enforced by the `users.email` unique index.
    pub async fn register(&self, new_user: NewUser) -> Result<UserInfo> {
        let password_hash = hash(&new_user.password, self.bcrypt_cost)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            full_name: new_user.full_name,
            email: new_user.email,
            password_hash,
            avatar_url: new_user.avatar_url,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users (id, full_name, email, password_hash, avatar_url, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar_url)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        info!("[Auth] User registered: {} ({})", user.full_name, user.email);

        Ok(user.into())
    }

    /// Check credentials and return the matching user
    pub async fn login(&self, email: &str, password: &str) -> Result<UserInfo> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, full_name, email, password_hash, avatar_url, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(user) = user else {
            warn!("[Auth] Login attempt for unknown email {}", email);
            return Err(Error::LoginFail);
        };

        if !verify(password, &user.password_hash)? {
            warn!("[Auth] Failed login attempt for {}", email);
            return Err(Error::LoginFail);
        }

        info!("[Auth] User logged in: {}", user.full_name);

        Ok(user.into())
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: &str) -> Result<UserInfo> {
        sqlx::query_as::<_, User>(
            "SELECT id, full_name, email, password_hash, avatar_url, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .map(UserInfo::from)
        .ok_or(Error::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn manager() -> AuthManager {
        let pool = crate::db::connect("sqlite::memory:").await.unwrap();
        AuthManager::new(pool, 4)
    }

    fn alice() -> NewUser {
        NewUser {
            email: "alice@test.com".into(),
            full_name: "Alice".into(),
            password: "password123".into(),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = manager().await;
        let registered = auth.register(alice()).await.unwrap();

        let logged_in = auth.login("alice@test.com", "password123").await.unwrap();
        assert_eq!(logged_in.id, registered.id);

        let fetched = auth.get_user(&registered.id).await.unwrap();
        assert_eq!(fetched.email, "alice@test.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let auth = manager().await;
        auth.register(alice()).await.unwrap();

        let err = auth.register(alice()).await.unwrap_err();
        assert!(matches!(err, Error::EmailTaken));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email() {
        let auth = manager().await;
        auth.register(alice()).await.unwrap();

        let err = auth.login("alice@test.com", "wrong-pass").await.unwrap_err();
        assert!(matches!(err, Error::LoginFail));

        let err = auth.login("nobody@test.com", "password123").await.unwrap_err();
        assert!(matches!(err, Error::LoginFail));
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let auth = manager().await;
        auth.register(alice()).await.unwrap();

        let (stored,): (String,) =
            sqlx::query_as("SELECT password_hash FROM users WHERE email = 'alice@test.com'")
                .fetch_one(&auth.pool)
                .await
                .unwrap();
        assert_ne!(stored, "password123");
        assert!(stored.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_unknown_user_id() {
        let auth = manager().await;
        let err = auth.get_user("missing").await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound));
    }
}
