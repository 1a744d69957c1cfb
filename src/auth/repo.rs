use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::auth::repo_types::{User, UserRow};

/// Persistence for user records, keyed by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn save(&self, user: User) -> anyhow::Result<User>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(User::from))
    }

    async fn save(&self, user: User) -> anyhow::Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, display_name, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
               SET password_hash = EXCLUDED.password_hash,
                   role = EXCLUDED.role
            RETURNING id, email, display_name, password_hash, role, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }
}

/// In-process store used when no database is configured.
#[derive(Default)]
pub struct MemoryUserStore {
    by_email: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.by_email.read().await.len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.by_email.read().await.get(email).cloned())
    }

    async fn save(&self, user: User) -> anyhow::Result<User> {
        let mut users = self.by_email.write().await;
        if let Some(existing) = users.get(&user.email) {
            anyhow::ensure!(
                existing.id == user.id,
                "email {} already belongs to another user",
                user.email
            );
        }
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }
}
