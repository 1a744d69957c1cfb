use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::roles::Role;

/// User record as the rest of the service sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,                   // unique user ID
    pub email: String,              // identity key, case-sensitive
    pub display_name: String,       // "first last"
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 hash, not exposed in JSON
    pub role: Role,
    pub created_at: OffsetDateTime, // creation timestamp
}

/// Raw `users` row; the role column is plain text.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        Self {
            id: r.id,
            email: r.email,
            display_name: r.display_name,
            password_hash: r.password_hash,
            role: Role::from_label(Some(r.role.as_str())),
            created_at: r.created_at,
        }
    }
}

#[cfg(test)]
impl User {
    pub fn fake(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            display_name: "Test User".into(),
            password_hash: String::new(),
            role,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
