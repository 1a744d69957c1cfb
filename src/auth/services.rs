use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Map;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    claims::TokenKind,
    dto::{JwtResponse, RefreshTokenRequest, SignInRequest, SignUpRequest},
    error::AuthError,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo::UserStore,
    repo_types::User,
    roles::Role,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Outcome of a signup that reached the store.
#[derive(Debug)]
pub enum Registration {
    Created(User),
    AlreadyExists,
}

/// Signup, login and refresh on top of the credential store and token keys.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    // Uniqueness check and save are two store calls; concurrent signups for the
    // same email are resolved by the store's unique constraint, not here.
    pub async fn register_user(&self, req: SignUpRequest) -> Result<Registration, AuthError> {
        if self.users.find_by_email(&req.email).await?.is_some() {
            warn!(email = %req.email, "email already registered");
            return Ok(Registration::AlreadyExists);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: req.email,
            display_name: format!("{} {}", req.first_name, req.last_name),
            password_hash: hash_password(&req.password)?,
            role: Role::from_label(req.role.as_deref()),
            created_at: OffsetDateTime::now_utc(),
        };
        let user = self.users.save(user).await?;
        info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
        Ok(Registration::Created(user))
    }

    /// The username is trimmed the same way signup trims the stored email.
    pub async fn login(&self, req: SignInRequest) -> Result<JwtResponse, AuthError> {
        let email = req.username.trim();
        let Some(user) = self.users.find_by_email(email).await? else {
            warn!(%email, "login unknown email");
            return Err(AuthError::UserNotFound);
        };

        if !verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.keys.issue_access(&user)?;
        let refresh_token = self.keys.issue_refresh(&user, Map::new())?;
        info!(user_id = %user.id, email = %user.email, "user logged in");
        Ok(JwtResponse {
            token,
            refresh_token,
        })
    }

    /// Issues a fresh access token; the refresh token is echoed back unchanged.
    pub async fn refresh(&self, req: RefreshTokenRequest) -> Result<JwtResponse, AuthError> {
        let email = self.keys.extract_subject(&req.token)?;
        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!(%email, "refresh for unknown user");
            return Err(AuthError::UserNotFound);
        };

        if !self.keys.is_valid_kind(&req.token, &user, TokenKind::Refresh) {
            warn!(user_id = %user.id, "refresh token rejected");
            return Err(AuthError::InvalidToken);
        }

        let token = self.keys.issue_access(&user)?;
        info!(user_id = %user.id, "access token refreshed");
        Ok(JwtResponse {
            token,
            refresh_token: req.token,
        })
    }
}
