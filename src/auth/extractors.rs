use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};

use super::{claims::TokenKind, roles::Role};
use crate::state::AppState;

/// Identity bound to a request once its bearer token checks out.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by the role gate
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing Authorization header".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or((StatusCode::UNAUTHORIZED, "invalid auth scheme".into()))?;

        let keys = state.auth.keys();
        let email = keys
            .extract_subject(token)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "invalid or expired token".into()))?;

        let user = match state.auth.users().find_by_email(&email).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                warn!(%email, "token subject no longer exists");
                return Err((StatusCode::UNAUTHORIZED, "invalid or expired token".into()));
            }
            Err(e) => {
                error!(error = %e, "user lookup failed");
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                ));
            }
        };

        if !keys.is_valid_kind(token, &user, TokenKind::Access) {
            warn!(%email, "invalid or expired access token");
            return Err((StatusCode::UNAUTHORIZED, "invalid or expired token".into()));
        }

        let auth_user = AuthUser {
            email: user.email,
            role: user.role,
        };
        parts.extensions.insert(auth_user.clone());
        Ok(auth_user)
    }
}

/// Route layer for `/api/product/**`: authenticated ADMIN or VENDOR only.
pub async fn require_catalog_role(
    user: AuthUser,
    mut req: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    if !user.role.can_manage_catalog() {
        warn!(email = %user.email, role = %user.role, "catalog access denied");
        return Err((StatusCode::FORBIDDEN, "insufficient role".into()));
    }
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
