use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::{
    claims::{Claims, TokenKind},
    error::AuthError,
    repo_types::User,
};
use crate::config::JwtConfig;

// Registered claim names that extra claims may not shadow.
const RESERVED_CLAIMS: [&str; 7] = ["sub", "role", "iat", "exp", "iss", "aud", "kind"];

/// Signs and verifies the stateless access/refresh tokens.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
            refresh_ttl: Duration::from_secs((cfg.refresh_ttl_minutes.max(0) as u64) * 60),
        }
    }

    pub(super) fn sign_at(
        &self,
        user: &User,
        kind: TokenKind,
        issued_at: OffsetDateTime,
        mut extra: Map<String, Value>,
    ) -> anyhow::Result<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let exp = issued_at + TimeDuration::seconds(ttl.as_secs() as i64);
        extra.retain(|k, _| !RESERVED_CLAIMS.contains(&k.as_str()));
        let claims = Claims {
            sub: user.email.clone(),
            role: user.role,
            iat: issued_at.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
            extra,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(email = %user.email, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn issue_access(&self, user: &User) -> anyhow::Result<String> {
        self.sign_at(user, TokenKind::Access, OffsetDateTime::now_utc(), Map::new())
    }

    pub fn issue_refresh(&self, user: &User, extra: Map<String, Value>) -> anyhow::Result<String> {
        self.sign_at(user, TokenKind::Refresh, OffsetDateTime::now_utc(), extra)
    }

    fn validation(&self, check_exp: bool) -> Validation {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.validate_exp = check_exp;
        validation.leeway = 0;
        validation
    }

    /// Fully verified claims: signature, issuer, audience and expiry.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation(true))?;
        debug!(email = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    /// Subject of a genuine token, even an expired one.
    pub fn extract_subject(&self, token: &str) -> Result<String, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation(false))
            .map(|data| data.claims.sub)
            .map_err(|e| {
                debug!(error = %e, "jwt subject extraction failed");
                AuthError::InvalidToken
            })
    }

    pub fn is_valid(&self, token: &str, user: &User) -> bool {
        matches!(self.verify(token), Ok(claims) if claims.sub == user.email)
    }

    pub fn is_valid_kind(&self, token: &str, user: &User, kind: TokenKind) -> bool {
        matches!(
            self.verify(token),
            Ok(claims) if claims.sub == user.email && claims.kind == kind
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::Role;
    use crate::config::AppConfig;

    fn make_keys() -> JwtKeys {
        JwtKeys::from_config(&AppConfig::fake().jwt)
    }

    fn make_keys_with(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        let mut cfg = AppConfig::fake().jwt;
        cfg.secret = secret.into();
        cfg.issuer = issuer.into();
        cfg.audience = audience.into();
        JwtKeys::from_config(&cfg)
    }

    fn expired_access(keys: &JwtKeys, user: &User) -> String {
        let two_hours_ago = OffsetDateTime::now_utc() - TimeDuration::hours(2);
        keys.sign_at(user, TokenKind::Access, two_hours_ago, Map::new())
            .expect("sign expired")
    }

    #[test]
    fn access_token_round_trip() {
        let keys = make_keys();
        let user = User::fake("ann@example.com", Role::Admin);
        let token = keys.issue_access(&user).expect("sign access");
        assert!(keys.is_valid(&token, &user));

        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "ann@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[test]
    fn expired_token_is_invalid_but_subject_is_recoverable() {
        let keys = make_keys();
        let user = User::fake("bob@example.com", Role::Vendor);
        let token = expired_access(&keys, &user);
        assert!(!keys.is_valid(&token, &user));
        assert_eq!(keys.extract_subject(&token).unwrap(), "bob@example.com");
    }

    #[test]
    fn subject_mismatch_is_invalid() {
        let keys = make_keys();
        let owner = User::fake("owner@example.com", Role::Vendor);
        let other = User::fake("other@example.com", Role::Vendor);
        let token = keys.issue_access(&owner).unwrap();
        assert!(!keys.is_valid(&token, &other));
    }

    #[test]
    fn forged_token_is_rejected() {
        let keys = make_keys();
        let forger = make_keys_with("another-secret", "test-issuer", "test-aud");
        let user = User::fake("eve@example.com", Role::Admin);
        let token = forger.issue_access(&user).unwrap();
        assert!(!keys.is_valid(&token, &user));
        assert!(matches!(
            keys.extract_subject(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_token_never_panics() {
        let keys = make_keys();
        let user = User::fake("x@example.com", Role::Vendor);
        assert!(!keys.is_valid("not.a.jwt", &user));
        assert!(keys.extract_subject("").is_err());
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys_with("same-secret", "good-iss", "good-aud");
        let bad = make_keys_with("same-secret", "bad-iss", "bad-aud");
        let user = User::fake("x@example.com", Role::Vendor);
        let token = good.issue_access(&user).unwrap();
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn refresh_token_carries_kind_and_extra_claims() {
        let keys = make_keys();
        let user = User::fake("r@example.com", Role::Vendor);
        let mut extra = Map::new();
        extra.insert("device".into(), Value::from("cli"));
        extra.insert("sub".into(), Value::from("hijack@example.com"));
        let token = keys.issue_refresh(&user, extra).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.kind, TokenKind::Refresh);
        assert_eq!(claims.sub, "r@example.com");
        assert_eq!(claims.extra.get("device"), Some(&Value::from("cli")));
        assert_eq!(claims.exp - claims.iat, 60 * 60);

        assert!(keys.is_valid_kind(&token, &user, TokenKind::Refresh));
        assert!(!keys.is_valid_kind(&token, &user, TokenKind::Access));
    }
}
