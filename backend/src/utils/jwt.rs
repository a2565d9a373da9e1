use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::{session::UserSession, user::Role};

/// Claims carried by both token kinds. The whole session identity travels in
/// the token; nothing is kept server-side. Access and refresh tokens share
/// this shape but are signed with independent secrets, so each kind verifies
/// only under its own key.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub unit_id: Option<String>,
    pub post_id: Option<String>,
    /// Expiration time (unix seconds).
    pub exp: i64,
    /// Issued at (unix seconds).
    pub iat: i64,
}

impl SessionClaims {
    fn new(session: &UserSession, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: session.user_id.clone(),
            username: session.username.clone(),
            full_name: session.full_name.clone(),
            role: session.role,
            unit_id: session.unit_id.clone(),
            post_id: session.post_id.clone(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn into_session(self) -> UserSession {
        UserSession {
            user_id: self.sub,
            username: self.username,
            full_name: self.full_name,
            role: self.role,
            unit_id: self.unit_id,
            post_id: self.post_id,
        }
    }
}

fn issue(session: &UserSession, secret: &str, ttl: Duration) -> anyhow::Result<String> {
    let claims = SessionClaims::new(session, ttl);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

fn verify(token: &str, secret: &str) -> anyhow::Result<SessionClaims> {
    let validation = Validation::default();
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;
    Ok(token_data.claims)
}

pub fn create_access_token(
    session: &UserSession,
    secret: &str,
    expiration_hours: u64,
) -> anyhow::Result<String> {
    issue(session, secret, Duration::hours(expiration_hours as i64))
}

pub fn create_refresh_token(
    session: &UserSession,
    secret: &str,
    expiration_days: u64,
) -> anyhow::Result<String> {
    issue(session, secret, Duration::days(expiration_days as i64))
}

pub fn verify_access_token(token: &str, secret: &str) -> anyhow::Result<SessionClaims> {
    verify(token, secret)
}

pub fn verify_refresh_token(token: &str, secret: &str) -> anyhow::Result<SessionClaims> {
    verify(token, secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> UserSession {
        UserSession {
            user_id: "user-123".into(),
            username: "guardia1".into(),
            full_name: "Guardia Uno".into(),
            role: Role::Agente,
            unit_id: Some("unit-1".into()),
            post_id: Some("post-1".into()),
        }
    }

    #[test]
    fn access_token_roundtrips_session_claims() {
        let token = create_access_token(&session(), "access-secret", 8).expect("create token");
        let claims = verify_access_token(&token, "access-secret").expect("verify token");
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.role, Role::Agente);

        let restored = claims.into_session();
        assert_eq!(restored.unit_id.as_deref(), Some("unit-1"));
        assert_eq!(restored.post_id.as_deref(), Some("post-1"));
    }

    #[test]
    fn tokens_do_not_verify_under_the_other_key() {
        let access = create_access_token(&session(), "access-secret", 8).unwrap();
        let refresh = create_refresh_token(&session(), "refresh-secret", 7).unwrap();

        assert!(verify_refresh_token(&access, "refresh-secret").is_err());
        assert!(verify_access_token(&refresh, "access-secret").is_err());
        assert!(verify_access_token(&access, "wrong").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue(&session(), "access-secret", Duration::hours(-2)).unwrap();
        assert!(verify_access_token(&token, "access-secret").is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let mut token = create_access_token(&session(), "access-secret", 8).unwrap();
        token.push('x');
        assert!(verify_access_token(&token, "access-secret").is_err());
    }
}
