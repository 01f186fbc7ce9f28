//! Bearer token issuing and checking
//!
//! A token is issued at login and lives exactly as long as the session it
//! was issued for. The auth middleware additionally requires the stored
//! session to still be valid, so logging out revokes the token.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use domain_party::{ActorRole, UserSession};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (normalized username)
    pub sub: String,
    pub role: ActorRole,
    pub name: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// Creates a token for a session
///
/// The token is issued at the session's login instant and expires when the
/// session does.
pub fn create_token(session: &UserSession, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    let claims = Claims {
        sub: session.username.clone(),
        role: session.role,
        name: session.display_name.clone(),
        exp: session.expires_at(ttl).timestamp(),
        iat: session.login_at.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a token and returns its claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(login_at: chrono::DateTime<Utc>) -> UserSession {
        UserSession {
            username: "intermediary".to_string(),
            role: ActorRole::Intermediary,
            display_name: "Kamau Insurance Brokers".to_string(),
            email: "ops@kamau.co.ke".to_string(),
            phone: "0722000111".to_string(),
            login_at,
        }
    }

    #[test]
    fn test_token_round_trip_carries_role() {
        let token = create_token(&session(Utc::now()), "secret", Duration::hours(24)).unwrap();
        let claims = validate_token(&token, "secret").unwrap();

        assert_eq!(claims.sub, "intermediary");
        assert_eq!(claims.role, ActorRole::Intermediary);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token(&session(Utc::now()), "secret", Duration::hours(24)).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_session_token_is_rejected() {
        let stale = session(Utc::now() - Duration::hours(25));
        let token = create_token(&stale, "secret", Duration::hours(24)).unwrap();
        assert!(matches!(validate_token(&token, "secret"), Err(AuthError::TokenExpired)));
    }
}
