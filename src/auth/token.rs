//! Stateless session tokens: HS256-signed, 24-hour expiry.
//!
//! Validity is purely a function of signature and expiry; nothing is stored
//! server-side, so early revocation means rotating the signing secret.

use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 86_400;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    /// Expiry, Unix epoch seconds.
    pub exp: i64,
}

/// Holds the server signing secret. The secret is optional at construction;
/// any token operation without it surfaces as a 500, per the configuration
/// contract.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Option<String>,
}

impl TokenSigner {
    pub fn new(secret: Option<String>) -> Self {
        TokenSigner { secret }
    }

    fn secret(&self) -> Result<&str, AppError> {
        self.secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(AppError::Misconfigured("AUTH_SECRET is not set"))
    }

    /// Issue a token bound to the user id, expiring in 24 hours.
    pub fn issue(&self, user_id: &str) -> Result<String, AppError> {
        let secret = self.secret()?;
        let claims = Claims {
            sub: user_id.to_string(),
            exp: chrono::Utc::now().timestamp() + TOKEN_TTL_SECS,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    /// Verify signature and expiry; returns the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let secret = self.secret()?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("invalid or expired token".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(Some("test-secret".into()))
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let s = signer();
        let token = s.issue("user-1").unwrap();
        let claims = s.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > chrono::Utc::now().timestamp());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = signer().issue("user-1").unwrap();
        let other = TokenSigner::new(Some("other-secret".into()));
        assert!(matches!(
            other.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: "user-1".into(),
            exp: chrono::Utc::now().timestamp() - 120,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(matches!(
            signer().verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(signer().verify("not.a.token").is_err());
    }

    #[test]
    fn missing_secret_is_a_server_error() {
        let s = TokenSigner::new(None);
        assert!(matches!(
            s.issue("user-1"),
            Err(AppError::Misconfigured(_))
        ));
        assert!(matches!(
            s.verify("whatever"),
            Err(AppError::Misconfigured(_))
        ));
        let empty = TokenSigner::new(Some(String::new()));
        assert!(matches!(
            empty.issue("user-1"),
            Err(AppError::Misconfigured(_))
        ));
    }
}
