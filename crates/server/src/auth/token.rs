//! JWT signing and verification

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub exp: usize,
}

/// HS256 keys derived from the configured secret
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    /// `None` when the configured day count does not fit in a `TimeDelta`
    ttl: Option<TimeDelta>,
}

impl TokenKeys {
    pub fn new(secret: &[u8], ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: TimeDelta::try_days(ttl_days),
        }
    }

    /// Create a token asserting `user_id`
    pub fn sign(&self, user_id: &str) -> Result<String> {
        let expires_at = self
            .ttl
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| Error::Internal("token lifetime out of range".to_string()))?;

        let claims = Claims {
            sub: user_id.to_owned(),
            exp: expires_at.timestamp().max(0) as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Check signature and expiry
    pub fn verify(&self, token: &str) -> core::result::Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_then_verify() {
        let keys = TokenKeys::new(b"test-secret", 30);
        let token = keys.sign("user-42").unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-42");
        assert!(claims.exp as i64 > Utc::now().timestamp());
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = TokenKeys::new(b"one", 30).sign("user-42").unwrap();
        assert!(TokenKeys::new(b"two", 30).verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Well past the default 60s leeway
        let keys = TokenKeys::new(b"test-secret", -1);
        let token = keys.sign("user-42").unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let keys = TokenKeys::new(b"test-secret", 30);
        assert!(keys.verify("not.a.jwt").is_err());
    }

    #[test]
    fn test_huge_ttl_fails_without_panicking() {
        for ttl_days in [100_000_000, i64::MAX] {
            let keys = TokenKeys::new(b"test-secret", ttl_days);
            let err = keys.sign("user-42").unwrap_err();
            assert!(matches!(err, Error::Internal(_)), "{ttl_days}: {err:?}");
        }
    }
}
