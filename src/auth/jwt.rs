use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

/// Signing material and token lifetime, built once at startup.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_hours.saturating_mul(60 * 60)
    }

    pub fn sign_token(&self, user_id: Uuid, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = TimeDelta::try_hours(self.ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AppError::internal(format!("Token lifetime out of range: {}h", self.ttl_hours)))?;
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::internal(format!("Token signing failed: {e}")))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|d| d.claims)
            .map_err(|e| AppError::unauthorized(format!("Invalid or expired token: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_token_verifies() {
        let keys = JwtKeys::new("test-secret", 8);
        let user_id = Uuid::new_v4();
        let token = keys.sign_token(user_id, "maker@example.com").unwrap();

        let claims = keys.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "maker@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = JwtKeys::new("one", 8).sign_token(Uuid::new_v4(), "a@b.c").unwrap();
        let err = JwtKeys::new("two", 8).verify_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        let keys = JwtKeys::new("secret", i64::MAX);
        assert_eq!(keys.ttl_seconds(), i64::MAX);
        let err = keys.sign_token(Uuid::new_v4(), "a@b.c").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JwtKeys::new("secret", -2);
        let token = keys.sign_token(Uuid::new_v4(), "a@b.c").unwrap();
        assert!(keys.verify_token(&token).is_err());
    }
}
