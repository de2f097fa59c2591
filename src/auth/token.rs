use crate::error::AppError;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// The claims this client reads from the backend's JWT.
///
/// Only expiry matters on the client; the signature is the server's business.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Expiration timestamp (seconds since epoch). Tokens without one never expire
    /// client-side.
    #[serde(default)]
    pub exp: Option<f64>,
}

impl Claims {
    /// True when `exp` lies strictly before `now`, compared at millisecond precision.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.exp {
            Some(exp) => exp < now.timestamp_millis() as f64 / 1000.0,
            None => false,
        }
    }
}

/// Decodes the payload of a JWT without verifying its signature.
///
/// # Returns
/// The decoded `Claims`, or `AppError::Token` if the token is not a well-formed JWT.
pub fn decode_claims(token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::Token(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token_with(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("whatever-the-server-uses".as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_decode_without_knowing_the_secret() {
        let exp = (Utc::now() + chrono::Duration::hours(24)).timestamp();
        let token = token_with(json!({ "sub": 17, "email": "a@example.com", "exp": exp }));

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.exp, Some(exp as f64));
        assert!(!claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_token_expiration() {
        let exp = (Utc::now() - chrono::Duration::hours(2)).timestamp();
        let token = token_with(json!({ "sub": "2", "exp": exp }));

        let claims = decode_claims(&token).unwrap();
        assert!(claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_expiry_is_strict() {
        let now = Utc::now();
        let claims = Claims {
            exp: Some(now.timestamp_millis() as f64 / 1000.0),
        };
        assert!(!claims.is_expired_at(now));
        assert!(claims.is_expired_at(now + chrono::Duration::milliseconds(1)));
    }

    #[test]
    fn test_missing_exp_never_expires() {
        let token = token_with(json!({ "sub": "3" }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.exp, None);
        assert!(!claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_malformed_token() {
        match decode_claims("not-a-jwt") {
            Err(AppError::Token(msg)) => assert!(msg.contains("Invalid token")),
            other => panic!("expected token error, got {:?}", other),
        }
    }
}
