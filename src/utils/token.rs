use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorMessage, HttpError};

/// Session claims issued by the auth provider. `sub` is the profile id.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub role: Option<String>,
}

pub fn decode_token<T: Into<String>>(token: T, secret: &[u8]) -> Result<String, HttpError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Provider tokens carry aud = "authenticated"; the signature is what we trust
    validation.validate_aud = false;

    let decoded = decode::<TokenClaims>(
        &token.into(),
        &DecodingKey::from_secret(secret),
        &validation,
    );

    match decoded {
        Ok(token) => Ok(token.claims.sub),
        Err(_) => Err(HttpError::unauthorized(ErrorMessage::InvalidToken.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn create_token(sub: &str, secret: &[u8], expires_in: Duration) -> String {
        let claims = TokenClaims {
            sub: sub.to_string(),
            exp: (Utc::now() + expires_in).timestamp() as usize,
            role: Some("authenticated".to_string()),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    #[test]
    fn test_valid_token_yields_subject() {
        let token = create_token("5b0c7c1e-1111-4e4e-9a9a-000000000001", b"secret", Duration::minutes(5));
        assert_eq!(
            decode_token(token, b"secret").unwrap(),
            "5b0c7c1e-1111-4e4e-9a9a-000000000001"
        );
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token("someone", b"secret", Duration::minutes(5));
        let err = decode_token(token, b"other-secret").unwrap_err();
        assert_eq!(err.message, ErrorMessage::InvalidToken.to_string());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = create_token("someone", b"secret", Duration::hours(-2));
        assert!(decode_token(token, b"secret").is_err());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(decode_token("not.a.jwt", b"secret").is_err());
    }
}
