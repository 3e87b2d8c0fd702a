use crate::error::AppError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Access tokens are short-lived: 15 minutes.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: i32,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Issues and verifies signed access tokens.
///
/// Holds the HS256 keys derived from the signing secret, which is injected
/// once at startup from configuration and shared read-only through
/// `web::Data`. Verification is stateless: signature plus expiry, no lookup.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, ACCESS_TOKEN_TTL_SECS)
    }

    /// Builds an issuer with a custom access-token lifetime. A zero or
    /// negative lifetime produces tokens that are already expired, which the
    /// tests use to exercise the expiry path without a clock.
    pub fn with_ttl(secret: &str, access_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs,
        }
    }

    /// Produces a signed access token embedding `user_id` and an expiry
    /// `access_ttl_secs` from now.
    pub fn issue(&self, user_id: i32) -> Result<String, AppError> {
        let expiration = chrono::Utc::now().timestamp() + self.access_ttl_secs;
        let claims = Claims {
            sub: user_id,
            exp: expiration as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("failed to sign access token: {}", e)))
    }

    /// Verifies a token's signature and expiry and decodes its claims.
    ///
    /// Expiry is checked with zero leeway: a token is rejected the second it
    /// lapses. Any failure is an authentication error.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid access token: {}", e)))
    }
}

/// Produces an opaque refresh token: 32 cryptographically random bytes,
/// base64 URL-safe encoded. It carries no claims; a refresh token is only
/// meaningful once persisted in the session ledger.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_issue_and_verify() {
        let issuer = TokenIssuer::new("test_secret_for_issue_verify");
        let token = issuer.issue(1).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, 1);

        // The embedded expiry sits 15 minutes out.
        let now = chrono::Utc::now().timestamp();
        let remaining = claims.exp as i64 - now;
        assert!((ACCESS_TOKEN_TTL_SECS - 5..=ACCESS_TOKEN_TTL_SECS).contains(&remaining));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = TokenIssuer::with_ttl("test_secret_for_expiration", -3600);
        let expired_token = issuer.issue(2).unwrap();

        match issuer.verify(&expired_token) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("ExpiredSignature"), "unexpected message: {}", msg);
            }
            Ok(_) => panic!("token should have been rejected as expired"),
            Err(e) => panic!("unexpected error type: {:?}", e),
        }
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let issuer = TokenIssuer::new("one_secret");
        let other = TokenIssuer::new("a_completely_different_secret");

        let token = issuer.issue(3).unwrap();
        match other.verify(&token) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(
                    msg.contains("InvalidSignature") || msg.contains("InvalidToken"),
                    "unexpected message: {}",
                    msg
                );
            }
            Ok(_) => panic!("token should have been rejected for signature mismatch"),
            Err(e) => panic!("unexpected error type: {:?}", e),
        }
    }

    #[test]
    fn test_refresh_tokens_are_opaque_and_unique() {
        let first = generate_refresh_token();
        let second = generate_refresh_token();

        assert_ne!(first, second);
        // 32 random bytes encode to 43 base64 characters, well past the
        // 128-bit entropy floor.
        assert_eq!(first.len(), 43);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
