pub mod extractors;
pub mod middleware;
pub mod password;
pub mod session;
pub mod token;

use serde::Deserialize;
use validator::Validate;

// Re-export the pieces handlers touch most.
pub use extractors::{AuthenticatedUserId, RefreshSession};
pub use middleware::{AccessTokenGate, RefreshSessionGate};
pub use password::{hash_password, verify_password};
pub use session::{create_session, find_user_by_session_token, is_expired};
pub use token::{generate_refresh_token, Claims, TokenIssuer};

/// Payload for creating an account: signup and sub-user creation share it.
/// The email is trimmed by the handler before validation.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 100))]
    pub password: String,
}

/// Payload for a login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 100))]
    pub password: String,
}
