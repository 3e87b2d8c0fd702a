use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

/// One active login: a refresh token and its expiry in epoch seconds.
///
/// Sessions are embedded in their user row and never mutated; an expired
/// entry is simply treated as invalid at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub expires_at: i64,
}

/// A user row. `owner_id` is set exactly when `is_owner` is false: sub-users
/// carry a reference to the owner account that created them.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub is_owner: bool,
    pub owner_id: Option<i32>,
    pub sessions: Json<Vec<Session>>,
}

/// The user shape returned by the API. Deliberately omits `password_hash`
/// and `sessions`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub is_owner: bool,
    pub owner_id: Option<i32>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_owner: user.is_owner,
            owner_id: user.owner_id,
        }
    }
}
