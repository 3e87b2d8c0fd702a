//! The session ledger: refresh-token sessions stored on the user row.
//!
//! Sessions live in a JSONB array column. Appends go through a single
//! `sessions || $n::jsonb` update, so two logins racing on the same user
//! both land; there is no read-modify-write to lose. Expired entries are
//! never pruned, they are just invalid at validation time.

use chrono::Utc;
use serde_json::json;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::auth::token::generate_refresh_token;
use crate::error::AppError;
use crate::models::{Session, User};

/// Refresh tokens live for 10 days.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 10 * 24 * 60 * 60;

/// Issues a refresh token for `user_id`, appends the `{token, expires_at}`
/// entry to the user's session list, and returns the token.
pub async fn create_session(pool: &PgPool, user_id: i32) -> Result<String, AppError> {
    let entry = Session {
        token: generate_refresh_token(),
        expires_at: Utc::now().timestamp() + REFRESH_TOKEN_TTL_SECS,
    };

    let result = sqlx::query("UPDATE users SET sessions = sessions || $2::jsonb WHERE id = $1")
        .bind(user_id)
        .bind(Json(&entry))
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(entry.token)
}

/// Looks up the user whose id matches and whose session list contains an
/// entry with the given token, regardless of expiry. Expiry is the caller's
/// check: the refresh gate scans the returned sessions itself.
pub async fn find_user_by_session_token(
    pool: &PgPool,
    user_id: i32,
    token: &str,
) -> Result<Option<User>, AppError> {
    let probe = Json(json!([{ "token": token }]));

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, is_owner, owner_id, sessions \
         FROM users WHERE id = $1 AND sessions @> $2",
    )
    .bind(user_id)
    .bind(probe)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// A session is expired once its expiry second has been reached.
pub fn is_expired(expires_at: i64) -> bool {
    expires_at <= Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_expired_boundaries() {
        let now = Utc::now().timestamp();

        assert!(is_expired(now - 1));
        assert!(is_expired(now));
        assert!(!is_expired(now + 60));
        assert!(!is_expired(now + REFRESH_TOKEN_TTL_SECS));
    }
}
