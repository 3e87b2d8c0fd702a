use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::User;

/// Extracts the authenticated user's id from request extensions.
///
/// Intended for routes behind `AccessTokenGate`, which validates the access
/// token and inserts the decoded claims. If the claims are missing the gate
/// did not run; rejecting with 401 is the safe default.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUserId(pub i32);

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthenticatedUserId(claims.sub))),
            None => {
                let err = AppError::Unauthorized(
                    "No authenticated identity on this request".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

/// The verified refresh-session context on the token-renewal route:
/// the matched user record and the refresh token that was presented.
///
/// Inserted by `RefreshSessionGate`; extraction fails with 401 if the gate
/// did not run.
#[derive(Debug, Clone)]
pub struct RefreshSession {
    pub user: User,
    pub refresh_token: String,
}

impl FromRequest for RefreshSession {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<RefreshSession>() {
            Some(session) => ready(Ok(session.clone())),
            None => {
                let err = AppError::Unauthorized(
                    "No verified refresh session on this request".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use sqlx::types::Json;

    #[actix_rt::test]
    async fn test_authenticated_user_id_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(Claims { sub: 123, exp: 0 });

        let mut payload = Payload::None;
        let extracted = AuthenticatedUserId::from_request(&req, &mut payload).await;
        assert_eq!(extracted.unwrap().0, 123);
    }

    #[actix_rt::test]
    async fn test_authenticated_user_id_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let result = AuthenticatedUserId::from_request(&req, &mut payload).await;
        assert!(result.is_err());

        let response = result.unwrap_err().error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_refresh_session_extractor() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(RefreshSession {
            user: User {
                id: 5,
                email: "session@example.com".to_string(),
                password_hash: "hash".to_string(),
                is_owner: true,
                owner_id: None,
                sessions: Json(vec![]),
            },
            refresh_token: "sometoken".to_string(),
        });

        let mut payload = Payload::None;
        let extracted = RefreshSession::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(extracted.user.id, 5);
        assert_eq!(extracted.refresh_token, "sometoken");

        let bare_req = test::TestRequest::default().to_http_request();
        let missing = RefreshSession::from_request(&bare_req, &mut payload).await;
        assert!(missing.is_err());
    }
}
