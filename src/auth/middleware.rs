use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;

use crate::auth::extractors::RefreshSession;
use crate::auth::session::{find_user_by_session_token, is_expired};
use crate::auth::token::TokenIssuer;
use crate::error::AppError;

/// Request/response header carrying the signed access token.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";
/// Request/response header carrying the opaque refresh token.
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";
/// Request header carrying the claimed user id on the token-renewal route.
pub const USER_ID_HEADER: &str = "_id";

/// Stateless access-token gate.
///
/// Verifies the `x-access-token` header against the shared `TokenIssuer`; on
/// success the decoded claims land in request extensions for the
/// `AuthenticatedUserId` extractor. Any failure short-circuits with 401
/// before the downstream handler runs.
pub struct AccessTokenGate;

impl<S, B> Transform<S, ServiceRequest> for AccessTokenGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AccessTokenGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessTokenGateService { service }))
    }
}

pub struct AccessTokenGateService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AccessTokenGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let issuer = req.app_data::<web::Data<TokenIssuer>>().cloned();
        let token = req
            .headers()
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let issuer = match issuer {
            Some(issuer) => issuer,
            None => {
                let err = AppError::InternalServerError("token issuer is not configured".into());
                return Box::pin(async move { Err(err.into()) });
            }
        };

        match token {
            Some(token) => match issuer.verify(&token) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    Box::pin(self.service.call(req))
                }
                Err(err) => Box::pin(async move { Err(err.into()) }),
            },
            None => {
                let err = AppError::Unauthorized("Missing access token".into());
                Box::pin(async move { Err(err.into()) })
            }
        }
    }
}

/// Stateful refresh-session gate, used only by the token-renewal route.
///
/// Resolves the `x-refresh-token` and `_id` headers against the session
/// ledger. On success a `RefreshSession` (the matched user record plus the
/// presented token) lands in request extensions. Every non-success branch
/// answers 401 explicitly: missing headers, no matching user, and a known
/// user whose matching entries are all expired are each rejected.
pub struct RefreshSessionGate;

impl<S, B> Transform<S, ServiceRequest> for RefreshSessionGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RefreshSessionGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RefreshSessionGateService {
            service: Rc::new(service),
        }))
    }
}

pub struct RefreshSessionGateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RefreshSessionGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = req
                .headers()
                .get(REFRESH_TOKEN_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
                .ok_or_else(|| AppError::Unauthorized("Missing refresh token".into()))?;

            let user_id = req
                .headers()
                .get(USER_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<i32>().ok())
                .ok_or_else(|| AppError::Unauthorized("Missing or malformed _id header".into()))?;

            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| {
                    AppError::InternalServerError("database pool is not configured".into())
                })?;

            let user = find_user_by_session_token(&pool, user_id, &token)
                .await?
                .ok_or_else(|| {
                    AppError::Unauthorized(
                        "User not found. Make sure that the user id and refresh token are correct"
                            .into(),
                    )
                })?;

            let session_valid = user
                .sessions
                .iter()
                .any(|session| session.token == token && !is_expired(session.expires_at));

            if !session_valid {
                return Err(AppError::Unauthorized(
                    "Refresh token has expired or the session is invalid".into(),
                )
                .into());
            }

            req.extensions_mut().insert(RefreshSession {
                user,
                refresh_token: token,
            });

            service.call(req).await
        })
    }
}
