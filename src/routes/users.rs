use actix_web::{delete, get, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    auth::{
        create_session, hash_password, verify_password,
        middleware::{ACCESS_TOKEN_HEADER, REFRESH_TOKEN_HEADER},
        AuthenticatedUserId, LoginRequest, RefreshSession, SignupRequest, TokenIssuer,
    },
    cascade::{spawn_task_cascade, CascadeScope},
    error::AppError,
    models::{User, UserResponse},
};

/// Login failures use one message for unknown emails and wrong passwords.
const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Sign up a new owner account.
///
/// Returns the created user (without secrets) and sets the
/// `x-access-token` / `x-refresh-token` response headers.
#[post("/users")]
pub async fn signup(
    pool: web::Data<PgPool>,
    issuer: web::Data<TokenIssuer>,
    payload: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    let mut payload = payload.into_inner();
    payload.email = payload.email.trim().to_string();
    payload.validate()?;

    let existing = sqlx::query("SELECT id FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(&**pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::ValidationError("email is already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash, is_owner) VALUES ($1, $2, TRUE) \
         RETURNING id, email, password_hash, is_owner, owner_id, sessions",
    )
    .bind(&payload.email)
    .bind(&password_hash)
    .fetch_one(&**pool)
    .await?;

    let refresh_token = create_session(&pool, user.id).await?;
    let access_token = issuer.issue(user.id)?;

    Ok(HttpResponse::Created()
        .append_header((ACCESS_TOKEN_HEADER, access_token))
        .append_header((REFRESH_TOKEN_HEADER, refresh_token))
        .json(UserResponse::from(&user)))
}

/// Log in with email and password.
///
/// Same token contract as signup. Unknown email and wrong password produce
/// indistinguishable 401 responses.
#[post("/users/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    issuer: web::Data<TokenIssuer>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let mut payload = payload.into_inner();
    payload.email = payload.email.trim().to_string();
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, is_owner, owner_id, sessions \
         FROM users WHERE email = $1",
    )
    .bind(&payload.email)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::Unauthorized(BAD_CREDENTIALS.into()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    let refresh_token = create_session(&pool, user.id).await?;
    let access_token = issuer.issue(user.id)?;

    Ok(HttpResponse::Ok()
        .append_header((ACCESS_TOKEN_HEADER, access_token))
        .append_header((REFRESH_TOKEN_HEADER, refresh_token))
        .json(UserResponse::from(&user)))
}

/// Mint a fresh access token for the holder of a valid refresh session.
///
/// `RefreshSessionGate` has already matched the refresh token against the
/// session ledger; this handler only signs a new access token.
#[get("/access-token")]
pub async fn renew_access_token(
    issuer: web::Data<TokenIssuer>,
    session: RefreshSession,
) -> Result<impl Responder, AppError> {
    let access_token = issuer.issue(session.user.id)?;

    Ok(HttpResponse::Ok()
        .append_header((ACCESS_TOKEN_HEADER, access_token.clone()))
        .json(serde_json::json!({ "access_token": access_token })))
}

/// Create a sub-user account under the caller.
#[post("/create-sub-user")]
pub async fn create_sub_user(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    payload: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    let mut payload = payload.into_inner();
    payload.email = payload.email.trim().to_string();
    payload.validate()?;

    let existing = sqlx::query("SELECT id FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(&**pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::ValidationError("email is already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;

    let sub_user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash, is_owner, owner_id) \
         VALUES ($1, $2, FALSE, $3) \
         RETURNING id, email, password_hash, is_owner, owner_id, sessions",
    )
    .bind(&payload.email)
    .bind(&password_hash)
    .bind(auth.0)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(UserResponse::from(&sub_user)))
}

/// List the caller's sub-users.
#[get("/sub-users")]
pub async fn get_sub_users(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let sub_users = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, is_owner, owner_id, sessions \
         FROM users WHERE owner_id = $1 ORDER BY id",
    )
    .bind(auth.0)
    .fetch_all(&**pool)
    .await?;

    let body: Vec<UserResponse> = sub_users.iter().map(UserResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Delete one of the caller's sub-users.
///
/// A sub-user belonging to someone else resolves as 404. The sub-user's
/// tasks are removed by a detached cascade after the response is sent.
#[delete("/sub-users/{user_id}")]
pub async fn delete_sub_user(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let sub_user_id = path.into_inner();

    let result = sqlx::query("DELETE FROM users WHERE id = $1 AND owner_id = $2")
        .bind(sub_user_id)
        .bind(auth.0)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Sub-user not found".into()));
    }

    spawn_task_cascade(pool.get_ref().clone(), CascadeScope::SubUser(sub_user_id));

    Ok(HttpResponse::NoContent().finish())
}
