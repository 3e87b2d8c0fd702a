use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthenticatedUserId,
    cascade::{spawn_task_cascade, CascadeScope},
    error::AppError,
    models::{List, ListInput},
};

/// All of the caller's lists.
#[get("")]
pub async fn get_lists(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let lists = sqlx::query_as::<_, List>(
        "SELECT id, title, user_id FROM lists WHERE user_id = $1 ORDER BY title",
    )
    .bind(auth.0)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(lists))
}

/// Create a list owned by the caller.
#[post("")]
pub async fn create_list(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    payload: web::Json<ListInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let list = sqlx::query_as::<_, List>(
        "INSERT INTO lists (id, title, user_id) VALUES ($1, $2, $3) \
         RETURNING id, title, user_id",
    )
    .bind(Uuid::new_v4())
    .bind(&payload.title)
    .bind(auth.0)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(list))
}

/// Rename a list. The ownership check and the update are one scoped
/// statement: a list owned by someone else is a 404, same as a missing one.
#[patch("/{id}")]
pub async fn update_list(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<Uuid>,
    payload: web::Json<ListInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;
    let list_id = path.into_inner();

    let list = sqlx::query_as::<_, List>(
        "UPDATE lists SET title = $1 WHERE id = $2 AND user_id = $3 \
         RETURNING id, title, user_id",
    )
    .bind(&payload.title)
    .bind(list_id)
    .bind(auth.0)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("List not found".into()))?;

    Ok(HttpResponse::Ok().json(list))
}

/// Delete a list. Its tasks are removed by a detached cascade after the
/// response is sent.
#[delete("/{id}")]
pub async fn delete_list(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let list_id = path.into_inner();

    let result = sqlx::query("DELETE FROM lists WHERE id = $1 AND user_id = $2")
        .bind(list_id)
        .bind(auth.0)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("List not found".into()));
    }

    spawn_task_cascade(pool.get_ref().clone(), CascadeScope::List(list_id));

    Ok(HttpResponse::NoContent().finish())
}
