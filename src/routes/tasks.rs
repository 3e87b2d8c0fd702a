//! Task CRUD, reachable through two ownership paths: via a list the caller
//! owns (`/lists/{list_id}/tasks`), or via a sub-user the caller owns
//! (`/users/{user_id}/tasks`). Either way the ownership filter is part of
//! the statement itself, so a foreign or missing parent is a 404 and a
//! foreign task never leaks its existence.

use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{List, Task, TaskInput},
};

/// Fetches the list only if the caller owns it; 404 otherwise.
async fn owned_list(pool: &PgPool, list_id: Uuid, user_id: i32) -> Result<List, AppError> {
    sqlx::query_as::<_, List>("SELECT id, title, user_id FROM lists WHERE id = $1 AND user_id = $2")
        .bind(list_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("List not found".into()))
}

/// Resolves the path user only if it is a sub-user of the caller; 404
/// otherwise. Existence alone is not enough to grant access.
async fn owned_sub_user(pool: &PgPool, sub_user_id: i32, owner_id: i32) -> Result<i32, AppError> {
    sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE id = $1 AND owner_id = $2")
        .bind(sub_user_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Sub-user not found".into()))
}

/* List-scoped tasks */

/// All tasks in one of the caller's lists.
#[get("/{list_id}/tasks")]
pub async fn get_list_tasks(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let list = owned_list(&pool, path.into_inner(), auth.0).await?;

    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, title, list_id, user_id FROM tasks WHERE list_id = $1",
    )
    .bind(list.id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Create a task in one of the caller's lists.
#[post("/{list_id}/tasks")]
pub async fn create_list_task(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<Uuid>,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;
    let list = owned_list(&pool, path.into_inner(), auth.0).await?;

    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (id, title, list_id) VALUES ($1, $2, $3) \
         RETURNING id, title, list_id, user_id",
    )
    .bind(Uuid::new_v4())
    .bind(&payload.title)
    .bind(list.id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(task))
}

/// One task in one of the caller's lists. A single join resolves the task
/// and the ownership check together.
#[get("/{list_id}/tasks/{task_id}")]
pub async fn get_list_task(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (list_id, task_id) = path.into_inner();

    let task = sqlx::query_as::<_, Task>(
        "SELECT t.id, t.title, t.list_id, t.user_id \
         FROM tasks t JOIN lists l ON t.list_id = l.id \
         WHERE t.id = $1 AND l.id = $2 AND l.user_id = $3",
    )
    .bind(task_id)
    .bind(list_id)
    .bind(auth.0)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Update a task in one of the caller's lists, in one scoped statement.
#[patch("/{list_id}/tasks/{task_id}")]
pub async fn update_list_task(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<(Uuid, Uuid)>,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;
    let (list_id, task_id) = path.into_inner();

    let task = sqlx::query_as::<_, Task>(
        "UPDATE tasks AS t SET title = $1 \
         FROM lists AS l \
         WHERE t.id = $2 AND t.list_id = l.id AND l.id = $3 AND l.user_id = $4 \
         RETURNING t.id, t.title, t.list_id, t.user_id",
    )
    .bind(&payload.title)
    .bind(task_id)
    .bind(list_id)
    .bind(auth.0)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Delete a task in one of the caller's lists, in one scoped statement.
#[delete("/{list_id}/tasks/{task_id}")]
pub async fn delete_list_task(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (list_id, task_id) = path.into_inner();

    let result = sqlx::query(
        "DELETE FROM tasks AS t \
         USING lists AS l \
         WHERE t.id = $1 AND t.list_id = l.id AND l.id = $2 AND l.user_id = $3",
    )
    .bind(task_id)
    .bind(list_id)
    .bind(auth.0)
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}

/* Sub-user-scoped tasks */

/// All tasks assigned directly to one of the caller's sub-users.
#[get("/{user_id}/tasks")]
pub async fn get_sub_user_tasks(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let sub_user_id = owned_sub_user(&pool, path.into_inner(), auth.0).await?;

    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, title, list_id, user_id FROM tasks WHERE user_id = $1",
    )
    .bind(sub_user_id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Create a task assigned directly to one of the caller's sub-users.
#[post("/{user_id}/tasks")]
pub async fn create_sub_user_task(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<i32>,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;
    let sub_user_id = owned_sub_user(&pool, path.into_inner(), auth.0).await?;

    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (id, title, user_id) VALUES ($1, $2, $3) \
         RETURNING id, title, list_id, user_id",
    )
    .bind(Uuid::new_v4())
    .bind(&payload.title)
    .bind(sub_user_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(task))
}

/// One task assigned to one of the caller's sub-users.
#[get("/{user_id}/tasks/{task_id}")]
pub async fn get_sub_user_task(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<(i32, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (sub_user_id, task_id) = path.into_inner();

    let task = sqlx::query_as::<_, Task>(
        "SELECT t.id, t.title, t.list_id, t.user_id \
         FROM tasks t JOIN users u ON t.user_id = u.id \
         WHERE t.id = $1 AND u.id = $2 AND u.owner_id = $3",
    )
    .bind(task_id)
    .bind(sub_user_id)
    .bind(auth.0)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Update a task assigned to one of the caller's sub-users.
#[patch("/{user_id}/tasks/{task_id}")]
pub async fn update_sub_user_task(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<(i32, Uuid)>,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    payload.validate()?;
    let (sub_user_id, task_id) = path.into_inner();

    let task = sqlx::query_as::<_, Task>(
        "UPDATE tasks AS t SET title = $1 \
         FROM users AS u \
         WHERE t.id = $2 AND t.user_id = u.id AND u.id = $3 AND u.owner_id = $4 \
         RETURNING t.id, t.title, t.list_id, t.user_id",
    )
    .bind(&payload.title)
    .bind(task_id)
    .bind(sub_user_id)
    .bind(auth.0)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Delete a task assigned to one of the caller's sub-users.
#[delete("/{user_id}/tasks/{task_id}")]
pub async fn delete_sub_user_task(
    pool: web::Data<PgPool>,
    auth: AuthenticatedUserId,
    path: web::Path<(i32, Uuid)>,
) -> Result<impl Responder, AppError> {
    let (sub_user_id, task_id) = path.into_inner();

    let result = sqlx::query(
        "DELETE FROM tasks AS t \
         USING users AS u \
         WHERE t.id = $1 AND t.user_id = u.id AND u.id = $2 AND u.owner_id = $3",
    )
    .bind(task_id)
    .bind(sub_user_id)
    .bind(auth.0)
    .execute(&**pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
