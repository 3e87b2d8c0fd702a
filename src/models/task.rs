use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A task. It belongs either to a list (`list_id` set, reached through the
/// list owner) or directly to a sub-user (`user_id` set). Both columns are
/// plain filter keys; nothing enforces exclusivity.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub list_id: Option<Uuid>,
    pub user_id: Option<i32>,
}

/// Input payload for creating or updating a task.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}
