use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A task list, owned by exactly one user.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct List {
    pub id: Uuid,
    pub title: String,
    pub user_id: i32,
}

/// Input payload for creating or renaming a list.
#[derive(Debug, Deserialize, Validate)]
pub struct ListInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}
