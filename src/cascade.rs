//! Detached cascade deletion of tasks.
//!
//! Deleting a list or a sub-user orphans the tasks referencing it. The
//! cascade runs as a follow-up task on the runtime, decoupled from the
//! request that triggered it: the primary delete response is not held back.
//! Failures are retried a bounded number of times and logged; there is no
//! rollback of the primary deletion.

use std::time::Duration;

use sqlx::PgPool;
use uuid::Uuid;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(250);

/// Which parent was deleted, and therefore which tasks to remove.
#[derive(Debug, Clone, Copy)]
pub enum CascadeScope {
    /// Remove tasks whose `list_id` references the deleted list.
    List(Uuid),
    /// Remove tasks whose `user_id` references the deleted sub-user.
    SubUser(i32),
}

/// Spawns the cascade for `scope` and returns immediately.
pub fn spawn_task_cascade(pool: PgPool, scope: CascadeScope) {
    actix_web::rt::spawn(async move {
        for attempt in 1..=MAX_ATTEMPTS {
            match delete_tasks(&pool, scope).await {
                Ok(removed) => {
                    log::debug!("cascade for {:?} removed {} task(s)", scope, removed);
                    return;
                }
                Err(err) if attempt < MAX_ATTEMPTS => {
                    log::warn!(
                        "cascade for {:?} failed on attempt {}: {}",
                        scope,
                        attempt,
                        err
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(err) => {
                    log::error!(
                        "cascade for {:?} gave up after {} attempts: {}",
                        scope,
                        MAX_ATTEMPTS,
                        err
                    );
                }
            }
        }
    });
}

async fn delete_tasks(pool: &PgPool, scope: CascadeScope) -> Result<u64, sqlx::Error> {
    let result = match scope {
        CascadeScope::List(list_id) => {
            sqlx::query("DELETE FROM tasks WHERE list_id = $1")
                .bind(list_id)
                .execute(pool)
                .await?
        }
        CascadeScope::SubUser(user_id) => {
            sqlx::query("DELETE FROM tasks WHERE user_id = $1")
                .bind(user_id)
                .execute(pool)
                .await?
        }
    };

    Ok(result.rows_affected())
}
