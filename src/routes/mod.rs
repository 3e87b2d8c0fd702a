pub mod health;
pub mod lists;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::{AccessTokenGate, RefreshSessionGate};

/// The full route tree.
///
/// Signup and login are open. The token-renewal route sits alone behind the
/// refresh-session gate. Everything else is behind the access-token gate.
/// Registration order matters: the literal `/users/...` resources must come
/// before the `/{user_id}/tasks` patterns inside the `/users` scope, and the
/// `/users/me` scope before the `/users` scope.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(users::signup)
        .service(users::login)
        .service(
            web::scope("/users/me")
                .wrap(RefreshSessionGate)
                .service(users::renew_access_token),
        )
        .service(
            web::scope("/users")
                .wrap(AccessTokenGate)
                .service(users::create_sub_user)
                .service(users::get_sub_users)
                .service(users::delete_sub_user)
                .service(tasks::get_sub_user_tasks)
                .service(tasks::create_sub_user_task)
                .service(tasks::get_sub_user_task)
                .service(tasks::update_sub_user_task)
                .service(tasks::delete_sub_user_task),
        )
        .service(
            web::scope("/lists")
                .wrap(AccessTokenGate)
                .service(lists::get_lists)
                .service(lists::create_list)
                .service(lists::update_list)
                .service(lists::delete_list)
                .service(tasks::get_list_tasks)
                .service(tasks::create_list_task)
                .service(tasks::get_list_task)
                .service(tasks::update_list_task)
                .service(tasks::delete_list_task),
        );
}
