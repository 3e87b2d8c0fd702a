use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;

use tasknest::auth::TokenIssuer;
use tasknest::config::Config;
use tasknest::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // The signing secret is read once here; the issuer is the only holder.
    let issuer = web::Data::new(TokenIssuer::new(&config.jwt_secret));

    log::info!("Starting tasknest server at {}", config.server_url());

    let host = config.server_host.clone();
    let port = config.server_port;

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(issuer.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .expose_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
