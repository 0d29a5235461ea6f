use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use log::{error, info};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;

use taskgate::routes::{self, health};
use taskgate::store::PgStore;
use taskgate::{AppState, Config};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|err| {
        error!("invalid configuration: {}", err);
        io::Error::new(io::ErrorKind::InvalidInput, err)
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.store_timeout)
        .connect(&config.database_url)
        .await
        .map_err(|err| {
            error!("failed to connect to database: {}", err);
            io::Error::new(io::ErrorKind::Other, err)
        })?;
    info!("connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|err| {
            error!("failed to run migrations: {}", err);
            io::Error::new(io::ErrorKind::Other, err)
        })?;

    let store = Arc::new(PgStore::new(pool));
    let state = AppState::new(&config, store.clone(), store).map_err(|err| {
        error!("failed to initialise auth service: {}", err);
        io::Error::new(io::ErrorKind::Other, err)
    })?;

    let allowed_origin = config.cors_allowed_origin.clone();
    info!("Starting taskgate server at {}", config.server_url());
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::ORIGIN,
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::AUTHORIZATION,
            ])
            .expose_headers(vec![header::CONTENT_LENGTH])
            .supports_credentials()
            .max_age(12 * 60 * 60);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::config(&state))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
