pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::state::AppState;

/// Registers the public auth routes and the gated `/api` scope.
///
/// `/signup` and `/login` are reachable without a token; everything under
/// `/api` goes through [`AuthMiddleware`] first.
pub fn config(state: &AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    let codec = state.codec.clone();
    move |cfg| {
        cfg.service(auth::signup).service(auth::login).service(
            web::scope("/api").wrap(AuthMiddleware::new(codec)).service(
                web::scope("/tasks")
                    .service(tasks::get_tasks)
                    .service(tasks::create_task)
                    .service(tasks::get_task)
                    .service(tasks::update_task)
                    .service(tasks::delete_task),
            ),
        );
    }
}

/// JSON extractor settings: undecodable bodies become a JSON 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}
