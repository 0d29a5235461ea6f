#![allow(dead_code)]

use actix_web::{http::header, test};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use taskgate::auth::AuthResponse;
use taskgate::store::MemoryStore;
use taskgate::{AppState, Config};

/// Builds and initialises the full application around `$state`, the same way
/// `main.rs` does minus CORS and PostgreSQL.
#[macro_export]
macro_rules! init_app {
    ($state:expr) => {{
        let state: taskgate::AppState = $state;
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(state.clone()))
                .app_data(taskgate::routes::json_config())
                .wrap(actix_web::middleware::Logger::default())
                .service(taskgate::routes::health::health)
                .configure(taskgate::routes::config(&state)),
        )
        .await
    }};
}

/// Test configuration: no real database, bcrypt at its minimum cost.
pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("DATABASE_URL", "postgres://unused"),
        ("JWT_SECRET", "integration-test-secret"),
        ("BCRYPT_COST", "4"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config should parse")
}

pub fn test_state(config: &Config) -> AppState {
    let store = Arc::new(MemoryStore::new());
    AppState::new(config, store.clone(), store).expect("app state should build")
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn signup(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> actix_web::http::StatusCode {
    let req = test::TestRequest::post()
        .uri("/signup")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    test::call_service(app, req).await.status()
}

/// Signs a user up and logs them in, returning the session token.
pub async fn register_and_login(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    username: &str,
    password: &str,
) -> Result<String, String> {
    let status = signup(app, username, password).await;
    if status != actix_web::http::StatusCode::CREATED {
        return Err(format!("signup for {} failed with {}", username, status));
    }

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    if !status.is_success() {
        return Err(format!(
            "login for {} failed with {}: {}",
            username,
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    let auth: AuthResponse = serde_json::from_slice(&body)
        .map_err(|e| format!("failed to parse login response: {}", e))?;
    Ok(auth.token)
}
