use crate::{
    auth::{AuthResponse, Credentials},
    error::{AppError, INVALID_CREDENTIALS},
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use log::debug;
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Responds 201 with the new user's id. An empty or oversized field is a 400;
/// an existing username answers with the configured status.
#[post("/signup")]
pub async fn signup(
    state: web::Data<AppState>,
    signup_data: web::Json<Credentials>,
) -> Result<impl Responder, AppError> {
    signup_data.validate()?;

    let user_id = state
        .auth
        .signup(signup_data.into_inner())
        .await
        .map_err(|err| AppError::from_auth(err, state.username_taken_status))?;

    Ok(HttpResponse::Created().json(json!({
        "message": "User created successfully",
        "id": user_id
    })))
}

/// Login user
///
/// Responds 200 with a session token. Every client-side failure, including a
/// body that does not parse, is the same 401.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: Result<web::Json<Credentials>, actix_web::Error>,
) -> Result<impl Responder, AppError> {
    let credentials = match login_data {
        Ok(body) => body.into_inner(),
        Err(err) => {
            debug!("login body rejected: {}", err);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
    };
    if let Err(err) = credentials.validate() {
        debug!("login input rejected: {}", err);
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let token = state.auth.login(credentials).await?;
    Ok(HttpResponse::Ok().json(AuthResponse { token }))
}
