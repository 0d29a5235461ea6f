use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::TaskInput,
    state::AppState,
    store::with_deadline,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Lists the authenticated user's tasks, newest first.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects owned by the caller.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = with_deadline(state.store_timeout, state.tasks.list(user.id())).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the authenticated user.
///
/// Any owner field in the body is ignored.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: undecodable body or failed validation.
/// - `401 Unauthorized`: missing or invalid token.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = with_deadline(
        state.store_timeout,
        state.tasks.create(user.id(), task_data.into_inner()),
    )
    .await?;

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one of the caller's tasks.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = with_deadline(
        state.store_timeout,
        state.tasks.get(user.id(), task_id.into_inner()),
    )
    .await?;

    task.map(|task| HttpResponse::Ok().json(task))
        .ok_or_else(not_found)
}

/// Replaces the editable fields of one of the caller's tasks.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: undecodable body or failed validation.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<i64>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let updated = with_deadline(
        state.store_timeout,
        state
            .tasks
            .update(user.id(), task_id.into_inner(), task_data.into_inner()),
    )
    .await?;

    updated
        .map(|task| HttpResponse::Ok().json(task))
        .ok_or_else(not_found)
}

/// Deletes one of the caller's tasks.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let deleted = with_deadline(
        state.store_timeout,
        state.tasks.delete(user.id(), task_id.into_inner()),
    )
    .await?;

    if !deleted {
        return Err(not_found());
    }
    Ok(HttpResponse::NoContent().finish())
}
