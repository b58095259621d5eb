//! HTTP handlers for the REST API.
//!
//! Each handler validates its input, runs one service-layer flow and
//! shapes the result. Store failures are mapped to the endpoint's fixed
//! error message.

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Path, Query, State,
    },
    response::Html,
    Form, Json,
};
use tracing::debug;

use super::dto::HealthResponse;
use super::error::{AppError, INVALID_USER_ID};
use super::state::AppState;
use crate::api::{RecordId, User};
use crate::db::services as db_services;
use crate::routes::exercises::{CreateExerciseForm, ExerciseCreated, ADD_EXERCISE};
use crate::routes::logs::{ExerciseLog, LogQuery, GET_LOGS};
use crate::routes::users::{CreateUserForm, CREATE_USER, LIST_USERS};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const LANDING_PAGE: &str = include_str!("../../views/index.html");

/// Bodies that are not urlencoded forms are read as empty forms.
fn form_or_default<T: Default>(form: Result<Form<T>, FormRejection>) -> T {
    match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!(%rejection, "unreadable form body, treating as empty");
            T::default()
        }
    }
}

/// Query strings that cannot be decoded are read as no parameters.
fn query_or_default<T: Default>(query: Result<Query<T>, QueryRejection>) -> T {
    match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            debug!(%rejection, "unreadable query string, ignoring parameters");
            T::default()
        }
    }
}

fn parse_user_id(raw: &str) -> Result<RecordId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(INVALID_USER_ID.to_string()))
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

/// GET /health
///
/// Reports whether the repository answers; always 200.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
        pool: state.repository.pool_stats(),
    })
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> HandlerResult<Vec<User>> {
    let users = db_services::list_users(state.repository.as_ref())
        .await
        .map_err(AppError::store(LIST_USERS, "Internal Server Error"))?;
    Ok(Json(users))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    form: Result<Form<CreateUserForm>, FormRejection>,
) -> HandlerResult<User> {
    let form = form_or_default(form);
    let user = db_services::create_user(state.repository.as_ref(), form.username)
        .await
        .map_err(AppError::store(CREATE_USER, "Failed to add user"))?;
    Ok(Json(user))
}

/// POST /api/users/{_id}/exercises
///
/// The exercise is stored before its owner is looked up; a well-formed
/// id with no user behind it answers 404 after the insert.
pub async fn add_exercise(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    form: Result<Form<CreateExerciseForm>, FormRejection>,
) -> HandlerResult<ExerciseCreated> {
    let user_id = parse_user_id(&user_id)?;
    let exercise = form_or_default(form).into_new_exercise(user_id)?;

    let (user, exercise) = db_services::add_exercise(state.repository.as_ref(), exercise)
        .await
        .map_err(AppError::store(ADD_EXERCISE, "Failed to add exercise"))?;
    Ok(Json(ExerciseCreated::new(&user, &exercise)))
}

/// GET /api/users/{_id}/logs
pub async fn get_logs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    query: Result<Query<LogQuery>, QueryRejection>,
) -> HandlerResult<ExerciseLog> {
    let user_id = parse_user_id(&user_id)?;
    let query = query_or_default(query);
    let repo = state.repository.as_ref();

    let user = db_services::get_user(repo, user_id)
        .await
        .map_err(AppError::store(GET_LOGS, "Failed to fetch user logs"))?;
    let filter = query.to_filter()?;

    let exercises = db_services::exercise_log(repo, &user, &filter)
        .await
        .map_err(AppError::store(GET_LOGS, "Failed to fetch user logs"))?;
    Ok(Json(ExerciseLog::new(&user, &exercises)))
}
