//! Service layer: the request flows over any repository.
//!
//! Each function is one short sequence of store calls. Steps run in order
//! and the first failure short-circuits the rest.

use tracing::{debug, warn};

use super::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::api::{Exercise, ExerciseQuery, NewExercise, RecordId, User};

/// Check that the repository is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Store a new user with the submitted display name.
pub async fn create_user<R: FullRepository + ?Sized>(
    repo: &R,
    username: Option<String>,
) -> RepositoryResult<User> {
    repo.create_user(username)
        .await
        .map_err(|e| e.with_operation("create_user"))
}

/// Every stored user.
pub async fn list_users<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<User>> {
    repo.list_users()
        .await
        .map_err(|e| e.with_operation("list_users"))
}

/// Fetch a user, turning an absent record into `NotFound`.
pub async fn get_user<R: FullRepository + ?Sized>(repo: &R, id: RecordId) -> RepositoryResult<User> {
    repo.find_user(id)
        .await
        .map_err(|e| e.with_operation("find_user"))?
        .ok_or_else(|| user_not_found(id, "find_user"))
}

/// Store an exercise, then look up its owner for the response.
///
/// The user is not checked before the insert. If the owner is missing
/// afterwards the exercise stays stored and `NotFound` is returned.
pub async fn add_exercise<R: FullRepository + ?Sized>(
    repo: &R,
    exercise: NewExercise,
) -> RepositoryResult<(User, Exercise)> {
    let exercise = repo
        .create_exercise(exercise)
        .await
        .map_err(|e| e.with_operation("create_exercise"))?;

    let user = match repo
        .find_user(exercise.user)
        .await
        .map_err(|e| e.with_operation("find_user"))?
    {
        Some(user) => user,
        None => {
            warn!(
                exercise_id = %exercise.id,
                user_id = %exercise.user,
                "exercise stored for a user that does not exist"
            );
            return Err(user_not_found(exercise.user, "add_exercise"));
        }
    };

    debug!(exercise_id = %exercise.id, user_id = %user.id, "exercise added");
    Ok((user, exercise))
}

/// A user's exercises matching `query`, in insertion order.
pub async fn exercise_log<R: FullRepository + ?Sized>(
    repo: &R,
    user: &User,
    query: &ExerciseQuery,
) -> RepositoryResult<Vec<Exercise>> {
    repo.query_exercises(user.id, query)
        .await
        .map_err(|e| e.with_operation("query_exercises").with_entity("user", user.id))
}

fn user_not_found(id: RecordId, operation: &str) -> RepositoryError {
    RepositoryError::not_found_with_context(
        "User not found",
        ErrorContext::new(operation)
            .with_entity("user")
            .with_entity_id(id),
    )
}
