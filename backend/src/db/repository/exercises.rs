//! Exercise repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{Exercise, ExerciseQuery, NewExercise, RecordId};

/// Repository trait for exercise records.
///
/// The owning user id is stored as given; implementations do not check that
/// the user exists.
#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    /// Insert a new exercise, defaulting its date to now when absent.
    ///
    /// # Returns
    /// * `Ok(Exercise)` - The stored record
    /// * `Err(RepositoryError)` - If the insert fails
    async fn create_exercise(&self, exercise: NewExercise) -> RepositoryResult<Exercise>;

    /// Fetch a user's exercises in insertion order.
    ///
    /// # Arguments
    /// * `user` - Owning user id
    /// * `query` - Inclusive date bounds and result cap; all set bounds apply
    ///
    /// # Returns
    /// * `Ok(Vec<Exercise>)` - Matching exercises, at most `query.limit`
    /// * `Err(RepositoryError)` - If the query fails
    async fn query_exercises(
        &self,
        user: RecordId,
        query: &ExerciseQuery,
    ) -> RepositoryResult<Vec<Exercise>>;
}
