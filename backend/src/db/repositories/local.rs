//! In-memory repository.
//!
//! Keeps users and exercises in insertion-ordered vectors behind a single
//! `RwLock`. Nothing is persisted; state lives as long as the repository.

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::api::{Exercise, ExerciseQuery, NewExercise, RecordId, User};
use crate::db::repository::{
    ExerciseRepository, FullRepository, RepositoryResult, UserRepository,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    exercises: Vec<Exercise>,
}

/// In-memory store used by tests and local development.
#[derive(Debug, Default)]
pub struct LocalRepository {
    tables: RwLock<Tables>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.tables.read().users.len()
    }

    pub fn exercise_count(&self) -> usize {
        self.tables.read().exercises.len()
    }
}

#[async_trait]
impl UserRepository for LocalRepository {
    async fn create_user(&self, username: Option<String>) -> RepositoryResult<User> {
        let user = User::new(username);
        self.tables.write().users.push(user.clone());
        debug!(user_id = %user.id, "stored user");
        Ok(user)
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.tables.read().users.clone())
    }

    async fn find_user(&self, id: RecordId) -> RepositoryResult<Option<User>> {
        Ok(self.tables.read().users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl ExerciseRepository for LocalRepository {
    async fn create_exercise(&self, exercise: NewExercise) -> RepositoryResult<Exercise> {
        let record = exercise.into_record(RecordId::generate());
        self.tables.write().exercises.push(record.clone());
        debug!(exercise_id = %record.id, user_id = %record.user, "stored exercise");
        Ok(record)
    }

    async fn query_exercises(
        &self,
        user: RecordId,
        query: &ExerciseQuery,
    ) -> RepositoryResult<Vec<Exercise>> {
        let tables = self.tables.read();
        let matching = tables
            .exercises
            .iter()
            .filter(|e| e.user == user && query.matches(&e.date))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(matching)
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
