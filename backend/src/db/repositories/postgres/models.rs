use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{exercises, users};
use crate::api::{Exercise, RecordId, User};
use crate::db::repository::{ErrorContext, RepositoryError};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: String,
    pub username: Option<String>,
    pub version: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = exercises)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ExerciseRow {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub duration: f64,
    pub exercise_date: DateTime<Utc>,
    pub version: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = exercises)]
pub struct NewExerciseRow {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub duration: f64,
    pub exercise_date: DateTime<Utc>,
}

fn parse_stored_id(raw: &str, entity: &str) -> Result<RecordId, RepositoryError> {
    raw.trim().parse().map_err(|e: crate::api::ParseRecordIdError| {
        RepositoryError::internal_with_context(
            e.to_string(),
            ErrorContext::new("decode_row")
                .with_entity(entity)
                .with_entity_id(raw),
        )
    })
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_stored_id(&row.id, "user")?,
            username: row.username,
            version: row.version,
        })
    }
}

impl TryFrom<ExerciseRow> for Exercise {
    type Error = RepositoryError;

    fn try_from(row: ExerciseRow) -> Result<Self, Self::Error> {
        Ok(Exercise {
            id: parse_stored_id(&row.id, "exercise")?,
            description: row.description,
            duration: row.duration,
            date: row.exercise_date,
            user: parse_stored_id(&row.user_id, "exercise")?,
            version: row.version,
        })
    }
}

impl From<&Exercise> for NewExerciseRow {
    fn from(exercise: &Exercise) -> Self {
        Self {
            id: exercise.id.to_hex(),
            user_id: exercise.user.to_hex(),
            description: exercise.description.clone(),
            duration: exercise.duration,
            exercise_date: exercise.date,
        }
    }
}
