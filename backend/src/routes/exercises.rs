use serde::{Deserialize, Serialize};

use super::{non_empty, FieldError};
use crate::api::{serialize_duration, Exercise, NewExercise, RecordId, User};
use crate::models::{format_date_string, parse_exercise_date};

pub const ADD_EXERCISE: &str = "add_exercise";

/// Form body of `POST /api/users/{_id}/exercises`, as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateExerciseForm {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl CreateExerciseForm {
    /// Validate the submitted fields for an insert owned by `user`.
    ///
    /// `description` and `duration` are required; an empty `date` is the
    /// same as no date.
    pub fn into_new_exercise(self, user: RecordId) -> Result<NewExercise, FieldError> {
        let description = non_empty(self.description).ok_or(FieldError::Missing("description"))?;

        let duration = non_empty(self.duration).ok_or(FieldError::Missing("duration"))?;
        let duration = duration
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
            .ok_or(FieldError::NotANumber("duration"))?;

        let date = match non_empty(self.date) {
            Some(raw) => Some(parse_exercise_date(&raw).ok_or(FieldError::InvalidDate("date"))?),
            None => None,
        };

        Ok(NewExercise {
            user,
            description,
            duration,
            date,
        })
    }
}

/// Response of a successful exercise creation: the owner's fields merged
/// with the new exercise, without the store's version field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseCreated {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub description: String,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: f64,
    pub date: String,
}

impl ExerciseCreated {
    pub fn new(user: &User, exercise: &Exercise) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            description: exercise.description.clone(),
            duration: exercise.duration,
            date: format_date_string(&exercise.date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn form(description: Option<&str>, duration: Option<&str>, date: Option<&str>) -> CreateExerciseForm {
        CreateExerciseForm {
            description: description.map(str::to_string),
            duration: duration.map(str::to_string),
            date: date.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_form() {
        let user = RecordId::generate();
        let new = form(Some("run"), Some("30"), Some("2023-01-15"))
            .into_new_exercise(user)
            .unwrap();
        assert_eq!(new.user, user);
        assert_eq!(new.description, "run");
        assert_eq!(new.duration, 30.0);
        assert_eq!(format_date_string(&new.date.unwrap()), "Sun Jan 15 2023");
    }

    #[test]
    fn test_empty_date_means_no_date() {
        let new = form(Some("run"), Some("12.5"), Some(""))
            .into_new_exercise(RecordId::generate())
            .unwrap();
        assert_eq!(new.date, None);
        assert_eq!(new.duration, 12.5);
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let user = RecordId::generate();
        assert_eq!(
            form(None, Some("30"), None).into_new_exercise(user),
            Err(FieldError::Missing("description"))
        );
        assert_eq!(
            form(Some("run"), None, None).into_new_exercise(user),
            Err(FieldError::Missing("duration"))
        );
        assert_eq!(
            form(Some(""), Some("30"), None).into_new_exercise(user),
            Err(FieldError::Missing("description"))
        );
    }

    #[test]
    fn test_bad_values_are_rejected() {
        let user = RecordId::generate();
        assert_eq!(
            form(Some("run"), Some("thirty"), None).into_new_exercise(user),
            Err(FieldError::NotANumber("duration"))
        );
        assert_eq!(
            form(Some("run"), Some("inf"), None).into_new_exercise(user),
            Err(FieldError::NotANumber("duration"))
        );
        assert_eq!(
            form(Some("run"), Some("30"), Some("someday")).into_new_exercise(user),
            Err(FieldError::InvalidDate("date"))
        );
    }

    #[test]
    fn test_response_shape_omits_version() {
        let user = User::new(Some("fcc_test".to_string()));
        let exercise = NewExercise {
            user: user.id,
            description: "run".to_string(),
            duration: 30.0,
            date: parse_exercise_date("2023-01-15"),
        }
        .into_record(RecordId::generate());

        let value = serde_json::to_value(ExerciseCreated::new(&user, &exercise)).unwrap();
        assert_eq!(value["_id"], user.id.to_hex());
        assert_eq!(value["username"], "fcc_test");
        assert_eq!(value["description"], "run");
        assert_eq!(value["duration"], 30);
        assert_eq!(value["date"], "Sun Jan 15 2023");
        assert!(value.get("__v").is_none());
        assert!(exercise.date <= Utc::now());
    }
}
