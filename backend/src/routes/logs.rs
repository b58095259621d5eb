use serde::{Deserialize, Serialize};

use super::FieldError;
use crate::api::{serialize_duration, Exercise, ExerciseQuery, RecordId, User};
use crate::models::{format_date_string, parse_date_bound};

pub const GET_LOGS: &str = "get_logs";

/// Query string of `GET /api/users/{_id}/logs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

impl LogQuery {
    /// Convert the raw parameters into a store filter.
    ///
    /// Empty `from`/`to` are ignored. A malformed bound is an error; a
    /// malformed `limit` only disables the cap.
    pub fn to_filter(&self) -> Result<ExerciseQuery, FieldError> {
        Ok(ExerciseQuery {
            from: parse_bound(self.from.as_deref(), "from")?,
            to: parse_bound(self.to.as_deref(), "to")?,
            limit: parse_limit(self.limit.as_deref()),
        })
    }
}

fn parse_bound(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, FieldError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => parse_date_bound(value)
            .map(Some)
            .ok_or(FieldError::InvalidDate(field)),
        None => Ok(None),
    }
}

/// Parse `limit`. The whole trimmed value must be a number; fractions
/// truncate toward zero. Non-numeric, zero or negative means no limit.
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    let value = raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    let value = value.trunc();
    // `as` saturates, so a huge cap is no cap.
    (value >= 1.0).then(|| value as usize)
}

/// One exercise as shown in a log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub description: String,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: f64,
    pub date: String,
}

impl From<&Exercise> for LogEntry {
    fn from(exercise: &Exercise) -> Self {
        Self {
            description: exercise.description.clone(),
            duration: exercise.duration,
            date: format_date_string(&exercise.date),
        }
    }
}

/// Response of the log endpoint. `count` is always `log.len()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseLog {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub log: Vec<LogEntry>,
    pub count: usize,
}

impl ExerciseLog {
    pub fn new(user: &User, exercises: &[Exercise]) -> Self {
        let log: Vec<LogEntry> = exercises.iter().map(LogEntry::from).collect();
        Self {
            id: user.id,
            username: user.username.clone(),
            count: log.len(),
            log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::NewExercise;
    use crate::models::parse_exercise_date;
    use chrono::{TimeZone, Utc};

    fn query(from: Option<&str>, to: Option<&str>, limit: Option<&str>) -> LogQuery {
        LogQuery {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(Some("1")), Some(1));
        assert_eq!(parse_limit(Some(" 10 ")), Some(10));
        assert_eq!(parse_limit(Some("+3")), Some(3));
        assert_eq!(parse_limit(Some("2.9")), Some(2));
        assert_eq!(parse_limit(Some("5abc")), None);
        assert_eq!(parse_limit(Some("1abc")), None);
        assert_eq!(parse_limit(Some("0.5")), None);
        assert_eq!(parse_limit(Some("inf")), None);
        assert_eq!(parse_limit(Some("0")), None);
        assert_eq!(parse_limit(Some("-5")), None);
        assert_eq!(parse_limit(Some("abc")), None);
        assert_eq!(parse_limit(Some("")), None);
        assert_eq!(parse_limit(None), None);
    }

    #[test]
    fn test_filter_bounds() {
        let filter = query(Some("2023-01-01"), Some("2023-01-31"), Some("2"))
            .to_filter()
            .unwrap();
        assert_eq!(filter.from, Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(filter.to, Some(Utc.with_ymd_and_hms(2023, 1, 31, 0, 0, 0).unwrap()));
        assert_eq!(filter.limit, Some(2));

        let empty = query(Some(""), None, None).to_filter().unwrap();
        assert_eq!(empty, ExerciseQuery::default());
    }

    #[test]
    fn test_invalid_bounds() {
        assert_eq!(
            query(Some("yesterday"), None, None).to_filter(),
            Err(FieldError::InvalidDate("from"))
        );
        assert_eq!(
            query(None, Some("2023-13-01"), None).to_filter(),
            Err(FieldError::InvalidDate("to"))
        );
    }

    #[test]
    fn test_log_shape() {
        let user = User::new(Some("fcc_test".to_string()));
        let exercises: Vec<Exercise> = ["2023-01-15", "2023-02-01"]
            .iter()
            .map(|d| {
                NewExercise {
                    user: user.id,
                    description: "run".to_string(),
                    duration: 30.0,
                    date: parse_exercise_date(d),
                }
                .into_record(RecordId::generate())
            })
            .collect();

        let value = serde_json::to_value(ExerciseLog::new(&user, &exercises)).unwrap();
        assert_eq!(value["_id"], user.id.to_hex());
        assert_eq!(value["username"], "fcc_test");
        assert_eq!(value["count"], 2);
        assert_eq!(value["log"][0]["date"], "Sun Jan 15 2023");
        assert_eq!(value["log"][0]["duration"], 30);
        assert_eq!(value["log"][1]["description"], "run");
        assert!(value["log"][0].get("_id").is_none());
    }

    #[test]
    fn test_log_key_order() {
        let user = User::new(Some("fcc_test".to_string()));
        let json = serde_json::to_string(&ExerciseLog::new(&user, &[])).unwrap();
        let log_at = json.find("\"log\"").unwrap();
        let count_at = json.find("\"count\"").unwrap();
        assert!(json.starts_with("{\"_id\""));
        assert!(log_at < count_at);
        assert!(json.ends_with("\"count\":0}"));
    }
}
