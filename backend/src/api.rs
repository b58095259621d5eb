//! Public API surface for the exercise tracker.
//!
//! Record types shared by the store layer, the service layer and the HTTP
//! shapers. All records derive Serialize/Deserialize in their persisted
//! document shape (`_id`, `__v`).

pub use crate::routes::exercises::{CreateExerciseForm, ExerciseCreated};
pub use crate::routes::logs::{ExerciseLog, LogEntry, LogQuery};
pub use crate::routes::users::CreateUserForm;
pub use crate::routes::FieldError;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length of a record identifier in bytes.
pub const RECORD_ID_LEN: usize = 12;

/// Document identifier: 4-byte timestamp, 5 process-unique bytes and a
/// 3-byte counter, rendered as 24 lowercase hex characters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId([u8; RECORD_ID_LEN]);

/// Error returned when a string is not a well-formed record identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid record id '{0}': expected 24 hexadecimal characters")]
pub struct ParseRecordIdError(pub String);

fn process_unique() -> &'static [u8; 5] {
    static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
    PROCESS_UNIQUE.get_or_init(|| {
        let seed = uuid::Uuid::new_v4();
        let mut bytes = [0u8; 5];
        bytes.copy_from_slice(&seed.as_bytes()[..5]);
        bytes
    })
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    COUNTER
        .get_or_init(|| {
            let seed = uuid::Uuid::new_v4();
            let b = seed.as_bytes();
            AtomicU32::new(u32::from_be_bytes([0, b[0], b[1], b[2]]))
        })
        .fetch_add(1, Ordering::Relaxed)
        & 0x00ff_ffff
}

impl RecordId {
    /// Generate a fresh identifier stamped with the current time.
    pub fn generate() -> Self {
        Self::generate_at(Utc::now())
    }

    /// Generate a fresh identifier stamped with `at`.
    pub fn generate_at(at: DateTime<Utc>) -> Self {
        let secs = u32::try_from(at.timestamp()).unwrap_or(0);
        let counter = next_counter().to_be_bytes();

        let mut bytes = [0u8; RECORD_ID_LEN];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(process_unique());
        bytes[9..].copy_from_slice(&counter[1..]);
        Self(bytes)
    }

    /// Whether `s` is a syntactically valid identifier.
    pub fn is_valid(s: &str) -> bool {
        s.parse::<Self>().is_ok()
    }

    /// Creation time embedded in the identifier (second precision).
    pub fn timestamp(&self) -> DateTime<Utc> {
        let secs = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        DateTime::from_timestamp(i64::from(secs), 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for RecordId {
    type Err = ParseRecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != RECORD_ID_LEN * 2 {
            return Err(ParseRecordIdError(s.to_string()));
        }
        let decoded = hex::decode(s).map_err(|_| ParseRecordIdError(s.to_string()))?;
        let bytes: [u8; RECORD_ID_LEN] = decoded
            .try_into()
            .map_err(|_| ParseRecordIdError(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Serialize a duration as a JSON integer when it has no fractional part.
pub(crate) fn serialize_duration<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Stored user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Display name; stored exactly as provided, absent when not sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "__v", default)]
    pub version: i32,
}

impl User {
    pub fn new(username: Option<String>) -> Self {
        Self {
            id: RecordId::generate(),
            username,
            version: 0,
        }
    }
}

/// Stored exercise record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub description: String,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: f64,
    pub date: DateTime<Utc>,
    /// Owning user; never changes once set.
    pub user: RecordId,
    #[serde(rename = "__v", default)]
    pub version: i32,
}

/// Validated input for an exercise insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExercise {
    pub user: RecordId,
    pub description: String,
    pub duration: f64,
    /// Performed-at date; the insert defaults it to now.
    pub date: Option<DateTime<Utc>>,
}

impl NewExercise {
    /// Materialize the record, filling in the default date.
    pub fn into_record(self, id: RecordId) -> Exercise {
        Exercise {
            id,
            description: self.description,
            duration: self.duration,
            date: self.date.unwrap_or_else(Utc::now),
            user: self.user,
            version: 0,
        }
    }
}

/// Filter applied to a user's exercises. Every bound that is set applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExerciseQuery {
    /// Inclusive lower bound on the exercise date.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the exercise date.
    pub to: Option<DateTime<Utc>>,
    /// Maximum number of entries returned.
    pub limit: Option<usize>,
}

impl ExerciseQuery {
    pub fn matches(&self, date: &DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| *date >= from) && self.to.map_or(true, |to| *date <= to)
    }
}
