//! Core data types for the task tracker.

use chrono::{DateTime, Duration, Local, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single tracked task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Positive identifier, unique within the store
    pub id: u64,

    /// What needs doing
    pub description: String,

    /// Current state
    pub status: Status,

    /// When created (null only in records written by older tools)
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,

    /// Last mutation; null until the task is first changed
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Task status states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Todo,
    InProgress,
    Done,
}

impl Status {
    /// Every status, in workflow order.
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    /// Check if a status transition is valid.
    ///
    /// The workflow is unconstrained: any state may move to any other,
    /// including itself.
    pub fn can_transition_to(&self, target: &Status) -> bool {
        use Status::*;
        match (self, target) {
            (Todo, InProgress) | (InProgress, Todo) => true,
            (InProgress, Done) | (Done, InProgress) => true,
            (Todo, Done) | (Done, Todo) => true,
            (a, b) => a == b,
        }
    }

    /// The wire name, as stored in the JSON file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "TODO",
            Status::InProgress => "IN_PROGRESS",
            Status::Done => "DONE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    /// Case-insensitive; accepts `-` in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

/// Validation errors for caller input and loaded records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyDescription,
    InvalidId(String),
    UnknownStatus(String),
    DuplicateId(u64),
    InvalidTimestamp(u64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyDescription => write!(f, "description cannot be empty"),
            ValidationError::InvalidId(token) => {
                write!(f, "invalid task id '{}': must be a positive integer", token)
            }
            ValidationError::UnknownStatus(token) => {
                write!(f, "unknown status '{}': expected one of todo, in_progress, done", token)
            }
            ValidationError::DuplicateId(id) => write!(f, "task id {} appears more than once", id),
            ValidationError::InvalidTimestamp(id) => {
                write!(f, "task {}: updatedAt cannot be before createdAt", id)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Parse a user-supplied task id token.
pub fn parse_id(token: &str) -> Result<u64, ValidationError> {
    match token.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidId(token.to_string())),
    }
}

/// Check a description supplied for create/update.
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(())
}

/// Current time truncated to whole seconds.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

impl Task {
    /// Build a fresh TODO task created at `created_at`.
    pub fn new(id: u64, description: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            description: description.into(),
            status: Status::Todo,
            created_at: Some(created_at),
            updated_at: None,
        }
    }

    /// Record a mutation at `at`, never earlier than creation.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        let at = match self.created_at {
            Some(created) if at < created => created,
            _ => at,
        };
        self.updated_at = Some(at);
    }

    /// Validate the record-level invariants of a stored task.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id == 0 {
            return Err(ValidationError::InvalidId(self.id.to_string()));
        }
        validate_description(&self.description)?;
        if let (Some(created), Some(updated)) = (self.created_at, self.updated_at)
            && updated < created
        {
            return Err(ValidationError::InvalidTimestamp(self.id));
        }
        Ok(())
    }
}

/// Serde adapter for optional timestamps.
///
/// Writes RFC 3339 UTC with whole seconds, or `null`. Reads RFC 3339 with any
/// offset, and also offset-less `YYYY-MM-DDTHH:MM:SS[.fff]` taken as local
/// wall-clock time, which is what older versions of the tool wrote.
pub(crate) mod timestamp {
    use super::*;
    use serde::{Deserializer, Serializer, de::Error};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| parse(&s).map_err(D::Error::custom)).transpose()
    }

    pub fn parse(s: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc).trunc_subsecs(0));
        }
        NaiveDateTime::parse_from_str(s, NAIVE_FORMAT)
            .map(|naive| local_to_utc(naive.trunc_subsecs(0)))
            .map_err(|e| format!("invalid timestamp '{}': {}", s, e))
    }

    /// Resolve a local wall-clock time to an instant.
    ///
    /// Ambiguous times (DST fall-back) take the earlier instant. Times inside
    /// a DST gap never existed locally; they are moved forward by an hour.
    pub fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
        Local
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| Local.from_local_datetime(&(naive + Duration::hours(1))).earliest())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc())
    }
}
