//! Entity records returned by the forge.
//!
//! The GitHub API returns large JSON objects. Components either expose the
//! whole object (a [`RawRecord`], the "field mapping" output) or project a
//! single field out of it (the title of each issue in a list). Each entity
//! type here keeps the raw record alongside the handful of fields this
//! workspace reads, so projection is always an explicit field access.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{BranchName, CommentId, ForgeError, IssueNumber, PullRequestNumber};

// ---------------------------------------------------------------------------
// Raw field mapping
// ---------------------------------------------------------------------------

/// The full JSON object returned by the remote API for one entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
    /// Converts a JSON value, failing if it is not an object.
    pub fn from_value(value: Value) -> Result<Self, ForgeError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(ForgeError::Decode {
                message: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    /// Returns the value of a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the value of a top-level string field.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Returns the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn decode<T: DeserializeOwned>(&self, entity: &str) -> Result<T, ForgeError> {
        serde_json::from_value(Value::Object(self.0.clone())).map_err(|e| ForgeError::Decode {
            message: format!("malformed {entity} record: {e}"),
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Shared fields
// ---------------------------------------------------------------------------

/// Open/closed state shared by issues and pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Open,
    Closed,
}

#[derive(Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    name: String,
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// A GitHub issue.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub number: IssueNumber,
    pub title: String,
    pub body: Option<String>,
    pub state: ItemState,
    pub created_at: Option<Timestamp>,
    /// Every field the API returned, including those not lifted above.
    pub raw: RawRecord,
}

#[derive(Deserialize)]
struct IssueFields {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    state: ItemState,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Lifts the typed fields out of a raw issue record.
    pub fn from_raw(raw: RawRecord) -> Result<Self, ForgeError> {
        let fields: IssueFields = raw.decode("issue")?;
        Ok(Self {
            number: IssueNumber::new(fields.number),
            title: fields.title,
            body: fields.body,
            state: fields.state,
            created_at: fields.created_at.map(Timestamp::from_utc),
            raw,
        })
    }
}

/// Fields supplied when opening a new issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

/// A GitHub pull request.
#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
    pub number: PullRequestNumber,
    pub title: String,
    pub body: Option<String>,
    /// Source branch.
    pub head: BranchName,
    /// Target branch.
    pub base: BranchName,
    pub state: ItemState,
    pub raw: RawRecord,
}

#[derive(Deserialize)]
struct PullRequestFields {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    head: BranchRef,
    base: BranchRef,
    state: ItemState,
}

impl PullRequest {
    /// Lifts the typed fields out of a raw pull-request record.
    pub fn from_raw(raw: RawRecord) -> Result<Self, ForgeError> {
        let fields: PullRequestFields = raw.decode("pull request")?;
        let branch = |name: String, side: &str| {
            BranchName::new(name).ok_or_else(|| ForgeError::Decode {
                message: format!("pull request {} has an empty {side} ref", fields.number),
            })
        };
        Ok(Self {
            number: PullRequestNumber::new(fields.number),
            title: fields.title,
            body: fields.body,
            head: branch(fields.head.name, "head")?,
            base: branch(fields.base.name, "base")?,
            state: fields.state,
            raw,
        })
    }
}

/// Fields supplied when opening a new pull request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: BranchName,
    pub base: BranchName,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// A comment left on a pull request's diff during review.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewComment {
    pub id: CommentId,
    pub body: String,
    pub raw: RawRecord,
}

/// A comment on an issue or pull-request conversation thread.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueComment {
    pub id: CommentId,
    pub body: String,
    pub raw: RawRecord,
}

#[derive(Deserialize)]
struct CommentFields {
    id: u64,
    #[serde(default)]
    body: String,
}

impl ReviewComment {
    /// Lifts the typed fields out of a raw review-comment record.
    pub fn from_raw(raw: RawRecord) -> Result<Self, ForgeError> {
        let fields: CommentFields = raw.decode("review comment")?;
        Ok(Self { id: CommentId::new(fields.id), body: fields.body, raw })
    }
}

impl IssueComment {
    /// Lifts the typed fields out of a raw issue-comment record.
    pub fn from_raw(raw: RawRecord) -> Result<Self, ForgeError> {
        let fields: CommentFields = raw.decode("issue comment")?;
        Ok(Self { id: CommentId::new(fields.id), body: fields.body, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        RawRecord::from_value(value).unwrap()
    }

    #[test]
    fn issue_keeps_unlifted_fields_in_raw() {
        let issue = Issue::from_raw(record(json!({
            "number": 12,
            "title": "Crash on start",
            "body": null,
            "state": "open",
            "created_at": "2024-03-01T10:00:00Z",
            "labels": [{"name": "bug"}]
        })))
        .unwrap();

        assert_eq!(issue.number, IssueNumber::new(12));
        assert_eq!(issue.title, "Crash on start");
        assert_eq!(issue.body, None);
        assert_eq!(issue.state, ItemState::Open);
        assert_eq!(issue.created_at.unwrap().to_string(), "2024-03-01T10:00:00+00:00");
        assert_eq!(issue.raw.get("labels").unwrap()[0]["name"], "bug");
    }

    #[test]
    fn issue_without_title_is_a_decode_error() {
        let err = Issue::from_raw(record(json!({"number": 1, "state": "open"}))).unwrap_err();
        assert!(matches!(err, ForgeError::Decode { .. }));
    }

    #[test]
    fn pull_request_reads_branch_refs() {
        let pr = PullRequest::from_raw(record(json!({
            "number": 3,
            "title": "Add login",
            "body": "Implements login",
            "state": "closed",
            "head": {"ref": "feature/login", "sha": "abc"},
            "base": {"ref": "main", "sha": "def"}
        })))
        .unwrap();

        assert_eq!(pr.head.as_str(), "feature/login");
        assert_eq!(pr.base.as_str(), "main");
        assert_eq!(pr.state, ItemState::Closed);
    }

    #[test]
    fn comment_body_defaults_to_empty() {
        let comment = IssueComment::from_raw(record(json!({"id": 99}))).unwrap();
        assert_eq!(comment.id, CommentId::new(99));
        assert_eq!(comment.body, "");
    }

    #[test]
    fn non_object_json_is_rejected() {
        let err = RawRecord::from_value(json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "Could not decode forge response: expected a JSON object, found an array");
    }
}
