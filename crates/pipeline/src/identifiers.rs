//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging
//! an [`IssueNumber`] with a [`PullRequestNumber`] even though both are `u64` under
//! the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (GitHub-assigned integers).
// Generates: struct (Copy), new(), from_port_integer(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Converts a signed port integer, returning `None` if it is negative.
            pub fn from_port_integer(value: i64) -> Option<Self> {
                u64::try_from(value).ok().map(Self)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: GitHub-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// Identifies a GitHub Issue within its repository.
    ///
    /// Wraps the issue number assigned by GitHub (positive integer).
    IssueNumber
}

u64_id! {
    /// Identifies a GitHub Pull Request within its repository.
    ///
    /// Pull requests share the issue number space; the same integer addresses
    /// the pull request's conversation thread on the issues endpoints.
    PullRequestNumber
}

u64_id! {
    /// Identifies a single comment (review or conversation) by its global id.
    CommentId
}

impl From<PullRequestNumber> for IssueNumber {
    fn from(value: PullRequestNumber) -> Self {
        Self(value.as_u64())
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single workflow execution (one run of a component sequence).
///
/// Generated fresh for every [`crate::ExecutionContext`]; recorded on spans so
/// all activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(Uuid);

impl ExecutionId {
    /// Generates a new random execution identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (configuration / Git names)
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a component instance within a workflow graph.
    NodeId
}

string_id! {
    /// A Git branch name (e.g. `"main"`, `"feature/login"`).
    BranchName
}

string_id! {
    /// Identifies a GitHub repository in `"owner/repo"` format.
    ///
    /// Only emptiness is checked locally. A malformed name is passed through
    /// and rejected by the remote API.
    RepositoryId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_ids_reject_empty_values() {
        assert!(RepositoryId::new("").is_none());
        assert!(BranchName::new(String::new()).is_none());
        assert_eq!(RepositoryId::new("octo/hello").unwrap().as_str(), "octo/hello");
    }

    #[test]
    fn repository_id_is_not_parsed_locally() {
        let repo = RepositoryId::new("not-a-slash-name").unwrap();
        assert_eq!(repo.to_string(), "not-a-slash-name");
    }

    #[test]
    fn port_integers_must_be_non_negative() {
        assert_eq!(IssueNumber::from_port_integer(7), Some(IssueNumber::new(7)));
        assert_eq!(IssueNumber::from_port_integer(0), Some(IssueNumber::new(0)));
        assert!(PullRequestNumber::from_port_integer(-1).is_none());
    }

    #[test]
    fn pull_request_number_addresses_the_issue_thread() {
        let issue: IssueNumber = PullRequestNumber::new(42).into();
        assert_eq!(issue.as_u64(), 42);
    }

    #[test]
    fn execution_ids_are_unique() {
        assert_ne!(ExecutionId::new_random(), ExecutionId::new_random());
    }
}
