//! Core component domain for Forgeflow.
//!
//! This crate contains every domain concept shared by the workspace: newtype
//! identifiers, the entity records returned by the forge, the typed port
//! model, the execution context, the [`Component`] contract and the forge port
//! traits. Infrastructure crates implement the traits defined here; they never
//! add domain rules.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; the `github` crate defines *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RepositoryId`, `IssueNumber`, etc.) |
//! | [`types`] | Entity records (`Issue`, `PullRequest`, comments) and `RawRecord` |
//! | [`ports`] | `PortType`, `PortValue`, `InArg`, `OutArg` |
//! | [`context`] | `ExecutionContext` and the shared client key |
//! | [`component`] | The `Component` trait |
//! | [`forge`] | `IssueTracker`, `PullRequestManager`, `SessionFactory` |
//! | [`errors`] | `ForgeError`, `PipelineError`, `RetryPolicy` |

pub mod component;
pub mod context;
pub mod errors;
pub mod forge;
pub mod identifiers;
pub mod ports;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use component::{Component, ComponentDescriptor};
pub use context::{ExecutionContext, GITHUB_CLIENT_KEY};
pub use errors::{ForgeError, PipelineError, RetryPolicy};
pub use forge::{ForgeClient, ForgeSession, IssueTracker, PullRequestManager, SessionFactory};
pub use identifiers::{
    BranchName, CommentId, ExecutionId, IssueNumber, NodeId, PullRequestNumber, RepositoryId,
};
pub use ports::{InArg, OutArg, PortData, PortSpec, PortType, PortValue};
pub use types::{
    Issue, IssueComment, ItemState, NewIssue, NewPullRequest, PullRequest, RawRecord,
    ReviewComment, Timestamp,
};
