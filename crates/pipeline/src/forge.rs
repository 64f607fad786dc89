//! Port traits for the remote forge.
//!
//! Components talk to the forge only through these traits. The `github`
//! crate implements them over the GitHub REST API; the `test-utils` feature
//! provides an in-memory implementation.
//!
//! Every method performs exactly one logical remote operation. List methods
//! return every matching entity in the order the forge returned them;
//! following pagination is the implementation's job.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    ForgeError, Issue, IssueComment, IssueNumber, NewIssue, NewPullRequest, PullRequest,
    PullRequestNumber, RepositoryId, ReviewComment,
};

/// Issue-tracker operations against one repository.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Lists every issue in the repository, in forge order.
    async fn list_issues(&self, repo: &RepositoryId) -> Result<Vec<Issue>, ForgeError>;

    async fn get_issue(
        &self,
        repo: &RepositoryId,
        number: IssueNumber,
    ) -> Result<Issue, ForgeError>;

    async fn create_issue(&self, repo: &RepositoryId, issue: &NewIssue)
        -> Result<Issue, ForgeError>;

    /// Posts a comment on the conversation thread of an issue or pull request.
    async fn create_issue_comment(
        &self,
        repo: &RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> Result<IssueComment, ForgeError>;
}

/// Pull-request operations against one repository.
#[async_trait]
pub trait PullRequestManager: Send + Sync {
    /// Lists pull requests using the forge's default filter (open), in forge order.
    async fn list_pull_requests(
        &self,
        repo: &RepositoryId,
    ) -> Result<Vec<PullRequest>, ForgeError>;

    async fn get_pull_request(
        &self,
        repo: &RepositoryId,
        number: PullRequestNumber,
    ) -> Result<PullRequest, ForgeError>;

    async fn create_pull_request(
        &self,
        repo: &RepositoryId,
        pull_request: &NewPullRequest,
    ) -> Result<PullRequest, ForgeError>;

    /// Lists the review comments (diff comments) of a pull request.
    async fn list_review_comments(
        &self,
        repo: &RepositoryId,
        number: PullRequestNumber,
    ) -> Result<Vec<ReviewComment>, ForgeError>;
}

/// An authenticated forge session: everything a component may call.
pub trait ForgeClient: IssueTracker + PullRequestManager + std::fmt::Debug {}

impl<T> ForgeClient for T where T: IssueTracker + PullRequestManager + std::fmt::Debug {}

/// Shared handle to a session; cloned into ports and the execution context.
pub type ForgeSession = Arc<dyn ForgeClient>;

/// Builds sessions for the Authorize component.
///
/// Building a session never contacts the forge; a bad token is only detected
/// by the first remote call made with it.
pub trait SessionFactory: Send + Sync {
    /// Builds a session authenticated with `token`.
    fn from_token(&self, token: &str) -> Result<ForgeSession, ForgeError>;

    /// Builds a session from the ambient credential (e.g. `GITHUB_TOKEN`).
    /// With no ambient credential the session is unauthenticated.
    fn from_environment(&self) -> Result<ForgeSession, ForgeError>;
}
