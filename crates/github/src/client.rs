//! GitHub client implementing the pipeline's forge traits on top of `octocrab`.
//!
//! Records are fetched as raw JSON rather than `octocrab`'s typed models so
//! the field-mapping outputs carry every field GitHub returned.

use std::collections::HashSet;

use async_trait::async_trait;
use octocrab::{Octocrab, Page};
use pipeline::{
    ForgeError, Issue, IssueComment, IssueNumber, IssueTracker, NewIssue, NewPullRequest,
    PullRequest, PullRequestManager, PullRequestNumber, RawRecord, RepositoryId, ReviewComment,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::config::GithubConfig;
use crate::error;

/// An authenticated (or anonymous) session against one GitHub API host.
///
/// Construction never contacts GitHub; an invalid token surfaces as
/// [`ForgeError::Unauthorized`] on the first call. Building the underlying
/// `octocrab` client requires a running Tokio runtime.
#[derive(Clone)]
pub struct GithubClient {
    octocrab: Octocrab,
    api_url: String,
    authenticated: bool,
    per_page: u8,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_url", &self.api_url)
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    /// Builds a client for `config`, authenticating with `token` when present.
    pub fn new(config: &GithubConfig, token: Option<String>) -> Result<Self, ForgeError> {
        let mut builder = Octocrab::builder()
            .base_uri(config.api_url())
            .map_err(error::from_octocrab)?
            .set_connect_timeout(Some(config.timeout))
            .set_read_timeout(Some(config.timeout));
        let authenticated = token.is_some();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        let octocrab = builder.build().map_err(error::from_octocrab)?;

        Ok(Self {
            octocrab,
            api_url: config.api_url().to_owned(),
            authenticated,
            per_page: config.per_page,
        })
    }

    /// Whether requests carry an `Authorization` header.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    async fn get_record(&self, route: &str) -> Result<RawRecord, ForgeError> {
        debug!(route, "GET");
        let value: Value = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(error::from_octocrab)?;
        RawRecord::from_value(value)
    }

    async fn post_record<B: Serialize + ?Sized + Sync>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<RawRecord, ForgeError> {
        debug!(route, "POST");
        let value: Value = self
            .octocrab
            .post(route, Some(body))
            .await
            .map_err(error::from_octocrab)?;
        RawRecord::from_value(value)
    }

    /// Fetches every page of a list endpoint in GitHub's order.
    ///
    /// `octocrab` resolves the `next` links; a link that was already followed
    /// is reported as a decode error instead of being fetched again.
    async fn list_records(&self, route: &str) -> Result<Vec<RawRecord>, ForgeError> {
        debug!(route, "GET all pages");
        let params = [("per_page", self.per_page)];
        let mut page: Page<Value> = self
            .octocrab
            .get(route, Some(&params))
            .await
            .map_err(error::from_octocrab)?;
        let mut records = Vec::new();
        let mut followed = HashSet::new();
        let mut pages = 1usize;

        loop {
            let next = page.next.take();
            for item in std::mem::take(&mut page.items) {
                records.push(RawRecord::from_value(item)?);
            }
            let Some(uri) = next else { break };
            if !followed.insert(uri.to_string()) {
                return Err(ForgeError::Decode {
                    message: format!("pagination of {route} loops back to {uri}"),
                });
            }
            match self
                .octocrab
                .get_page::<Value>(&Some(uri))
                .await
                .map_err(error::from_octocrab)?
            {
                Some(next_page) => page = next_page,
                None => break,
            }
            pages += 1;
        }

        debug!(pages, count = records.len(), "Fetched all pages");
        Ok(records)
    }
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

#[async_trait]
impl IssueTracker for GithubClient {
    #[instrument(skip(self), fields(repo = %repo))]
    async fn list_issues(&self, repo: &RepositoryId) -> Result<Vec<Issue>, ForgeError> {
        let records = self.list_records(&format!("/repos/{repo}/issues")).await?;
        records.into_iter().map(Issue::from_raw).collect()
    }

    #[instrument(skip(self), fields(repo = %repo, number = %number))]
    async fn get_issue(
        &self,
        repo: &RepositoryId,
        number: IssueNumber,
    ) -> Result<Issue, ForgeError> {
        let record = self.get_record(&format!("/repos/{repo}/issues/{number}")).await?;
        Issue::from_raw(record)
    }

    #[instrument(skip(self, issue), fields(repo = %repo))]
    async fn create_issue(
        &self,
        repo: &RepositoryId,
        issue: &NewIssue,
    ) -> Result<Issue, ForgeError> {
        let record = self.post_record(&format!("/repos/{repo}/issues"), issue).await?;
        let created = Issue::from_raw(record)?;
        info!(number = %created.number, "Created issue");
        Ok(created)
    }

    #[instrument(skip(self, body), fields(repo = %repo, number = %number))]
    async fn create_issue_comment(
        &self,
        repo: &RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> Result<IssueComment, ForgeError> {
        let record = self
            .post_record(&format!("/repos/{repo}/issues/{number}/comments"), &CommentBody { body })
            .await?;
        let comment = IssueComment::from_raw(record)?;
        info!(comment_id = %comment.id, "Created issue comment");
        Ok(comment)
    }
}

#[async_trait]
impl PullRequestManager for GithubClient {
    #[instrument(skip(self), fields(repo = %repo))]
    async fn list_pull_requests(
        &self,
        repo: &RepositoryId,
    ) -> Result<Vec<PullRequest>, ForgeError> {
        let records = self.list_records(&format!("/repos/{repo}/pulls")).await?;
        records.into_iter().map(PullRequest::from_raw).collect()
    }

    #[instrument(skip(self), fields(repo = %repo, number = %number))]
    async fn get_pull_request(
        &self,
        repo: &RepositoryId,
        number: PullRequestNumber,
    ) -> Result<PullRequest, ForgeError> {
        let record = self.get_record(&format!("/repos/{repo}/pulls/{number}")).await?;
        PullRequest::from_raw(record)
    }

    #[instrument(skip(self, pull_request), fields(repo = %repo, head = %pull_request.head, base = %pull_request.base))]
    async fn create_pull_request(
        &self,
        repo: &RepositoryId,
        pull_request: &NewPullRequest,
    ) -> Result<PullRequest, ForgeError> {
        let record = self.post_record(&format!("/repos/{repo}/pulls"), pull_request).await?;
        let created = PullRequest::from_raw(record)?;
        info!(number = %created.number, "Created pull request");
        Ok(created)
    }

    #[instrument(skip(self), fields(repo = %repo, number = %number))]
    async fn list_review_comments(
        &self,
        repo: &RepositoryId,
        number: PullRequestNumber,
    ) -> Result<Vec<ReviewComment>, ForgeError> {
        let records = self.list_records(&format!("/repos/{repo}/pulls/{number}/comments")).await?;
        records.into_iter().map(ReviewComment::from_raw).collect()
    }
}
