//! In-memory forge for exercising components without a network.
//!
//! [`InMemoryForge`] mimics the GitHub behaviours the components rely on:
//! shared issue/pull-request numbering, issue views that include pull
//! requests, forge-ordered listings, validation
//! rejections for bad branch pairs, and lazy credential failures. Clones of a
//! forge (and sessions handed out by [`InMemorySessionFactory`]) share state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::json;

use crate::{
    ForgeError, ForgeSession, Issue, IssueComment, IssueNumber, IssueTracker, NewIssue,
    NewPullRequest, PullRequest, PullRequestManager, PullRequestNumber, RawRecord, RepositoryId,
    ReviewComment, SessionFactory,
};

/// Sessions built with this token fail every call with `Unauthorized`.
pub const INVALID_TOKEN: &str = "invalid-token";

#[derive(Debug, Default)]
struct RepoState {
    branches: Vec<String>,
    issues: Vec<RawRecord>,
    pulls: Vec<RawRecord>,
    review_comments: HashMap<u64, Vec<RawRecord>>,
    issue_comments: HashMap<u64, Vec<RawRecord>>,
    last_number: u64,
    last_comment_id: u64,
}

impl RepoState {
    fn next_number(&mut self) -> u64 {
        self.last_number += 1;
        self.last_number
    }

    fn next_comment_id(&mut self) -> u64 {
        self.last_comment_id += 1;
        self.last_comment_id
    }

    fn find_issue(&self, number: u64) -> Option<&RawRecord> {
        self.issues.iter().find(|r| number_of(r) == number)
    }

    fn find_pull(&self, number: u64) -> Option<&RawRecord> {
        self.pulls.iter().find(|r| number_of(r) == number)
    }

    /// GitHub's issue view: every issue and pull request, in creation order.
    fn issue_view(&self) -> Vec<RawRecord> {
        let mut all: Vec<RawRecord> =
            self.issues.iter().cloned().chain(self.pulls.iter().map(pull_as_issue)).collect();
        all.sort_by_key(number_of);
        all
    }

    fn find_in_issue_view(&self, number: u64) -> Option<RawRecord> {
        self.find_issue(number).cloned().or_else(|| self.find_pull(number).map(pull_as_issue))
    }
}

#[derive(Debug, Default)]
struct ForgeState {
    repos: HashMap<String, RepoState>,
    calls: Vec<String>,
}

/// A forge held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryForge {
    token: Option<String>,
    state: Arc<Mutex<ForgeState>>,
}

fn number_of(record: &RawRecord) -> u64 {
    record.get("number").and_then(|v| v.as_u64()).unwrap_or_default()
}

/// A pull request as the issues endpoints return it, marked with `pull_request`.
fn pull_as_issue(pull: &RawRecord) -> RawRecord {
    let mut fields = pull.as_map().clone();
    fields.insert("pull_request".to_owned(), json!({ "number": number_of(pull) }));
    record(serde_json::Value::Object(fields))
}

fn not_found() -> ForgeError {
    ForgeError::NotFound { message: "Not Found".to_owned() }
}

fn validation(message: impl Into<String>) -> ForgeError {
    ForgeError::Validation { message: message.into() }
}

fn record(value: serde_json::Value) -> RawRecord {
    RawRecord::from_value(value).unwrap_or_default()
}

impl InMemoryForge {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session over the same state authenticated with `token`.
    pub fn session(&self, token: Option<&str>) -> Self {
        Self { token: token.map(str::to_owned), state: Arc::clone(&self.state) }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, ForgeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates an empty repository with the given branches.
    pub fn add_repository(&self, repo: &str, branches: &[&str]) {
        let state = RepoState {
            branches: branches.iter().map(|b| (*b).to_owned()).collect(),
            ..RepoState::default()
        };
        self.lock().repos.insert(repo.to_owned(), state);
    }

    /// Adds an issue directly, bypassing call recording.
    pub fn seed_issue(&self, repo: &str, title: &str, body: &str) -> IssueNumber {
        let mut state = self.lock();
        let repo = state.repos.entry(repo.to_owned()).or_default();
        let number = repo.next_number();
        repo.issues.push(record(json!({
            "number": number,
            "title": title,
            "body": body,
            "state": "open",
            "created_at": "2024-01-01T00:00:00Z",
        })));
        IssueNumber::new(number)
    }

    /// Adds a pull request directly, bypassing branch validation.
    pub fn seed_pull_request(
        &self,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
    ) -> PullRequestNumber {
        let mut state = self.lock();
        let repo = state.repos.entry(repo.to_owned()).or_default();
        let number = repo.next_number();
        repo.pulls.push(pull_record(number, title, "", head, base));
        PullRequestNumber::new(number)
    }

    /// Adds a diff comment to a pull request.
    pub fn seed_review_comment(&self, repo: &str, number: PullRequestNumber, body: &str) {
        let mut state = self.lock();
        let repo = state.repos.entry(repo.to_owned()).or_default();
        let id = repo.next_comment_id();
        repo.review_comments
            .entry(number.as_u64())
            .or_default()
            .push(record(json!({ "id": id, "body": body })));
    }

    /// Bodies of the conversation comments on an issue or pull request.
    pub fn issue_comments(&self, repo: &str, number: IssueNumber) -> Vec<String> {
        self.lock()
            .repos
            .get(repo)
            .and_then(|r| r.issue_comments.get(&number.as_u64()))
            .map(|comments| {
                comments.iter().filter_map(|c| c.get_str("body").map(str::to_owned)).collect()
            })
            .unwrap_or_default()
    }

    /// Bodies of the review comments on a pull request.
    pub fn review_comments(&self, repo: &str, number: PullRequestNumber) -> Vec<String> {
        self.lock()
            .repos
            .get(repo)
            .and_then(|r| r.review_comments.get(&number.as_u64()))
            .map(|comments| {
                comments.iter().filter_map(|c| c.get_str("body").map(str::to_owned)).collect()
            })
            .unwrap_or_default()
    }

    /// Every remote operation performed so far, as `"<operation> <repo>"`.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Records the call, checks credentials and runs `f` against the repository.
    fn with_repo<T>(
        &self,
        operation: &str,
        repo: &RepositoryId,
        f: impl FnOnce(&mut RepoState) -> Result<T, ForgeError>,
    ) -> Result<T, ForgeError> {
        let mut state = self.lock();
        state.calls.push(format!("{operation} {repo}"));
        if self.token.as_deref() == Some(INVALID_TOKEN) {
            return Err(ForgeError::Unauthorized { message: "Bad credentials".to_owned() });
        }
        let repo = state.repos.get_mut(repo.as_str()).ok_or_else(not_found)?;
        f(repo)
    }
}

fn pull_record(number: u64, title: &str, body: &str, head: &str, base: &str) -> RawRecord {
    record(json!({
        "number": number,
        "title": title,
        "body": body,
        "state": "open",
        "head": { "ref": head },
        "base": { "ref": base },
    }))
}

#[async_trait]
impl IssueTracker for InMemoryForge {
    async fn list_issues(&self, repo: &RepositoryId) -> Result<Vec<Issue>, ForgeError> {
        self.with_repo("list_issues", repo, |r| {
            r.issue_view().into_iter().map(Issue::from_raw).collect()
        })
    }

    async fn get_issue(
        &self,
        repo: &RepositoryId,
        number: IssueNumber,
    ) -> Result<Issue, ForgeError> {
        self.with_repo("get_issue", repo, |r| {
            let raw = r.find_in_issue_view(number.as_u64()).ok_or_else(not_found)?;
            Issue::from_raw(raw)
        })
    }

    async fn create_issue(
        &self,
        repo: &RepositoryId,
        issue: &NewIssue,
    ) -> Result<Issue, ForgeError> {
        self.with_repo("create_issue", repo, |r| {
            if issue.title.is_empty() {
                return Err(validation("Validation Failed: title is missing"));
            }
            let number = r.next_number();
            let raw = record(json!({
                "number": number,
                "title": issue.title,
                "body": issue.body,
                "state": "open",
                "created_at": "2024-01-01T00:00:00Z",
            }));
            r.issues.push(raw.clone());
            Issue::from_raw(raw)
        })
    }

    async fn create_issue_comment(
        &self,
        repo: &RepositoryId,
        number: IssueNumber,
        body: &str,
    ) -> Result<IssueComment, ForgeError> {
        self.with_repo("create_issue_comment", repo, |r| {
            let n = number.as_u64();
            if r.find_issue(n).is_none() && r.find_pull(n).is_none() {
                return Err(not_found());
            }
            let id = r.next_comment_id();
            let raw = record(json!({ "id": id, "body": body }));
            r.issue_comments.entry(n).or_default().push(raw.clone());
            IssueComment::from_raw(raw)
        })
    }
}

#[async_trait]
impl PullRequestManager for InMemoryForge {
    async fn list_pull_requests(
        &self,
        repo: &RepositoryId,
    ) -> Result<Vec<PullRequest>, ForgeError> {
        self.with_repo("list_pull_requests", repo, |r| {
            r.pulls.iter().cloned().map(PullRequest::from_raw).collect()
        })
    }

    async fn get_pull_request(
        &self,
        repo: &RepositoryId,
        number: PullRequestNumber,
    ) -> Result<PullRequest, ForgeError> {
        self.with_repo("get_pull_request", repo, |r| {
            let raw = r.find_pull(number.as_u64()).cloned().ok_or_else(not_found)?;
            PullRequest::from_raw(raw)
        })
    }

    async fn create_pull_request(
        &self,
        repo: &RepositoryId,
        pull_request: &NewPullRequest,
    ) -> Result<PullRequest, ForgeError> {
        self.with_repo("create_pull_request", repo, |r| {
            let head = pull_request.head.as_str();
            let base = pull_request.base.as_str();
            if head == base {
                return Err(validation(format!("No commits between {base} and {head}")));
            }
            for branch in [head, base] {
                if !r.branches.iter().any(|b| b == branch) {
                    return Err(validation(format!("Validation Failed: unknown branch {branch}")));
                }
            }
            let exists = r.pulls.iter().filter_map(|p| PullRequest::from_raw(p.clone()).ok()).any(
                |p| p.head.as_str() == head && p.base.as_str() == base,
            );
            if exists {
                return Err(validation(format!("A pull request already exists for {head}.")));
            }
            let number = r.next_number();
            let raw = pull_record(number, &pull_request.title, &pull_request.body, head, base);
            r.pulls.push(raw.clone());
            PullRequest::from_raw(raw)
        })
    }

    async fn list_review_comments(
        &self,
        repo: &RepositoryId,
        number: PullRequestNumber,
    ) -> Result<Vec<ReviewComment>, ForgeError> {
        self.with_repo("list_review_comments", repo, |r| {
            r.review_comments
                .get(&number.as_u64())
                .map(|comments| comments.iter().cloned().map(ReviewComment::from_raw).collect())
                .unwrap_or_else(|| Ok(Vec::new()))
        })
    }
}

/// How an [`InMemorySessionFactory`] session was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuedSession {
    Token(String),
    Environment,
}

/// Hands out sessions over one shared [`InMemoryForge`].
#[derive(Debug)]
pub struct InMemorySessionFactory {
    forge: InMemoryForge,
    environment_token: Option<String>,
    issued: Mutex<Vec<IssuedSession>>,
}

impl InMemorySessionFactory {
    /// `environment_token` plays the role of `GITHUB_TOKEN`.
    pub fn new(forge: InMemoryForge, environment_token: Option<&str>) -> Self {
        Self {
            forge,
            environment_token: environment_token.map(str::to_owned),
            issued: Mutex::new(Vec::new()),
        }
    }

    /// Every session built so far, in order.
    pub fn issued(&self) -> Vec<IssuedSession> {
        self.issued.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, issued: IssuedSession) {
        self.issued.lock().unwrap_or_else(PoisonError::into_inner).push(issued);
    }
}

impl SessionFactory for InMemorySessionFactory {
    fn from_token(&self, token: &str) -> Result<ForgeSession, ForgeError> {
        self.record(IssuedSession::Token(token.to_owned()));
        Ok(Arc::new(self.forge.session(Some(token))))
    }

    fn from_environment(&self) -> Result<ForgeSession, ForgeError> {
        self.record(IssuedSession::Environment);
        Ok(Arc::new(self.forge.session(self.environment_token.as_deref())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BranchName;

    fn repo() -> RepositoryId {
        RepositoryId::new("octo/hello").unwrap()
    }

    #[tokio::test]
    async fn issues_and_pull_requests_share_numbering() {
        let forge = InMemoryForge::new();
        forge.add_repository("octo/hello", &["main", "topic"]);

        let issue = forge
            .create_issue(&repo(), &NewIssue { title: "one".into(), body: String::new() })
            .await
            .unwrap();
        let pr = forge
            .create_pull_request(
                &repo(),
                &NewPullRequest {
                    title: "two".into(),
                    body: String::new(),
                    head: BranchName::new("topic").unwrap(),
                    base: BranchName::new("main").unwrap(),
                },
            )
            .await
            .unwrap();

        assert_eq!(issue.number.as_u64(), 1);
        assert_eq!(pr.number.as_u64(), 2);
    }

    #[tokio::test]
    async fn unknown_repository_is_not_found() {
        let forge = InMemoryForge::new();
        let err = forge.list_issues(&repo()).await.unwrap_err();
        assert_eq!(err, not_found());
        assert_eq!(forge.calls(), vec!["list_issues octo/hello".to_owned()]);
    }

    #[tokio::test]
    async fn invalid_token_fails_on_first_call() {
        let forge = InMemoryForge::new();
        forge.add_repository("octo/hello", &[]);
        let session = forge.session(Some(INVALID_TOKEN));

        let err = session.list_pull_requests(&repo()).await.unwrap_err();
        assert!(matches!(err, ForgeError::Unauthorized { .. }));
    }

    #[test]
    fn factory_records_how_sessions_were_built() {
        let factory = InMemorySessionFactory::new(InMemoryForge::new(), Some("env"));
        factory.from_token("explicit").unwrap();
        factory.from_environment().unwrap();
        assert_eq!(
            factory.issued(),
            vec![IssuedSession::Token("explicit".into()), IssuedSession::Environment]
        );
    }
}
