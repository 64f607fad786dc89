//! Pull-request components.
//!
//! Reading comments uses the review-comment stream (diff comments) while
//! adding a comment posts to the conversation thread. The two streams are
//! distinct on GitHub, so a comment added here is not returned by
//! [`ReadPullRequestComments`].

use async_trait::async_trait;
use pipeline::{
    Component, ExecutionContext, ForgeSession, InArg, IssueTracker, NewPullRequest, NodeId,
    OutArg, PipelineError, PullRequestManager, PullRequestNumber, RawRecord,
};
use tracing::info;

use crate::support::{
    branch, component_ports, number, repository, resolve_session, text_or_empty,
};

/// Lists the titles of the repository's open pull requests, in forge order.
pub struct ListPullRequests {
    id: NodeId,
    pub repo_name: InArg<String>,
    pub client: InArg<ForgeSession>,
    pub pull_requests: OutArg<Vec<String>>,
}

impl ListPullRequests {
    pub const KIND: &'static str = "GithubListPullRequests";

    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            repo_name: InArg::required("repo_name"),
            client: InArg::optional("client"),
            pull_requests: OutArg::new("pull_requests"),
        }
    }
}

#[async_trait]
impl Component for ListPullRequests {
    component_ports! {
        kind: Self::KIND,
        description: "List the titles of the pull requests in a repository.",
        inputs: [repo_name, client],
        outputs: [pull_requests],
    }

    async fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<(), PipelineError> {
        self.pull_requests.clear();
        let repo = repository(&self.id, &self.repo_name)?;
        let session = resolve_session(&self.id, &self.client, ctx)?;

        let titles: Vec<String> =
            session.list_pull_requests(&repo).await?.into_iter().map(|pr| pr.title).collect();

        info!(node = %self.id, repo = %repo, count = titles.len(), "Listed pull requests");
        self.pull_requests.set(titles);
        Ok(())
    }
}

/// Opens a pull request from `head` into `base`.
///
/// No local checks are made on the branch pair; the forge's rejection (same
/// branch, unknown branch, duplicate pull request) is returned unchanged.
pub struct CreatePullRequest {
    id: NodeId,
    pub repo_name: InArg<String>,
    pub title: InArg<String>,
    pub body: InArg<String>,
    pub head: InArg<String>,
    pub base: InArg<String>,
    pub client: InArg<ForgeSession>,
    pub pull_request: OutArg<RawRecord>,
}

impl CreatePullRequest {
    pub const KIND: &'static str = "GithubCreatePullRequest";

    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            repo_name: InArg::required("repo_name"),
            title: InArg::required("title"),
            body: InArg::optional("body"),
            head: InArg::required("head"),
            base: InArg::required("base"),
            client: InArg::optional("client"),
            pull_request: OutArg::new("pull_request"),
        }
    }
}

#[async_trait]
impl Component for CreatePullRequest {
    component_ports! {
        kind: Self::KIND,
        description: "Create a new pull request.",
        inputs: [repo_name, title, body, head, base, client],
        outputs: [pull_request],
    }

    async fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<(), PipelineError> {
        self.pull_request.clear();
        let repo = repository(&self.id, &self.repo_name)?;
        let new_pr = NewPullRequest {
            title: self.title.require(&self.id)?.clone(),
            body: text_or_empty(&self.body),
            head: branch(&self.id, &self.head)?,
            base: branch(&self.id, &self.base)?,
        };
        let session = resolve_session(&self.id, &self.client, ctx)?;

        let pr = session.create_pull_request(&repo, &new_pr).await?;

        info!(node = %self.id, repo = %repo, number = %pr.number, "Created pull request");
        self.pull_request.set(pr.raw);
        Ok(())
    }
}

/// Outputs the bodies of a pull request's review comments, in forge order.
pub struct ReadPullRequestComments {
    id: NodeId,
    pub repo_name: InArg<String>,
    pub pull_request_number: InArg<i64>,
    pub client: InArg<ForgeSession>,
    pub comments: OutArg<Vec<String>>,
}

impl ReadPullRequestComments {
    pub const KIND: &'static str = "GithubReadPullRequestComments";

    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            repo_name: InArg::required("repo_name"),
            pull_request_number: InArg::required("pull_request_number"),
            client: InArg::optional("client"),
            comments: OutArg::new("comments"),
        }
    }
}

#[async_trait]
impl Component for ReadPullRequestComments {
    component_ports! {
        kind: Self::KIND,
        description: "Read the review comments of a pull request.",
        inputs: [repo_name, pull_request_number, client],
        outputs: [comments],
    }

    async fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<(), PipelineError> {
        self.comments.clear();
        let repo = repository(&self.id, &self.repo_name)?;
        let number =
            number(&self.id, &self.pull_request_number, PullRequestNumber::from_port_integer)?;
        let session = resolve_session(&self.id, &self.client, ctx)?;

        let pr = session.get_pull_request(&repo, number).await?;
        let bodies: Vec<String> = session
            .list_review_comments(&repo, pr.number)
            .await?
            .into_iter()
            .map(|comment| comment.body)
            .collect();

        info!(node = %self.id, repo = %repo, number = %pr.number, count = bodies.len(), "Read review comments");
        self.comments.set(bodies);
        Ok(())
    }
}

/// Posts a comment on a pull request's conversation thread.
///
/// `success` is `true` whenever the forge accepted the comment.
pub struct AddPullRequestComment {
    id: NodeId,
    pub repo_name: InArg<String>,
    pub pull_request_number: InArg<i64>,
    pub comment: InArg<String>,
    pub client: InArg<ForgeSession>,
    pub success: OutArg<bool>,
}

impl AddPullRequestComment {
    pub const KIND: &'static str = "GithubAddPullRequestComment";

    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            repo_name: InArg::required("repo_name"),
            pull_request_number: InArg::required("pull_request_number"),
            comment: InArg::required("comment"),
            client: InArg::optional("client"),
            success: OutArg::new("success"),
        }
    }
}

#[async_trait]
impl Component for AddPullRequestComment {
    component_ports! {
        kind: Self::KIND,
        description: "Add a comment to a pull request's conversation.",
        inputs: [repo_name, pull_request_number, comment, client],
        outputs: [success],
    }

    async fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<(), PipelineError> {
        self.success.clear();
        let repo = repository(&self.id, &self.repo_name)?;
        let number =
            number(&self.id, &self.pull_request_number, PullRequestNumber::from_port_integer)?;
        let body = self.comment.require(&self.id)?.clone();
        let session = resolve_session(&self.id, &self.client, ctx)?;

        let pr = session.get_pull_request(&repo, number).await?;
        session.create_issue_comment(&repo, pr.number.into(), &body).await?;

        info!(node = %self.id, repo = %repo, number = %pr.number, "Added pull request comment");
        self.success.set(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::testing::InMemoryForge;
    use pipeline::{ForgeError, PortValue};
    use std::sync::Arc;

    const REPO: &str = "octo/hello";

    fn forge() -> InMemoryForge {
        let forge = InMemoryForge::new();
        forge.add_repository(REPO, &["main", "feature"]);
        forge
    }

    fn context_with(forge: &InMemoryForge) -> ExecutionContext {
        let mut ctx = ExecutionContext::new();
        ctx.set_client(Arc::new(forge.clone()));
        ctx
    }

    fn node_id() -> NodeId {
        NodeId::new("node").unwrap()
    }

    fn create_node(head: &str, base: &str) -> CreatePullRequest {
        let mut node = CreatePullRequest::new(node_id());
        node.repo_name.set(REPO.into());
        node.title.set("Add feature".into());
        node.body.set("Details".into());
        node.head.set(head.into());
        node.base.set(base.into());
        node
    }

    #[tokio::test]
    async fn create_pull_request_outputs_branch_refs() {
        let forge = forge();
        let mut ctx = context_with(&forge);
        let mut node = create_node("feature", "main");

        node.execute(&mut ctx).await.unwrap();

        let raw = node.pull_request.value().unwrap();
        assert_eq!(raw.get("head").unwrap()["ref"], "feature");
        assert_eq!(raw.get("base").unwrap()["ref"], "main");
        assert_eq!(raw.get_str("body"), Some("Details"));
    }

    #[tokio::test]
    async fn same_head_and_base_is_rejected_by_the_forge_not_locally() {
        let forge = forge();
        let mut ctx = context_with(&forge);
        let mut node = create_node("main", "main");

        let err = node.execute(&mut ctx).await.unwrap_err();

        assert!(matches!(err, PipelineError::Forge(ForgeError::Validation { .. })));
        assert_eq!(forge.calls(), vec![format!("create_pull_request {REPO}")]);
    }

    #[tokio::test]
    async fn duplicate_pull_request_error_propagates() {
        let forge = forge();
        forge.seed_pull_request(REPO, "existing", "feature", "main");
        let mut ctx = context_with(&forge);

        let err = create_node("feature", "main").execute(&mut ctx).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: A pull request already exists for feature."
        );
    }

    #[tokio::test]
    async fn read_comments_returns_review_comments_in_order() {
        let forge = forge();
        let pr = forge.seed_pull_request(REPO, "Add feature", "feature", "main");
        forge.seed_review_comment(REPO, pr, "first");
        forge.seed_review_comment(REPO, pr, "second");
        let mut ctx = context_with(&forge);

        let mut node = ReadPullRequestComments::new(node_id());
        node.repo_name.set(REPO.into());
        node.pull_request_number.set(pr.as_u64() as i64);
        node.execute(&mut ctx).await.unwrap();

        assert_eq!(
            node.output("comments"),
            Some(PortValue::ListOfString(vec!["first".into(), "second".into()]))
        );
    }

    #[tokio::test]
    async fn read_comments_on_an_issue_number_is_not_found() {
        let forge = forge();
        let issue = forge.seed_issue(REPO, "not a PR", "");
        let mut ctx = context_with(&forge);

        let mut node = ReadPullRequestComments::new(node_id());
        node.repo_name.set(REPO.into());
        node.pull_request_number.set(issue.as_u64() as i64);
        let err = node.execute(&mut ctx).await.unwrap_err();

        assert!(matches!(err, PipelineError::Forge(ForgeError::NotFound { .. })));
    }

    #[tokio::test]
    async fn empty_comment_still_reports_success() {
        let forge = forge();
        let pr = forge.seed_pull_request(REPO, "Add feature", "feature", "main");
        let mut ctx = context_with(&forge);

        let mut node = AddPullRequestComment::new(node_id());
        node.repo_name.set(REPO.into());
        node.pull_request_number.set(pr.as_u64() as i64);
        node.comment.set(String::new());
        node.execute(&mut ctx).await.unwrap();

        assert_eq!(node.output("success"), Some(PortValue::Boolean(true)));
        assert_eq!(forge.issue_comments(REPO, pr.into()), vec![String::new()]);
        assert_eq!(
            forge.calls(),
            vec![format!("get_pull_request {REPO}"), format!("create_issue_comment {REPO}")]
        );
    }

    #[tokio::test]
    async fn added_comment_lands_on_the_conversation_not_the_review_thread() {
        let forge = forge();
        let pr = forge.seed_pull_request(REPO, "Add feature", "feature", "main");
        let mut ctx = context_with(&forge);

        let mut add = AddPullRequestComment::new(node_id());
        add.repo_name.set(REPO.into());
        add.pull_request_number.set(pr.as_u64() as i64);
        add.comment.set("LGTM".into());
        add.execute(&mut ctx).await.unwrap();

        let mut read = ReadPullRequestComments::new(node_id());
        read.repo_name.set(REPO.into());
        read.pull_request_number.set(pr.as_u64() as i64);
        read.execute(&mut ctx).await.unwrap();

        assert_eq!(read.comments.value(), Some(&Vec::new()));
        assert_eq!(forge.review_comments(REPO, pr), Vec::<String>::new());
    }

    #[tokio::test]
    async fn failed_comment_leaves_success_unset() {
        let forge = forge();
        let mut ctx = context_with(&forge);

        let mut node = AddPullRequestComment::new(node_id());
        node.repo_name.set(REPO.into());
        node.pull_request_number.set(404);
        node.comment.set("hello".into());

        assert!(node.execute(&mut ctx).await.is_err());
        assert_eq!(node.output("success"), None);
    }

    #[tokio::test]
    async fn rerun_that_fails_does_not_keep_the_earlier_success() {
        let forge = forge();
        let pr = forge.seed_pull_request(REPO, "Add feature", "feature", "main");
        let mut ctx = context_with(&forge);

        let mut node = AddPullRequestComment::new(node_id());
        node.repo_name.set(REPO.into());
        node.pull_request_number.set(pr.as_u64() as i64);
        node.comment.set("first pass".into());
        node.execute(&mut ctx).await.unwrap();
        assert_eq!(node.output("success"), Some(PortValue::Boolean(true)));

        node.pull_request_number.set(404);
        assert!(node.execute(&mut ctx).await.is_err());
        assert_eq!(node.output("success"), None);
    }

    #[tokio::test]
    async fn rerun_that_fails_drops_the_earlier_comment_list() {
        let forge = forge();
        let pr = forge.seed_pull_request(REPO, "Add feature", "feature", "main");
        forge.seed_review_comment(REPO, pr, "nit");
        let mut ctx = context_with(&forge);

        let mut node = ReadPullRequestComments::new(node_id());
        node.repo_name.set(REPO.into());
        node.pull_request_number.set(pr.as_u64() as i64);
        node.execute(&mut ctx).await.unwrap();
        assert!(node.output("comments").is_some());

        node.repo_name.set("octo/missing".into());
        assert!(node.execute(&mut ctx).await.is_err());
        assert_eq!(node.output("comments"), None);
    }
}
