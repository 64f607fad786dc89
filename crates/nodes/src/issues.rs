//! Issue-tracker components.

use async_trait::async_trait;
use pipeline::{
    Component, ExecutionContext, ForgeSession, InArg, IssueNumber, IssueTracker, NewIssue, NodeId,
    OutArg, PipelineError, RawRecord,
};
use tracing::info;

use crate::support::{component_ports, number, repository, resolve_session, text_or_empty};

/// Lists the titles of every issue in a repository, in forge order.
pub struct ListIssues {
    id: NodeId,
    pub repo_name: InArg<String>,
    pub client: InArg<ForgeSession>,
    pub issues: OutArg<Vec<String>>,
}

impl ListIssues {
    pub const KIND: &'static str = "GithubListIssues";

    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            repo_name: InArg::required("repo_name"),
            client: InArg::optional("client"),
            issues: OutArg::new("issues"),
        }
    }
}

#[async_trait]
impl Component for ListIssues {
    component_ports! {
        kind: Self::KIND,
        description: "List the titles of the issues in a repository.",
        inputs: [repo_name, client],
        outputs: [issues],
    }

    async fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<(), PipelineError> {
        self.issues.clear();
        let repo = repository(&self.id, &self.repo_name)?;
        let session = resolve_session(&self.id, &self.client, ctx)?;

        let titles: Vec<String> =
            session.list_issues(&repo).await?.into_iter().map(|issue| issue.title).collect();

        info!(node = %self.id, repo = %repo, count = titles.len(), "Listed issues");
        self.issues.set(titles);
        Ok(())
    }
}

/// Fetches one issue and outputs its full field mapping.
pub struct GetIssue {
    id: NodeId,
    pub repo_name: InArg<String>,
    pub issue_number: InArg<i64>,
    pub client: InArg<ForgeSession>,
    pub issue: OutArg<RawRecord>,
}

impl GetIssue {
    pub const KIND: &'static str = "GithubGetIssue";

    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            repo_name: InArg::required("repo_name"),
            issue_number: InArg::required("issue_number"),
            client: InArg::optional("client"),
            issue: OutArg::new("issue"),
        }
    }
}

#[async_trait]
impl Component for GetIssue {
    component_ports! {
        kind: Self::KIND,
        description: "Get the details of one issue.",
        inputs: [repo_name, issue_number, client],
        outputs: [issue],
    }

    async fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<(), PipelineError> {
        self.issue.clear();
        let repo = repository(&self.id, &self.repo_name)?;
        let number = number(&self.id, &self.issue_number, IssueNumber::from_port_integer)?;
        let session = resolve_session(&self.id, &self.client, ctx)?;

        let issue = session.get_issue(&repo, number).await?;

        info!(node = %self.id, repo = %repo, number = %issue.number, "Fetched issue");
        self.issue.set(issue.raw);
        Ok(())
    }
}

/// Opens a new issue and outputs the created record.
pub struct CreateIssue {
    id: NodeId,
    pub repo_name: InArg<String>,
    pub title: InArg<String>,
    pub body: InArg<String>,
    pub client: InArg<ForgeSession>,
    pub issue: OutArg<RawRecord>,
}

impl CreateIssue {
    pub const KIND: &'static str = "GithubCreateIssue";

    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            repo_name: InArg::required("repo_name"),
            title: InArg::required("title"),
            body: InArg::optional("body"),
            client: InArg::optional("client"),
            issue: OutArg::new("issue"),
        }
    }
}

#[async_trait]
impl Component for CreateIssue {
    component_ports! {
        kind: Self::KIND,
        description: "Create a new issue.",
        inputs: [repo_name, title, body, client],
        outputs: [issue],
    }

    async fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<(), PipelineError> {
        self.issue.clear();
        let repo = repository(&self.id, &self.repo_name)?;
        let new_issue = NewIssue {
            title: self.title.require(&self.id)?.clone(),
            body: text_or_empty(&self.body),
        };
        let session = resolve_session(&self.id, &self.client, ctx)?;

        let issue = session.create_issue(&repo, &new_issue).await?;

        info!(node = %self.id, repo = %repo, number = %issue.number, "Created issue");
        self.issue.set(issue.raw);
        Ok(())
    }
}
