//! Command-line arguments.

use clap::{Parser, Subcommand, ValueEnum};
use nodes::{
    AddPullRequestComment, CreateIssue, CreatePullRequest, GetIssue, ListIssues,
    ListPullRequests, ReadPullRequestComments,
};
use pipeline::PortValue;

#[derive(Debug, Parser)]
#[command(name = "forgeflow", version, about = "Run GitHub workflow components from the shell")]
pub struct Cli {
    /// GitHub token; requests are anonymous when unset.
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub REST API base URL.
    #[arg(long, global = true, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Format of the log lines written to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the titles of a repository's issues.
    ListIssues {
        /// Repository as `owner/name`.
        repo: String,
    },
    /// Fetch one issue.
    GetIssue { repo: String, number: i64 },
    /// Open a new issue.
    CreateIssue {
        repo: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: Option<String>,
    },
    /// List the titles of a repository's pull requests.
    ListPullRequests { repo: String },
    /// Open a pull request from `head` into `base`.
    CreatePullRequest {
        repo: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        head: String,
        #[arg(long)]
        base: String,
        #[arg(long)]
        body: Option<String>,
    },
    /// Read a pull request's review comment bodies.
    ReadPrComments { repo: String, number: i64 },
    /// Post a conversation comment on a pull request.
    AddPrComment {
        repo: String,
        number: i64,
        #[arg(long)]
        comment: String,
    },
    /// Print every component's ports.
    Catalogue,
}

/// A component kind together with the inputs the command line supplies.
pub struct Invocation {
    pub kind: &'static str,
    pub inputs: Vec<(&'static str, PortValue)>,
}

impl Command {
    /// The component this subcommand runs; `None` for [`Command::Catalogue`].
    pub fn invocation(self) -> Option<Invocation> {
        let (kind, inputs) = match self {
            Self::ListIssues { repo } => (ListIssues::KIND, vec![repo_input(repo)]),
            Self::GetIssue { repo, number } => (
                GetIssue::KIND,
                vec![repo_input(repo), ("issue_number", PortValue::Integer(number))],
            ),
            Self::CreateIssue { repo, title, body } => {
                let mut inputs = vec![repo_input(repo), ("title", PortValue::String(title))];
                inputs.extend(body.map(|b| ("body", PortValue::String(b))));
                (CreateIssue::KIND, inputs)
            }
            Self::ListPullRequests { repo } => (ListPullRequests::KIND, vec![repo_input(repo)]),
            Self::CreatePullRequest { repo, title, head, base, body } => {
                let mut inputs = vec![
                    repo_input(repo),
                    ("title", PortValue::String(title)),
                    ("head", PortValue::String(head)),
                    ("base", PortValue::String(base)),
                ];
                inputs.extend(body.map(|b| ("body", PortValue::String(b))));
                (CreatePullRequest::KIND, inputs)
            }
            Self::ReadPrComments { repo, number } => (
                ReadPullRequestComments::KIND,
                vec![repo_input(repo), ("pull_request_number", PortValue::Integer(number))],
            ),
            Self::AddPrComment { repo, number, comment } => (
                AddPullRequestComment::KIND,
                vec![
                    repo_input(repo),
                    ("pull_request_number", PortValue::Integer(number)),
                    ("comment", PortValue::String(comment)),
                ],
            ),
            Self::Catalogue => return None,
        };
        Some(Invocation { kind, inputs })
    }
}

fn repo_input(repo: String) -> (&'static str, PortValue) {
    ("repo_name", PortValue::String(repo))
}
