//! Forgeflow workflow components and the sequential workflow runner.
//!
//! This crate provides the eight GitHub components (Authorize plus the issue
//! and pull-request nodes), a registry that builds them by kind name, and the
//! [`Workflow`] runner that executes them in order.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Components read their input ports, make one call
//! through the [`pipeline`] forge traits and write their output ports. They
//! contain no GitHub details of their own.
//!
//! ## Sessions
//!
//! [`Authorize`] stores the session in the [`pipeline::ExecutionContext`].
//! Every other component takes its session from its own `client` input when
//! wired, otherwise from the context.

mod authorize;
mod issues;
mod pull_requests;
pub mod registry;
mod support;
pub mod workflow;

pub use authorize::Authorize;
pub use issues::{CreateIssue, GetIssue, ListIssues};
pub use pull_requests::{
    AddPullRequestComment, CreatePullRequest, ListPullRequests, ReadPullRequestComments,
};
pub use registry::{catalogue, instantiate, KINDS};
pub use workflow::{Link, Workflow};
