//! Forgeflow GitHub infrastructure adapter.
//!
//! Implements the forge traits defined in the [`pipeline`] crate
//! (`IssueTracker`, `PullRequestManager`, `SessionFactory`) on top of the
//! `octocrab` GitHub client.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! `octocrab` owns the wire protocol (authentication headers, pagination
//! links, error payloads); the [`pipeline`] and `nodes` crates never see it.
//!
//! ## Pagination
//!
//! List operations request pages of [`config::DEFAULT_PER_PAGE`] items and
//! follow the `next` pages `octocrab` reports until exhausted, preserving
//! GitHub's order.
//!
//! ## Errors
//!
//! Failures become [`pipeline::ForgeError`] values carrying GitHub's own
//! status and message.

pub mod client;
pub mod config;
pub mod connector;
mod error;

pub use client::GithubClient;
pub use config::{ConfigError, GithubConfig, API_URL_ENV, TIMEOUT_ENV, TOKEN_ENV};
pub use connector::GithubConnector;
