//! The execution context shared by all components of one workflow run.

use std::collections::HashMap;

use crate::{ExecutionId, ForgeSession, PortValue};

/// Context key under which Authorize stores the session.
pub const GITHUB_CLIENT_KEY: &str = "github_client";

/// Execution-scoped key/value registry.
///
/// Created once per run and passed by `&mut` to each component in turn, so
/// access is serial by construction.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    id: ExecutionId,
    values: HashMap<String, PortValue>,
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl ExecutionContext {
    /// Creates an empty context with a fresh [`ExecutionId`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> ExecutionId {
        self.id
    }

    pub fn get(&self, key: &str) -> Option<&PortValue> {
        self.values.get(key)
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: PortValue) -> Option<PortValue> {
        self.values.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<PortValue> {
        self.values.remove(key)
    }

    /// The session stored by Authorize, if any.
    ///
    /// A non-client value under [`GITHUB_CLIENT_KEY`] is treated as absent.
    pub fn client(&self) -> Option<ForgeSession> {
        match self.values.get(GITHUB_CLIENT_KEY) {
            Some(PortValue::Client(session)) => Some(session.clone()),
            _ => None,
        }
    }

    /// Stores `session` under [`GITHUB_CLIENT_KEY`].
    pub fn set_client(&mut self, session: ForgeSession) {
        self.values.insert(GITHUB_CLIENT_KEY.to_owned(), PortValue::Client(session));
    }
}
