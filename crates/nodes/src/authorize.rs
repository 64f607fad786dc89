//! The Authorize component: produces the session every other node uses.

use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{
    Component, ExecutionContext, ForgeSession, InArg, NodeId, OutArg, PipelineError,
    SessionFactory,
};
use tracing::{debug, info};

use crate::support::component_ports;

/// Creates or reuses an authenticated client and publishes it to the context.
///
/// Resolution order:
/// 1. a client wired to the `client` input;
/// 2. a new client from the `token` input;
/// 3. the client already in the context;
/// 4. a new client from the environment credential.
///
/// The result goes to the `client` output and into the context under
/// [`pipeline::GITHUB_CLIENT_KEY`]. A missing or invalid token is not an
/// error here; it surfaces on the first remote call.
pub struct Authorize {
    id: NodeId,
    factory: Arc<dyn SessionFactory>,
    pub token: InArg<String>,
    pub explicit_client: InArg<ForgeSession>,
    pub client: OutArg<ForgeSession>,
}

impl Authorize {
    pub const KIND: &'static str = "GithubAuthorize";

    pub fn new(id: NodeId, factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            id,
            factory,
            token: InArg::optional("token"),
            explicit_client: InArg::optional("client"),
            client: OutArg::new("client"),
        }
    }

    /// Supplies a ready-made client, bypassing the factory.
    pub fn with_client(mut self, session: ForgeSession) -> Self {
        self.explicit_client.set(session);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token.set(token.into());
        self
    }

    fn resolve(&self, ctx: &ExecutionContext) -> Result<ForgeSession, PipelineError> {
        if let Some(session) = self.explicit_client.value() {
            debug!("Using explicitly supplied client");
            return Ok(session.clone());
        }
        // A blank token is treated as absent.
        if let Some(token) = self.token.value().filter(|t| !t.trim().is_empty()) {
            debug!("Building client from token input");
            return Ok(self.factory.from_token(token)?);
        }
        if let Some(session) = ctx.client() {
            debug!("Reusing client from execution context");
            return Ok(session);
        }
        debug!("Building client from environment credential");
        Ok(self.factory.from_environment()?)
    }
}

#[async_trait]
impl Component for Authorize {
    component_ports! {
        kind: Self::KIND,
        description: "Authorize a GitHub client from a token or the environment.",
        inputs: [token, explicit_client],
        outputs: [client],
    }

    async fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<(), PipelineError> {
        self.client.clear();
        let session = self.resolve(ctx)?;
        ctx.set_client(session.clone());
        self.client.set(session);
        info!(node = %self.id, "GitHub client ready");
        Ok(())
    }
}
