//! Sequential workflow runner.
//!
//! A [`Workflow`] executes its components in insertion order against one
//! [`ExecutionContext`]. Before each component runs, every [`Link`] targeting
//! it copies an upstream output into one of its inputs. The first failure
//! stops the run and is returned as-is.

use pipeline::{Component, ExecutionContext, NodeId, PipelineError};
use tracing::{info, info_span, Instrument};

/// Copies `from.from_port` into `to.to_port` before `to` executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub from: NodeId,
    pub from_port: String,
    pub to: NodeId,
    pub to_port: String,
}

#[derive(Default)]
pub struct Workflow {
    nodes: Vec<Box<dyn Component>>,
    links: Vec<Link>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a component; it runs after every component already added.
    pub fn push(&mut self, component: Box<dyn Component>) -> Result<(), PipelineError> {
        if self.position(component.id()).is_some() {
            return Err(PipelineError::DuplicateComponent { node: component.id().clone() });
        }
        self.nodes.push(component);
        Ok(())
    }

    /// Links an output to a later component's input.
    ///
    /// Port names are checked against the components' descriptors; the
    /// value's type is checked when it is copied.
    pub fn link(
        &mut self,
        from: &NodeId,
        from_port: &str,
        to: &NodeId,
        to_port: &str,
    ) -> Result<(), PipelineError> {
        let invalid = |reason: &str| PipelineError::InvalidLink {
            from: from.clone(),
            from_port: from_port.to_owned(),
            to: to.clone(),
            to_port: to_port.to_owned(),
            reason: reason.to_owned(),
        };
        let source = self
            .position(from)
            .ok_or_else(|| PipelineError::UnknownComponent { name: from.to_string() })?;
        let target = self
            .position(to)
            .ok_or_else(|| PipelineError::UnknownComponent { name: to.to_string() })?;
        if source >= target {
            return Err(invalid("source must run before target"));
        }
        if !self.nodes[source].descriptor().outputs.iter().any(|p| p.name == from_port) {
            return Err(invalid("source has no such output"));
        }
        if !self.nodes[target].descriptor().inputs.iter().any(|p| p.name == to_port) {
            return Err(invalid("target has no such input"));
        }

        self.links.push(Link {
            from: from.clone(),
            from_port: from_port.to_owned(),
            to: to.clone(),
            to_port: to_port.to_owned(),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &NodeId) -> Option<&dyn Component> {
        self.position(id).map(|i| self.nodes[i].as_ref())
    }

    fn position(&self, id: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id() == id)
    }

    /// Runs every component once, in order.
    pub async fn run(&mut self, ctx: &mut ExecutionContext) -> Result<(), PipelineError> {
        info!(execution = %ctx.id(), nodes = self.nodes.len(), "Starting workflow");

        for index in 0..self.nodes.len() {
            self.apply_links(index)?;

            let node = &mut self.nodes[index];
            let span = info_span!(
                "component",
                node = %node.id(),
                kind = node.descriptor().kind,
                execution = %ctx.id()
            );
            node.execute(ctx).instrument(span).await?;
        }

        info!(execution = %ctx.id(), "Workflow finished");
        Ok(())
    }

    /// Copies upstream outputs into node `index`. Unwritten outputs are skipped;
    /// the target's own required-input check reports them.
    fn apply_links(&mut self, index: usize) -> Result<(), PipelineError> {
        let (upstream, rest) = self.nodes.split_at_mut(index);
        let target = &mut rest[0];
        let target_id = target.id().clone();
        for link in self.links.iter().filter(|l| l.to == target_id) {
            let Some(source) = upstream.iter().find(|n| n.id() == &link.from) else {
                continue;
            };
            if let Some(value) = source.output(&link.from_port) {
                target.set_input(&link.to_port, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AddPullRequestComment, Authorize, CreateIssue, GetIssue};
    use pipeline::testing::{InMemoryForge, InMemorySessionFactory, IssuedSession};
    use pipeline::{PortValue, SessionFactory};
    use std::sync::Arc;

    fn id(name: &str) -> NodeId {
        NodeId::new(name).unwrap()
    }

    #[tokio::test]
    async fn authorize_then_repository_node_shares_the_session() {
        let forge = InMemoryForge::new();
        forge.add_repository("octo/hello", &[]);
        let factory = Arc::new(InMemorySessionFactory::new(forge.clone(), Some("env-token")));
        let shared: Arc<dyn SessionFactory> = factory.clone();

        let mut create = CreateIssue::new(id("create"));
        create.repo_name.set("octo/hello".into());
        create.title.set("From a workflow".into());

        let mut workflow = Workflow::new();
        workflow.push(Box::new(Authorize::new(id("auth"), shared))).unwrap();
        workflow.push(Box::new(create)).unwrap();

        let mut ctx = ExecutionContext::new();
        workflow.run(&mut ctx).await.unwrap();

        assert_eq!(factory.issued(), vec![IssuedSession::Environment]);
        let output = workflow.node(&id("create")).unwrap().output("issue").unwrap();
        assert!(matches!(output, PortValue::FieldMapping(ref r) if r.get_str("title") == Some("From a workflow")));
    }

    #[tokio::test]
    async fn links_carry_values_between_components() {
        let forge = InMemoryForge::new();
        forge.add_repository("octo/hello", &[]);
        let factory: Arc<dyn SessionFactory> =
            Arc::new(InMemorySessionFactory::new(forge.clone(), None));

        let mut create = CreateIssue::new(id("create"));
        create.repo_name.set("octo/hello".into());
        create.title.set("Linked".into());
        let mut get = GetIssue::new(id("get"));
        get.repo_name.set("octo/hello".into());
        get.issue_number.set(1);

        let mut workflow = Workflow::new();
        workflow.push(Box::new(Authorize::new(id("auth"), factory))).unwrap();
        workflow.push(Box::new(create)).unwrap();
        workflow.push(Box::new(get)).unwrap();
        workflow.link(&id("auth"), "client", &id("get"), "client").unwrap();

        let mut ctx = ExecutionContext::new();
        workflow.run(&mut ctx).await.unwrap();

        let issue = workflow.node(&id("get")).unwrap().output("issue").unwrap();
        assert_eq!(issue.to_json()["title"], "Linked");
    }

    #[test]
    fn links_must_point_forward_to_real_ports() {
        let mut workflow = Workflow::new();
        workflow.push(Box::new(CreateIssue::new(id("create")))).unwrap();
        workflow.push(Box::new(GetIssue::new(id("get")))).unwrap();

        let backwards = workflow.link(&id("get"), "issue", &id("create"), "title").unwrap_err();
        assert!(matches!(backwards, PipelineError::InvalidLink { .. }));

        let no_port = workflow.link(&id("create"), "nope", &id("get"), "repo_name").unwrap_err();
        assert!(no_port.to_string().ends_with("source has no such output"));

        let unknown = workflow.link(&id("missing"), "issue", &id("get"), "repo_name").unwrap_err();
        assert!(matches!(unknown, PipelineError::UnknownComponent { .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut workflow = Workflow::new();
        workflow.push(Box::new(GetIssue::new(id("same")))).unwrap();
        assert!(workflow.push(Box::new(GetIssue::new(id("same")))).is_err());
        assert_eq!(workflow.len(), 1);
    }

    #[tokio::test]
    async fn first_failure_stops_the_run() {
        let forge = InMemoryForge::new();
        forge.add_repository("octo/hello", &[]);
        let factory: Arc<dyn SessionFactory> =
            Arc::new(InMemorySessionFactory::new(forge.clone(), None));

        let mut comment = AddPullRequestComment::new(id("comment"));
        comment.repo_name.set("octo/hello".into());
        comment.pull_request_number.set(9);
        comment.comment.set("hi".into());
        let mut after = CreateIssue::new(id("after"));
        after.repo_name.set("octo/hello".into());
        after.title.set("never".into());

        let mut workflow = Workflow::new();
        workflow.push(Box::new(Authorize::new(id("auth"), factory))).unwrap();
        workflow.push(Box::new(comment)).unwrap();
        workflow.push(Box::new(after)).unwrap();

        let mut ctx = ExecutionContext::new();
        assert!(workflow.run(&mut ctx).await.is_err());
        assert!(workflow.node(&id("after")).unwrap().output("issue").is_none());
        assert_eq!(forge.calls(), vec!["get_pull_request octo/hello".to_owned()]);
    }
}
