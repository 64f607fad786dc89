//! The contract every workflow component implements.

use async_trait::async_trait;
use serde::Serialize;

use crate::{ExecutionContext, NodeId, PipelineError, PortSpec, PortValue};

/// Static description of a component kind, as published to a hosting engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentDescriptor {
    /// Stable kind name (e.g. `"GithubListIssues"`).
    pub kind: &'static str,
    /// One-line human-readable summary.
    pub description: &'static str,
    pub inputs: Vec<PortSpec>,
    pub outputs: Vec<PortSpec>,
}

/// A unit of work in a workflow graph.
///
/// The hosting engine sets inputs by port name, calls [`Component::execute`]
/// once, then reads outputs by port name. Components hold no state between
/// executions other than their port values.
#[async_trait]
pub trait Component: Send {
    /// Instance name within the workflow graph.
    fn id(&self) -> &NodeId;

    fn descriptor(&self) -> ComponentDescriptor;

    /// Sets an input port from a dynamically typed value.
    ///
    /// Fails with [`PipelineError::UnknownPort`] or
    /// [`PipelineError::PortTypeMismatch`].
    fn set_input(&mut self, port: &str, value: PortValue) -> Result<(), PipelineError>;

    /// Reads an output port; `None` until `execute` has written it.
    fn output(&self, port: &str) -> Option<PortValue>;

    /// Performs the component's remote call and writes its outputs.
    async fn execute(&mut self, ctx: &mut ExecutionContext) -> Result<(), PipelineError>;

    /// Every written output, in descriptor order.
    fn outputs(&self) -> Vec<(&'static str, PortValue)> {
        self.descriptor()
            .outputs
            .iter()
            .filter_map(|spec| self.output(spec.name).map(|value| (spec.name, value)))
            .collect()
    }
}
