//! Port plumbing and input coercions shared by every component.

use pipeline::{
    BranchName, ExecutionContext, ForgeSession, InArg, NodeId, PipelineError, RepositoryId,
};

/// Generates the name-addressed parts of [`pipeline::Component`]: `id`,
/// `descriptor`, `set_input` and `output`. Used inside an
/// `impl Component for X` block whose struct has an `id: NodeId` field.
macro_rules! component_ports {
    (
        kind: $kind:expr,
        description: $description:expr,
        inputs: [$($input:ident),* $(,)?],
        outputs: [$($output:ident),* $(,)?] $(,)?
    ) => {
        fn id(&self) -> &pipeline::NodeId {
            &self.id
        }

        fn descriptor(&self) -> pipeline::ComponentDescriptor {
            pipeline::ComponentDescriptor {
                kind: $kind,
                description: $description,
                inputs: vec![$(self.$input.spec()),*],
                outputs: vec![$(self.$output.spec()),*],
            }
        }

        fn set_input(
            &mut self,
            port: &str,
            value: pipeline::PortValue,
        ) -> Result<(), pipeline::PipelineError> {
            $(
                if port == self.$input.name() {
                    return self.$input.accept(value);
                }
            )*
            Err(pipeline::PipelineError::UnknownPort {
                node: self.id.clone(),
                port: port.to_owned(),
            })
        }

        fn output(&self, port: &str) -> Option<pipeline::PortValue> {
            $(
                if port == self.$output.name() {
                    return self.$output.to_port_value();
                }
            )*
            None
        }
    };
}

pub(crate) use component_ports;

/// The session for a per-repository call: the wired `client` port wins,
/// otherwise the one Authorize left in the context.
pub(crate) fn resolve_session(
    node: &NodeId,
    explicit: &InArg<ForgeSession>,
    ctx: &ExecutionContext,
) -> Result<ForgeSession, PipelineError> {
    explicit
        .value()
        .cloned()
        .or_else(|| ctx.client())
        .ok_or_else(|| PipelineError::MissingClient { node: node.clone() })
}

pub(crate) fn repository(
    node: &NodeId,
    port: &InArg<String>,
) -> Result<RepositoryId, PipelineError> {
    let raw = port.require(node)?;
    RepositoryId::new(raw.as_str()).ok_or_else(|| PipelineError::InvalidInput {
        node: node.clone(),
        port: port.name(),
        reason: "repository name must not be empty".to_owned(),
    })
}

pub(crate) fn branch(node: &NodeId, port: &InArg<String>) -> Result<BranchName, PipelineError> {
    let raw = port.require(node)?;
    BranchName::new(raw.as_str()).ok_or_else(|| PipelineError::InvalidInput {
        node: node.clone(),
        port: port.name(),
        reason: "branch name must not be empty".to_owned(),
    })
}

/// Converts a required integer port with `convert` (e.g. `IssueNumber::from_port_integer`).
pub(crate) fn number<T>(
    node: &NodeId,
    port: &InArg<i64>,
    convert: fn(i64) -> Option<T>,
) -> Result<T, PipelineError> {
    let raw = *port.require(node)?;
    convert(raw).ok_or_else(|| PipelineError::InvalidInput {
        node: node.clone(),
        port: port.name(),
        reason: format!("{raw} is not a valid number"),
    })
}

/// Optional text ports default to the empty string.
pub(crate) fn text_or_empty(port: &InArg<String>) -> String {
    port.value().cloned().unwrap_or_default()
}
