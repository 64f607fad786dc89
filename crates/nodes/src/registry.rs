//! Component kinds known to this crate, addressable by their kind name.

use std::sync::Arc;

use pipeline::{Component, ComponentDescriptor, NodeId, PipelineError, SessionFactory};

use crate::{
    AddPullRequestComment, Authorize, CreateIssue, CreatePullRequest, GetIssue, ListIssues,
    ListPullRequests, ReadPullRequestComments,
};

/// Every component kind, in catalogue order.
pub const KINDS: [&str; 8] = [
    Authorize::KIND,
    ListIssues::KIND,
    GetIssue::KIND,
    CreateIssue::KIND,
    ListPullRequests::KIND,
    CreatePullRequest::KIND,
    ReadPullRequestComments::KIND,
    AddPullRequestComment::KIND,
];

/// Builds a component of `kind` named `id`.
///
/// `factory` is only used by [`Authorize`].
pub fn instantiate(
    kind: &str,
    id: NodeId,
    factory: &Arc<dyn SessionFactory>,
) -> Result<Box<dyn Component>, PipelineError> {
    let component: Box<dyn Component> = match kind {
        Authorize::KIND => Box::new(Authorize::new(id, Arc::clone(factory))),
        ListIssues::KIND => Box::new(ListIssues::new(id)),
        GetIssue::KIND => Box::new(GetIssue::new(id)),
        CreateIssue::KIND => Box::new(CreateIssue::new(id)),
        ListPullRequests::KIND => Box::new(ListPullRequests::new(id)),
        CreatePullRequest::KIND => Box::new(CreatePullRequest::new(id)),
        ReadPullRequestComments::KIND => Box::new(ReadPullRequestComments::new(id)),
        AddPullRequestComment::KIND => Box::new(AddPullRequestComment::new(id)),
        other => return Err(PipelineError::UnknownComponent { name: other.to_owned() }),
    };
    Ok(component)
}

/// Port descriptors for every component kind, for a hosting engine's palette.
pub fn catalogue(factory: &Arc<dyn SessionFactory>) -> Vec<ComponentDescriptor> {
    KINDS
        .iter()
        .filter_map(|kind| {
            let id = NodeId::new(*kind)?;
            instantiate(kind, id, factory).ok().map(|c| c.descriptor())
        })
        .collect()
}
