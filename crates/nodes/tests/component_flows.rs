//! End-to-end component flows driven the way a hosting engine drives them:
//! components built by kind name, inputs set by port name, one shared context.

use std::sync::Arc;

use nodes::{instantiate, Authorize, CreateIssue, GetIssue, ListIssues, ListPullRequests, Workflow};
use pipeline::testing::{InMemoryForge, InMemorySessionFactory, IssuedSession};
use pipeline::{Component, ExecutionContext, NodeId, PortValue, SessionFactory, GITHUB_CLIENT_KEY};

fn id(name: &str) -> NodeId {
    NodeId::new(name).unwrap()
}

fn text(value: &str) -> PortValue {
    PortValue::String(value.to_owned())
}

#[tokio::test]
async fn second_authorize_reuses_the_context_client() {
    let forge = InMemoryForge::new();
    let factory = Arc::new(InMemorySessionFactory::new(forge, Some("env-token")));
    let shared: Arc<dyn SessionFactory> = factory.clone();

    let mut first = instantiate(Authorize::KIND, id("first"), &shared).unwrap();
    first.set_input("token", text("abc")).unwrap();
    let second = instantiate(Authorize::KIND, id("second"), &shared).unwrap();

    let mut workflow = Workflow::new();
    workflow.push(first).unwrap();
    workflow.push(second).unwrap();

    let mut ctx = ExecutionContext::new();
    workflow.run(&mut ctx).await.unwrap();

    let stored = ctx.get(GITHUB_CLIENT_KEY).cloned().unwrap();
    assert_eq!(workflow.node(&id("first")).unwrap().output("client"), Some(stored.clone()));
    assert_eq!(workflow.node(&id("second")).unwrap().output("client"), Some(stored));
    assert_eq!(factory.issued(), vec![IssuedSession::Token("abc".into())]);
}

#[tokio::test]
async fn created_issue_reads_back_with_the_same_title_and_body() {
    let forge = InMemoryForge::new();
    forge.add_repository("octo/hello", &[]);
    let factory: Arc<dyn SessionFactory> = Arc::new(InMemorySessionFactory::new(forge, None));

    let mut create = instantiate(CreateIssue::KIND, id("create"), &factory).unwrap();
    create.set_input("repo_name", text("octo/hello")).unwrap();
    create.set_input("title", text("Crash on start")).unwrap();
    create.set_input("body", text("Stack trace attached")).unwrap();

    let mut workflow = Workflow::new();
    workflow.push(instantiate(Authorize::KIND, id("auth"), &factory).unwrap()).unwrap();
    workflow.push(create).unwrap();
    let mut ctx = ExecutionContext::new();
    workflow.run(&mut ctx).await.unwrap();

    let created = workflow.node(&id("create")).unwrap().output("issue").unwrap().to_json();
    let number = created["number"].as_i64().unwrap();

    let mut get = instantiate(GetIssue::KIND, id("get"), &factory).unwrap();
    get.set_input("repo_name", text("octo/hello")).unwrap();
    get.set_input("issue_number", PortValue::Integer(number)).unwrap();
    get.execute(&mut ctx).await.unwrap();

    let fetched = get.output("issue").unwrap().to_json();
    assert_eq!(fetched["title"], "Crash on start");
    assert_eq!(fetched["body"], "Stack trace attached");
}

#[tokio::test]
async fn lists_of_an_empty_repository_are_empty() {
    let forge = InMemoryForge::new();
    forge.add_repository("octo/empty", &["main"]);
    let mut ctx = ExecutionContext::new();
    ctx.set_client(Arc::new(forge));

    let mut issues = ListIssues::new(id("issues"));
    issues.repo_name.set("octo/empty".into());
    issues.execute(&mut ctx).await.unwrap();
    assert_eq!(issues.output("issues"), Some(PortValue::ListOfString(vec![])));

    let mut pulls = ListPullRequests::new(id("pulls"));
    pulls.repo_name.set("octo/empty".into());
    pulls.execute(&mut ctx).await.unwrap();
    assert_eq!(pulls.output("pull_requests"), Some(PortValue::ListOfString(vec![])));
}

#[tokio::test]
async fn wrongly_typed_input_is_rejected_by_name() {
    let factory: Arc<dyn SessionFactory> =
        Arc::new(InMemorySessionFactory::new(InMemoryForge::new(), None));
    let mut get = instantiate(GetIssue::KIND, id("get"), &factory).unwrap();

    let err = get.set_input("issue_number", text("seven")).unwrap_err();
    assert_eq!(err.to_string(), "Port 'issue_number' expects integer, got string");
}
