// tests/client_flows.rs
//! End-to-end client flows against the in-crate transports.

use notion_api::mock::{MockServer, StubTransport};
use notion_api::{
    Block, ClientConfig, NotionClient, NotionError, Page, PropertyValue, ResourceKind, User,
};
use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;

fn fixture(name: &str) -> Value {
    let raw = match name {
        "users_list" => include_str!("fixtures/api_responses/users_list.json"),
        "block_children" => include_str!("fixtures/api_responses/block_children.json"),
        "page_with_properties" => include_str!("fixtures/api_responses/page_with_properties.json"),
        other => panic!("unknown fixture {}", other),
    };
    serde_json::from_str(raw).expect("fixture is valid JSON")
}

fn stub_client(stub: &Arc<StubTransport>) -> NotionClient {
    NotionClient::with_transport(stub.clone(), ClientConfig::default())
}

#[test]
fn list_all_users_decodes_person_and_bot() {
    let stub = Arc::new(StubTransport::new());
    stub.respond(Method::GET, "^/v1/users$", 200, fixture("users_list"));

    let users = stub_client(&stub).list_all_users().unwrap();

    assert_eq!(users.len(), 2);
    assert!(users[0].is_person());
    assert_eq!(users[0].email(), Some("foo@example.com"));
    assert_eq!(users[0].to_string(), "Foo Bar <foo@example.com>");
    assert!(users[1].is_bot());
    assert_eq!(
        users[1].bot_details().and_then(|b| b.workspace_name.as_deref()),
        Some("Test Workspace")
    );
    assert_eq!(stub.requests().len(), 1);
}

#[test]
fn list_all_users_through_mock_server() {
    let server = Arc::new(MockServer::new());
    server
        .add_user(User::person(
            "d40e767c-d7af-4b18-a86d-55c61f1e39a4",
            "Foo Bar",
            Some("foo@example.com".to_string()),
        ))
        .bot_user("Doug Engelbot");
    let client = server.authenticated_client("Doug Engelbot").unwrap();

    let users = client.list_all_users().unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id(), "d40e767c-d7af-4b18-a86d-55c61f1e39a4");
    assert_eq!(users[0].email(), Some("foo@example.com"));
    assert!(users[1].is_bot());
    assert_eq!(users[1].name.as_deref(), Some("Doug Engelbot"));

    let found = client.get_user(users[0].id()).unwrap();
    assert_eq!(found, users[0]);
}

#[test]
fn pagination_issues_one_request_per_page() {
    let stub = Arc::new(StubTransport::new());
    let pages = [
        json!({"object": "list", "results": [{"object": "block", "id": "b1", "type": "divider", "divider": {}}], "next_cursor": "b2", "has_more": true}),
        json!({"object": "list", "results": [{"object": "block", "id": "b2", "type": "divider", "divider": {}}], "next_cursor": "b3", "has_more": true}),
        json!({"object": "list", "results": [{"object": "block", "id": "b3", "type": "divider", "divider": {}}], "next_cursor": null, "has_more": false}),
    ];
    for page in pages {
        stub.respond(Method::GET, "^/v1/blocks/parent/children$", 200, page);
    }

    let blocks = stub_client(&stub).list_block_children("parent").unwrap();

    assert_eq!(
        blocks.iter().map(Block::id).collect::<Vec<_>>(),
        vec!["b1", "b2", "b3"]
    );
    let requests = stub.requests();
    assert_eq!(requests.len(), 3);
    let cursors: Vec<Option<String>> = requests
        .iter()
        .map(|r| r.query_param("start_cursor"))
        .collect();
    assert_eq!(
        cursors,
        vec![None, Some("b2".to_string()), Some("b3".to_string())]
    );
    assert!(requests
        .iter()
        .all(|r| r.query_param("page_size").as_deref() == Some("100")));
}

#[test]
fn block_children_keep_unknown_kinds() {
    let stub = Arc::new(StubTransport::new());
    stub.respond(Method::GET, "^/v1/blocks/page/children$", 200, fixture("block_children"));

    let blocks = stub_client(&stub).list_block_children("page").unwrap();

    let types: Vec<&str> = blocks.iter().map(Block::block_type).collect();
    assert_eq!(
        types,
        vec!["heading_2", "paragraph", "bulleted_list_item", "code", "ai_block"]
    );
    assert!(blocks[4].is_unsupported());
    assert!(blocks[..4].iter().all(|b| !b.is_unsupported()));
}

#[test]
fn not_found_on_get_database_is_scoped() {
    let stub = Arc::new(StubTransport::new());
    stub.respond(
        Method::GET,
        "^/v1/databases/",
        404,
        json!({"object": "error", "status": 404, "code": "object_not_found", "message": "Could not find database"}),
    );

    let err = stub_client(&stub).get_database("missing").unwrap_err();

    assert!(matches!(
        err,
        NotionError::NotFound {
            resource: ResourceKind::Database,
            ..
        }
    ));
    assert!(err.is_not_found());
}

#[test]
fn rate_limit_on_query_aborts_walk() {
    let stub = Arc::new(StubTransport::new());
    stub.respond(
        Method::POST,
        "^/v1/databases/db/query$",
        200,
        json!({"object": "list", "results": [{"object": "page", "id": "p1", "properties": {}}], "next_cursor": "p2", "has_more": true}),
    )
    .respond_raw(Method::POST, "^/v1/databases/db/query$", 429, "");

    let err = stub_client(&stub)
        .query_database("db", None, &[])
        .unwrap_err();

    assert!(matches!(err, NotionError::RateLimited(None)));
    assert!(err.is_rate_limited());
    assert_eq!(stub.requests().len(), 2);
}

#[test]
fn validation_error_on_create_page_is_structured() {
    let stub = Arc::new(StubTransport::new());
    stub.respond(
        Method::POST,
        "^/v1/pages$",
        400,
        json!({
            "object": "error",
            "status": 400,
            "code": "validation_error",
            "message": "body failed validation: body.properties.Name.title should be defined."
        }),
    );
    let mut page = Page::default();
    page.parent = Some(notion_api::Parent::database("db"));

    let err = stub_client(&stub).create_page(&page).unwrap_err();

    match err {
        NotionError::Api(body) => {
            assert_eq!(body.status, 400);
            assert_eq!(body.code, notion_api::ErrorCode::ValidationError);
            assert!(body.message.starts_with("body failed validation"));
        }
        other => panic!("expected a structured error, got {:?}", other),
    }
}

#[test]
fn derived_template_round_trips_through_create() {
    let stub = Arc::new(StubTransport::new());
    stub.respond(
        Method::GET,
        "^/v1/pages/59833787-2cf9-4fdf-8782-e53db20768a5$",
        200,
        fixture("page_with_properties"),
    )
    .respond(
        Method::POST,
        "^/v1/pages$",
        200,
        json!({"object": "page", "id": "new-page", "properties": {}}),
    );
    let client = stub_client(&stub);

    let source = client
        .get_page("59833787-2cf9-4fdf-8782-e53db20768a5")
        .unwrap();
    let created = client.create_page(&source.derive_template().unwrap()).unwrap();
    assert_eq!(created.id(), "new-page");

    let sent: Value =
        serde_json::from_str(stub.requests()[1].body.as_deref().unwrap()).unwrap();
    assert_eq!(
        sent["parent"],
        json!({"type": "database_id", "database_id": "d9824bdc-8445-4327-be8b-5b47500af6ce"})
    );
    assert!(sent.get("id").is_none());
    assert!(sent.get("created_time").is_none());
    assert!(sent["properties"].get("Created by").is_none());
    assert_eq!(sent["properties"]["Price"]["number"], json!(2.5));
    assert!(matches!(
        source.properties["Price"].value,
        PropertyValue::Number { number: Some(_) }
    ));
}
