// src/api/client.rs
//! Blocking client for the Notion REST API.
//!
//! Every operation composes an `ApiRequest`, hands it to the configured
//! `Transport`, and routes the response through the parser. List
//! operations walk the cursor until the service reports no more results.

use super::pagination::fetch_all_pages;
use super::parser::{decode_value, encode_body, parse_api_response, Endpoint};
use super::transport::{ApiRequest, HttpTransport, Transport};
use crate::config::ClientConfig;
use crate::constants::{NOTION_VERSION, NOTION_VERSION_HEADER};
use crate::error::{ResourceKind, Result};
use crate::model::{
    is_false, Block, BlockContent, Database, Filter, PaginatedResponse, Page, Parent,
    PropertyData, PropertyMetadata, RichTextItem, SearchFilter, SearchResult, SearchSort, Sort,
    User,
};
use crate::types::{ApiKey, ValidationError};
use indexmap::IndexMap;
use reqwest::{header, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use url::Url;

const GET_USER: Endpoint = Endpoint::sentinel("get user", ResourceKind::User);
const LIST_USERS: Endpoint = Endpoint::sentinel("list users", ResourceKind::User);
const GET_ME: Endpoint = Endpoint::structured("get bot user", ResourceKind::User);
const LIST_DATABASES: Endpoint = Endpoint::sentinel("list databases", ResourceKind::Database);
const GET_DATABASE: Endpoint = Endpoint::sentinel("get database", ResourceKind::Database);
const CREATE_DATABASE: Endpoint = Endpoint::structured("create database", ResourceKind::Database);
const UPDATE_DATABASE: Endpoint = Endpoint::structured("update database", ResourceKind::Database);
const QUERY_DATABASE: Endpoint = Endpoint::sentinel("query database", ResourceKind::Database);
const GET_PAGE: Endpoint = Endpoint::sentinel("get page", ResourceKind::Page);
const CREATE_PAGE: Endpoint = Endpoint::structured("create page", ResourceKind::Page);
const UPDATE_PAGE: Endpoint = Endpoint::structured("update page properties", ResourceKind::Page);
const GET_PAGE_PROPERTY: Endpoint = Endpoint::structured("get page property", ResourceKind::Page);
const GET_BLOCK: Endpoint = Endpoint::sentinel("get block", ResourceKind::Block);
const UPDATE_BLOCK: Endpoint = Endpoint::structured("update block", ResourceKind::Block);
const DELETE_BLOCK: Endpoint = Endpoint::structured("delete block", ResourceKind::Block);
const LIST_CHILDREN: Endpoint = Endpoint::sentinel("list block children", ResourceKind::Block);
const APPEND_CHILDREN: Endpoint = Endpoint::structured("append block children", ResourceKind::Block);
const SEARCH: Endpoint = Endpoint::structured("search", ResourceKind::Page);

/// Property types whose item endpoint returns one run or reference per list entry.
const LIST_PROPERTY_TYPES: [&str; 4] = ["title", "rich_text", "relation", "people"];

/// A Notion API client.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct NotionClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    /// Creates a client for the public API authenticated with `api_key`.
    pub fn new(api_key: &ApiKey) -> Result<Self> {
        Self::with_config(api_key, ClientConfig::default())
    }

    pub fn with_config(api_key: &ApiKey, config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(api_key)?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Creates a client over any transport, e.g. the in-memory mock.
    pub fn with_transport(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // --- Users ---

    pub fn get_user(&self, user_id: &str) -> Result<User> {
        let url = self.endpoint(&["users", require_id(user_id, "user id")?])?;
        self.execute(Method::GET, url, None, GET_USER)
    }

    /// Lists every user of the workspace.
    pub fn list_all_users(&self) -> Result<Vec<User>> {
        self.get_all(&["users"], LIST_USERS)
    }

    /// The bot user behind the current token.
    pub fn get_me(&self) -> Result<User> {
        let url = self.endpoint(&["users", "me"])?;
        self.execute(Method::GET, url, None, GET_ME)
    }

    // --- Databases ---

    /// Lists the databases shared with the integration.
    pub fn list_databases(&self) -> Result<Vec<Database>> {
        self.get_all(&["databases"], LIST_DATABASES)
    }

    pub fn get_database(&self, database_id: &str) -> Result<Database> {
        let url = self.endpoint(&["databases", require_id(database_id, "database id")?])?;
        self.execute(Method::GET, url, None, GET_DATABASE)
    }

    /// Creates `database` under its parent page and returns the stored copy.
    pub fn create_database(&self, database: &Database) -> Result<Database> {
        let body = CreateDatabaseBody {
            parent: database.parent.as_ref(),
            title: &database.title,
            description: &database.description,
            properties: &database.properties,
            is_inline: database.is_inline,
        };
        let url = self.endpoint(&["databases"])?;
        self.send_json(Method::POST, url, &body, CREATE_DATABASE)
    }

    /// Writes the title, description and schema of an existing database.
    pub fn update_database(&self, database: &Database) -> Result<Database> {
        let body = UpdateDatabaseBody {
            title: &database.title,
            description: &database.description,
            properties: &database.properties,
        };
        let url = self.endpoint(&["databases", require_id(database.id(), "database id")?])?;
        self.send_json(Method::PATCH, url, &body, UPDATE_DATABASE)
    }

    /// Returns every page of a database matching `filter`, ordered by `sorts`.
    pub fn query_database(
        &self,
        database_id: &str,
        filter: Option<&Filter>,
        sorts: &[Sort],
    ) -> Result<Vec<Page>> {
        let body = QueryBody { filter, sorts };
        let id = require_id(database_id, "database id")?;
        self.post_all(&["databases", id, "query"], &body, QUERY_DATABASE)
    }

    // --- Pages ---

    pub fn get_page(&self, page_id: &str) -> Result<Page> {
        let url = self.endpoint(&["pages", require_id(page_id, "page id")?])?;
        self.execute(Method::GET, url, None, GET_PAGE)
    }

    /// Creates `page` under its parent and returns the stored copy.
    ///
    /// Only the parent, the properties and the initial children are sent.
    pub fn create_page(&self, page: &Page) -> Result<Page> {
        let body = CreatePageBody {
            parent: page.parent.as_ref(),
            properties: &page.properties,
            children: &page.children,
        };
        let url = self.endpoint(&["pages"])?;
        self.send_json(Method::POST, url, &body, CREATE_PAGE)
    }

    /// Writes `properties` onto a page; keys absent from the map are untouched.
    pub fn update_page_properties(
        &self,
        page_id: &str,
        properties: &IndexMap<String, PropertyData>,
    ) -> Result<Page> {
        let body = PropertiesBody { properties };
        let url = self.endpoint(&["pages", require_id(page_id, "page id")?])?;
        self.send_json(Method::PATCH, url, &body, UPDATE_PAGE)
    }

    /// Reads one property of a page.
    ///
    /// Single-valued properties come back as one item. List-valued ones
    /// (title, rich text, relation, people) are paginated by the service
    /// and come back as one item per run or reference.
    pub fn get_page_property(&self, page_id: &str, property_id: &str) -> Result<Vec<PropertyData>> {
        let page_id = require_id(page_id, "page id")?;
        let property_id = require_id(property_id, "property id")?;
        let operation = GET_PAGE_PROPERTY.operation;

        fetch_all_pages(operation, |cursor| {
            let url = self.paged_url(&["pages", page_id, "properties", property_id], cursor)?;
            let value: Value = self.execute(Method::GET, url, None, GET_PAGE_PROPERTY)?;

            if value.get("object").and_then(Value::as_str) != Some("list") {
                let item = decode_value(value, operation)?;
                return Ok(PaginatedResponse::new(vec![item], None));
            }

            let page: PaginatedResponse<Value> = decode_value(value, operation)?;
            let results = page
                .results
                .into_iter()
                .map(|item| decode_value(wrap_list_item(item), operation))
                .collect::<Result<Vec<PropertyData>>>()?;
            Ok(PaginatedResponse {
                object: page.object,
                results,
                next_cursor: page.next_cursor,
                has_more: page.has_more,
            })
        })
    }

    // --- Blocks ---

    pub fn get_block(&self, block_id: &str) -> Result<Block> {
        let url = self.endpoint(&["blocks", require_id(block_id, "block id")?])?;
        self.execute(Method::GET, url, None, GET_BLOCK)
    }

    /// Writes the content and archived flag of an existing block.
    pub fn update_block(&self, block: &Block) -> Result<Block> {
        let body = UpdateBlockBody {
            content: &block.content,
            archived: block.common.archived,
        };
        let url = self.endpoint(&["blocks", require_id(block.id(), "block id")?])?;
        self.send_json(Method::PATCH, url, &body, UPDATE_BLOCK)
    }

    /// Archives a block; the service returns it with `archived` set.
    pub fn delete_block(&self, block_id: &str) -> Result<Block> {
        let url = self.endpoint(&["blocks", require_id(block_id, "block id")?])?;
        self.execute(Method::DELETE, url, None, DELETE_BLOCK)
    }

    /// Lists the direct children of a page or block.
    pub fn list_block_children(&self, block_id: &str) -> Result<Vec<Block>> {
        let id = require_id(block_id, "block id")?;
        self.get_all(&["blocks", id, "children"], LIST_CHILDREN)
    }

    /// Appends `children` to a page or block and returns the created blocks.
    pub fn append_block_children(&self, block_id: &str, children: &[Block]) -> Result<Vec<Block>> {
        let body = ChildrenBody { children };
        let url = self.endpoint(&["blocks", require_id(block_id, "block id")?, "children"])?;
        let response: PaginatedResponse<Block> =
            self.send_json(Method::PATCH, url, &body, APPEND_CHILDREN)?;
        Ok(response.results)
    }

    // --- Search ---

    /// Searches page and database titles. `None` matches everything shared
    /// with the integration.
    pub fn search(
        &self,
        query: Option<&str>,
        filter: Option<&SearchFilter>,
        sort: Option<&SearchSort>,
    ) -> Result<Vec<SearchResult>> {
        let body = SearchBody {
            query,
            filter,
            sort,
        };
        self.post_all(&["search"], &body, SEARCH)
    }

    // --- Request plumbing ---

    /// Joins `segments` onto the base URL; each segment is percent-encoded,
    /// so identifiers can never introduce extra path components.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ValidationError::InvalidUrl {
                    url: self.config.base_url.to_string(),
                    reason: "cannot be a base".to_string(),
                }
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn paged_url(&self, segments: &[&str], cursor: Option<&str>) -> Result<Url> {
        let mut url = self.endpoint(segments)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page_size", &self.config.page_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("start_cursor", cursor);
            }
        }
        Ok(url)
    }

    fn build_request(&self, method: Method, url: Url, body: Option<String>) -> ApiRequest {
        let mut headers = vec![
            (NOTION_VERSION_HEADER.to_string(), NOTION_VERSION.to_string()),
            (
                header::USER_AGENT.as_str().to_string(),
                self.config.user_agent.clone(),
            ),
        ];
        if body.is_some() {
            headers.push((
                header::CONTENT_TYPE.as_str().to_string(),
                "application/json".to_string(),
            ));
        }
        ApiRequest {
            method,
            url,
            headers,
            body,
        }
    }

    fn execute<T>(&self, method: Method, url: Url, body: Option<String>, endpoint: Endpoint) -> Result<T>
    where
        T: DeserializeOwned,
    {
        log::debug!("{} {}", method, url);
        let request = self.build_request(method, url, body);
        let response = self.transport.execute(request)?;
        parse_api_response(response, endpoint)
    }

    fn send_json<B, T>(&self, method: Method, url: Url, body: &B, endpoint: Endpoint) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode_body(body, endpoint.operation)?;
        self.execute(method, url, Some(body), endpoint)
    }

    fn get_all<T>(&self, segments: &[&str], endpoint: Endpoint) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        fetch_all_pages(endpoint.operation, |cursor| {
            let url = self.paged_url(segments, cursor)?;
            self.execute(Method::GET, url, None, endpoint)
        })
    }

    /// Like `get_all`, but the cursor travels in a JSON body next to `body`.
    fn post_all<B, T>(&self, segments: &[&str], body: &B, endpoint: Endpoint) -> Result<Vec<T>>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        fetch_all_pages(endpoint.operation, |cursor| {
            let paged = PagedBody {
                inner: body,
                page_size: self.config.page_size,
                start_cursor: cursor,
            };
            self.send_json(Method::POST, url.clone(), &paged, endpoint)
        })
    }
}

fn require_id<'a>(id: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    if id.trim().is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(id)
    }
}

/// Turns a list entry like `{"type": "title", "title": {..}}` into the
/// array form the property model expects.
fn wrap_list_item(mut item: Value) -> Value {
    let tag = match item.get("type").and_then(Value::as_str) {
        Some(tag) if LIST_PROPERTY_TYPES.contains(&tag) => tag.to_string(),
        _ => return item,
    };
    if let Some(payload) = item.get_mut(&tag) {
        if !payload.is_array() {
            let single = payload.take();
            *payload = Value::Array(vec![single]);
        }
    }
    item
}

fn is_empty_slice<T>(items: &&[T]) -> bool {
    items.is_empty()
}

#[derive(Serialize)]
struct PagedBody<'a, B> {
    #[serde(flatten)]
    inner: &'a B,
    page_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<&'a str>,
}

#[derive(Serialize)]
struct QueryBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a Filter>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    sorts: &'a [Sort],
}

#[derive(Serialize)]
struct SearchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a SearchFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<&'a SearchSort>,
}

#[derive(Serialize)]
struct CreateDatabaseBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<&'a Parent>,
    title: &'a [RichTextItem],
    #[serde(skip_serializing_if = "is_empty_slice")]
    description: &'a [RichTextItem],
    properties: &'a IndexMap<String, PropertyMetadata>,
    #[serde(skip_serializing_if = "is_false")]
    is_inline: bool,
}

#[derive(Serialize)]
struct UpdateDatabaseBody<'a> {
    title: &'a [RichTextItem],
    #[serde(skip_serializing_if = "is_empty_slice")]
    description: &'a [RichTextItem],
    properties: &'a IndexMap<String, PropertyMetadata>,
}

#[derive(Serialize)]
struct CreatePageBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<&'a Parent>,
    properties: &'a IndexMap<String, PropertyData>,
    #[serde(skip_serializing_if = "is_empty_slice")]
    children: &'a [Block],
}

#[derive(Serialize)]
struct PropertiesBody<'a> {
    properties: &'a IndexMap<String, PropertyData>,
}

#[derive(Serialize)]
struct UpdateBlockBody<'a> {
    #[serde(flatten)]
    content: &'a BlockContent,
    #[serde(skip_serializing_if = "is_false")]
    archived: bool,
}

#[derive(Serialize)]
struct ChildrenBody<'a> {
    children: &'a [Block],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotionError;
    use crate::mock::StubTransport;
    use crate::model::{PropertyValue, SearchObject, SortDirection};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn client(stub: &Arc<StubTransport>) -> NotionClient {
        NotionClient::with_transport(stub.clone(), ClientConfig::default())
    }

    #[test]
    fn identifiers_are_encoded_as_single_segments() {
        let stub = Arc::new(StubTransport::new());
        let client = client(&stub);

        let url = client.endpoint(&["users", "../databases/x?y"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.notion.com/v1/users/..%2Fdatabases%2Fx%3Fy"
        );
    }

    #[test]
    fn empty_identifier_is_rejected_before_sending() {
        let stub = Arc::new(StubTransport::new());
        let err = client(&stub).get_page("  ").unwrap_err();
        assert!(matches!(
            err,
            NotionError::Validation(ValidationError::EmptyField("page id"))
        ));
        assert!(stub.requests().is_empty());
    }

    #[test]
    fn headers_follow_body_presence() {
        let stub = Arc::new(StubTransport::new());
        stub.respond(Method::GET, "^/v1/users/me$", 200, json!({"object": "user", "id": "bot", "type": "bot", "bot": {}}));
        stub.respond(Method::PATCH, "^/v1/pages/p1$", 200, json!({"object": "page", "id": "p1", "properties": {}}));
        let client = client(&stub);

        client.get_me().unwrap();
        let mut properties = IndexMap::new();
        properties.insert("Notes".to_string(), PropertyData::from(PropertyValue::rich_text("hi")));
        client.update_page_properties("p1", &properties).unwrap();

        let requests = stub.requests();
        assert_eq!(requests[0].header("notion-version"), Some("2022-06-28"));
        assert!(requests[0].header("user-agent").is_some());
        assert_eq!(requests[0].header("content-type"), None);
        assert_eq!(requests[1].header("content-type"), Some("application/json"));

        let sent: Value = serde_json::from_str(requests[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["properties"]["Notes"]["type"], "rich_text");
    }

    #[test]
    fn update_block_sends_archived_only_when_set() {
        let stub = Arc::new(StubTransport::new());
        stub.respond(
            Method::PATCH,
            "^/v1/blocks/b1$",
            200,
            json!({"object": "block", "id": "b1", "type": "paragraph", "paragraph": {"rich_text": []}}),
        );
        let client = client(&stub);

        let mut block = Block::paragraph("Kale");
        block.common.meta.id = "b1".to_string();
        client.update_block(&block).unwrap();
        block.common.archived = true;
        client.update_block(&block).unwrap();

        let bodies: Vec<Value> = stub
            .requests()
            .iter()
            .map(|r| serde_json::from_str(r.body.as_deref().unwrap()).unwrap())
            .collect();
        assert_eq!(bodies[0].get("archived"), None);
        assert_eq!(bodies[0]["type"], "paragraph");
        assert_eq!(bodies[1]["archived"], json!(true));
    }

    #[test]
    fn query_body_carries_filter_on_every_page() {
        let stub = Arc::new(StubTransport::new());
        stub.respond(
            Method::POST,
            "^/v1/databases/db/query$",
            200,
            json!({"object": "list", "results": [{"object": "page", "id": "p1", "properties": {}}], "next_cursor": "p2", "has_more": true}),
        );
        stub.respond(
            Method::POST,
            "^/v1/databases/db/query$",
            200,
            json!({"object": "list", "results": [{"object": "page", "id": "p2", "properties": {}}], "next_cursor": null, "has_more": false}),
        );
        let filter = Filter::property(
            "Done",
            crate::model::PropertyCondition::Checkbox(crate::model::CheckboxCondition::Equals(true)),
        );
        let sorts = [Sort::property("Name", SortDirection::Ascending)];

        let pages = client(&stub).query_database("db", Some(&filter), &sorts).unwrap();
        assert_eq!(pages.iter().map(Page::id).collect::<Vec<_>>(), vec!["p1", "p2"]);

        let bodies: Vec<Value> = stub
            .requests()
            .iter()
            .map(|r| serde_json::from_str(r.body.as_deref().unwrap()).unwrap())
            .collect();
        assert_eq!(bodies[0]["filter"], bodies[1]["filter"]);
        assert_eq!(bodies[0]["page_size"], 100);
        assert!(bodies[0].get("start_cursor").is_none());
        assert_eq!(bodies[1]["start_cursor"], "p2");
        assert_eq!(bodies[1]["sorts"][0]["property"], "Name");
    }

    #[test]
    fn page_property_list_items_are_wrapped() {
        let stub = Arc::new(StubTransport::new());
        stub.respond(
            Method::GET,
            "^/v1/pages/p1/properties/title$",
            200,
            json!({
                "object": "list",
                "results": [
                    {"object": "property_item", "id": "title", "type": "title", "title": {"type": "text", "text": {"content": "Hello"}, "plain_text": "Hello"}}
                ],
                "next_cursor": null,
                "has_more": false,
                "property_item": {"id": "title", "type": "title", "title": {}}
            }),
        );
        stub.respond(
            Method::GET,
            "^/v1/pages/p1/properties/num$",
            200,
            json!({"object": "property_item", "id": "num", "type": "number", "number": 2.5}),
        );
        let client = client(&stub);

        let title = client.get_page_property("p1", "title").unwrap();
        assert_eq!(title.len(), 1);
        assert_eq!(title[0].to_string(), "Hello");

        let number = client.get_page_property("p1", "num").unwrap();
        assert_eq!(number[0].value, PropertyValue::Number { number: Some(2.5) });
    }

    #[test]
    fn search_decodes_mixed_results() {
        let stub = Arc::new(StubTransport::new());
        stub.respond(
            Method::POST,
            "^/v1/search$",
            200,
            json!({"object": "list", "results": [
                {"object": "page", "id": "p1", "properties": {}},
                {"object": "database", "id": "d1", "title": [], "properties": {}}
            ], "next_cursor": null, "has_more": false}),
        );

        let results = client(&stub)
            .search(Some("roadmap"), Some(&SearchFilter::only(SearchObject::Database)), None)
            .unwrap();
        assert!(results[0].as_page().is_some());
        assert!(results[1].as_database().is_some());

        let sent: Value = serde_json::from_str(stub.requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["query"], "roadmap");
        assert_eq!(sent["filter"], json!({"property": "object", "value": "database"}));
    }
}
