// src/mock/server.rs
//! In-memory stand-in for the users and databases endpoints.

use super::{error_response, json_response};
use crate::api::{ApiRequest, ApiResponse, NotionClient, Transport};
use crate::config::ClientConfig;
use crate::constants::{DEFAULT_PAGE_SIZE, NOTION_VERSION, NOTION_VERSION_HEADER};
use crate::error::{ErrorCode, Result};
use crate::model::{Bot, Database, ObjectKind, PaginatedResponse, Parent, User};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::Rng;
use regex::Regex;
use reqwest::{Method, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

const SECRET_SEED: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SECRET_LENGTH: usize = 43;

const UUID_PATTERN: &str =
    "[0-9a-f]{8}-?[0-9a-f]{4}-?[0-9a-f]{4}-?[0-9a-f]{4}-?[0-9a-f]{12}";

static USERS: Lazy<Regex> = Lazy::new(|| route_regex(r"^/v1/users$"));
static USERS_ME: Lazy<Regex> = Lazy::new(|| route_regex(r"^/v1/users/me$"));
static USER: Lazy<Regex> = Lazy::new(|| route_regex(&format!(r"^/v1/users/({})$", UUID_PATTERN)));
static DATABASES: Lazy<Regex> = Lazy::new(|| route_regex(r"^/v1/databases$"));
static DATABASE: Lazy<Regex> =
    Lazy::new(|| route_regex(&format!(r"^/v1/databases/({})$", UUID_PATTERN)));

fn route_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Failed to compile mock route regex - this is a bug in the code")
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    ListUsers,
    GetMe,
    GetUser(String),
    CreateDatabase,
    GetDatabase(String),
    UpdateDatabase(String),
}

impl Route {
    fn resolve(method: &Method, path: &str) -> Option<Self> {
        let captured = |re: &Regex| {
            re.captures(path)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        };

        if *method == Method::GET {
            if USERS.is_match(path) {
                Some(Route::ListUsers)
            } else if USERS_ME.is_match(path) {
                Some(Route::GetMe)
            } else {
                captured(&USER)
                    .map(Route::GetUser)
                    .or_else(|| captured(&DATABASE).map(Route::GetDatabase))
            }
        } else if *method == Method::POST && DATABASES.is_match(path) {
            Some(Route::CreateDatabase)
        } else if *method == Method::PATCH {
            captured(&DATABASE).map(Route::UpdateDatabase)
        } else {
            None
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    users: Vec<User>,
    databases: Vec<Database>,
    /// Token to the id of the bot user it authenticates.
    tokens: HashMap<String, String>,
}

/// A fake workspace answering the users and databases endpoints.
///
/// Requests must carry a token from [`MockServer::generate_bot_token`] and
/// the `Notion-Version` header; otherwise the service's own error bodies
/// are returned.
///
/// ```
/// use notion_api::mock::MockServer;
/// use std::sync::Arc;
///
/// let server = Arc::new(MockServer::new());
/// server.user("Ada").bot_user("Robot");
/// let client = server.authenticated_client("Robot").unwrap();
/// assert_eq!(client.list_all_users().unwrap().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockServer {
    state: Mutex<MockState>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a person.
    pub fn user(&self, name: &str) -> &Self {
        self.add_user(User::person(new_id(), name, None))
    }

    /// Adds an integration.
    pub fn bot_user(&self, name: &str) -> &Self {
        self.add_user(User::bot(new_id(), name, Bot::default()))
    }

    pub fn add_user(&self, user: User) -> &Self {
        self.state.lock().users.push(user);
        self
    }

    /// Adds `database`, assigning an id when it has none.
    pub fn database(&self, mut database: Database) -> &Self {
        if database.meta.id.is_empty() {
            database.meta.id = new_id();
        }
        database.meta.object = Some(ObjectKind::Database);
        self.state.lock().databases.push(database);
        self
    }

    /// Creates a database titled `title` under a fresh page and returns it.
    pub fn new_database(&self, title: &str) -> Database {
        let mut database = Database::new(Parent::page(new_id()), title);
        database.meta.id = new_id();
        self.database(database.clone());
        database
    }

    pub fn find_user(&self, name: &str) -> Option<User> {
        self.state
            .lock()
            .users
            .iter()
            .find(|user| user.name.as_deref() == Some(name))
            .cloned()
    }

    /// Every database whose plain title is `title`.
    pub fn find_database(&self, title: &str) -> Vec<Database> {
        self.state
            .lock()
            .databases
            .iter()
            .filter(|db| db.plain_title() == title)
            .cloned()
            .collect()
    }

    /// Issues a new token for the user named `bot_name`.
    pub fn generate_bot_token(&self, bot_name: &str) -> Option<String> {
        let mut state = self.state.lock();
        let bot_id = state
            .users
            .iter()
            .find(|user| user.name.as_deref() == Some(bot_name))?
            .id()
            .to_string();

        let mut rng = rand::rng();
        let secret: String = (0..SECRET_LENGTH)
            .map(|_| SECRET_SEED[rng.random_range(0..SECRET_SEED.len())] as char)
            .collect();
        let token = format!("secret_{}", secret);
        state.tokens.insert(token.clone(), bot_id);
        Some(token)
    }

    /// A transport that sends every request with `token`.
    pub fn transport(self: &Arc<Self>, token: &str) -> MockTransport {
        MockTransport {
            server: Arc::clone(self),
            token: token.to_string(),
        }
    }

    /// A client authenticated as the bot named `bot_name`.
    pub fn authenticated_client(self: &Arc<Self>, bot_name: &str) -> Option<NotionClient> {
        let token = self.generate_bot_token(bot_name)?;
        Some(NotionClient::with_transport(
            Arc::new(self.transport(&token)),
            ClientConfig::default(),
        ))
    }

    /// Answers one request.
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse<String> {
        let url = request.url.to_string();
        let Some(route) = Route::resolve(&request.method, request.path()) else {
            return error_response(
                url,
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidRequestUrl,
                "Invalid request URL.".to_string(),
            );
        };

        let mut state = self.state.lock();
        let Some(caller) = bearer_token(request).and_then(|t| state.tokens.get(t)).cloned() else {
            return error_response(
                url,
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                "API token is invalid.".to_string(),
            );
        };
        if request.header(NOTION_VERSION_HEADER) != Some(NOTION_VERSION) {
            return error_response(
                url,
                StatusCode::BAD_REQUEST,
                ErrorCode::MissingVersion,
                format!(
                    "Notion-Version header failed validation: Notion-Version header should be defined, instead was `{}`.",
                    request.header(NOTION_VERSION_HEADER).unwrap_or("undefined")
                ),
            );
        }

        log::debug!("mock {} {}", request.method, request.path());
        match route {
            Route::ListUsers => match paginate(request, &state.users, User::id) {
                Ok(page) => json_response(url, StatusCode::OK, &page),
                Err(cursor) => error_response(
                    url,
                    StatusCode::BAD_REQUEST,
                    ErrorCode::ValidationError,
                    format!("start_cursor provided is invalid: {}", cursor),
                ),
            },
            Route::GetMe => match state.users.iter().find(|u| u.id() == caller) {
                Some(user) => json_response(url, StatusCode::OK, user),
                None => user_not_found(url, &caller),
            },
            Route::GetUser(id) => match state.users.iter().find(|u| u.id() == id) {
                Some(user) => json_response(url, StatusCode::OK, user),
                None => user_not_found(url, &id),
            },
            Route::CreateDatabase => {
                let Some(mut database) = decode_request::<Database>(request) else {
                    return invalid_json(url);
                };
                database.meta.id = new_id();
                database.meta.object = Some(ObjectKind::Database);
                state.databases.push(database.clone());
                json_response(url, StatusCode::OK, &database)
            }
            Route::GetDatabase(id) => match state.databases.iter().find(|db| db.id() == id) {
                Some(database) => json_response(url, StatusCode::OK, database),
                None => database_not_found(url, &id),
            },
            Route::UpdateDatabase(id) => {
                let Some(stored) = state.databases.iter_mut().find(|db| db.id() == id) else {
                    return database_not_found(url, &id);
                };
                let Some(mut updated) = decode_request::<Database>(request) else {
                    return invalid_json(url);
                };
                updated.meta = stored.meta.clone();
                updated.parent = stored.parent.clone();
                *stored = updated;
                json_response(url, StatusCode::OK, &*stored)
            }
        }
    }
}

/// `Transport` bound to a `MockServer` and a token.
#[derive(Debug, Clone)]
pub struct MockTransport {
    server: Arc<MockServer>,
    token: String,
}

impl Transport for MockTransport {
    fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse<String>> {
        request
            .headers
            .push(("Authorization".to_string(), format!("Bearer {}", self.token)));
        Ok(self.server.handle(&request))
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn bearer_token(request: &ApiRequest) -> Option<&str> {
    request.header("authorization")?.strip_prefix("Bearer ")
}

fn decode_request<T: serde::de::DeserializeOwned>(request: &ApiRequest) -> Option<T> {
    serde_json::from_str(request.body.as_deref()?).ok()
}

/// Slices `items` the way the service does: the cursor is the id of the
/// first item of the next page.
/// Slices `items` by `start_cursor`/`page_size`. Errs with the cursor when
/// it names no item.
fn paginate<T: Clone>(
    request: &ApiRequest,
    items: &[T],
    id_of: impl Fn(&T) -> &str,
) -> Result<PaginatedResponse<T>, String> {
    let page_size = request
        .query_param("page_size")
        .and_then(|size| size.parse::<usize>().ok())
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    let start = match request.query_param("start_cursor") {
        Some(cursor) => items
            .iter()
            .position(|item| id_of(item) == cursor)
            .ok_or(cursor)?,
        None => 0,
    };

    let end = (start + page_size).min(items.len());
    let next_cursor = items.get(end).map(|item| id_of(item).to_string());
    Ok(PaginatedResponse::new(items[start..end].to_vec(), next_cursor))
}

fn invalid_json(url: String) -> ApiResponse<String> {
    error_response(
        url,
        StatusCode::BAD_REQUEST,
        ErrorCode::InvalidJson,
        "Error parsing JSON body.".to_string(),
    )
}

fn user_not_found(url: String, id: &str) -> ApiResponse<String> {
    error_response(
        url,
        StatusCode::NOT_FOUND,
        ErrorCode::ObjectNotFound,
        format!("Could not find user with ID: {}.", id),
    )
}

fn database_not_found(url: String, id: &str) -> ApiResponse<String> {
    error_response(
        url,
        StatusCode::NOT_FOUND,
        ErrorCode::ObjectNotFound,
        format!(
            "Could not find database with ID: {}. Make sure the relevant pages and databases are shared with your integration.",
            id
        ),
    )
}
