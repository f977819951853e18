// src/config.rs
use crate::constants::{
    API_BASE_PATH, API_BASE_URL, BASE_URL_ENV_VAR, DEFAULT_PAGE_SIZE, USER_AGENT,
};
use crate::error::{NotionError, Result};
use crate::types::ApiKey;
use clap::{Parser, Subcommand};
use url::Url;

/// Immutable settings shared by every call of a `NotionClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub page_size: usize,
    pub user_agent: String,
}

impl ClientConfig {
    /// Config pointing at `base`, with its path forced to `/v1`.
    pub fn with_base_url(base: &str) -> Result<Self> {
        let mut base_url = Url::parse(base)?;
        base_url.set_path(API_BASE_PATH);
        Ok(Self {
            base_url,
            ..Self::default()
        })
    }

    /// Defaults, with the host overridden by `NOTION_BASE_URL` when set.
    pub fn from_env() -> Result<Self> {
        match std::env::var(BASE_URL_ENV_VAR) {
            Ok(base) => Self::with_base_url(&base),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(API_BASE_URL).expect("API_BASE_URL is a valid URL"),
            page_size: DEFAULT_PAGE_SIZE,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Integration token (defaults to the NOTION_API_KEY environment variable)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Override the API host (the path is always /v1)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show one user
    GetUser { id: String },
    /// List every user of the workspace
    ListUsers,
    /// Show the bot user behind the token
    Me,
    /// List the databases shared with the integration
    ListDatabases,
    /// Show a database schema
    GetDatabase { id: String },
    /// List the pages of a database
    GetPages { database_id: String },
    /// Show one page
    GetPage { id: String },
    /// List the child blocks of a page or block
    GetBlocks { id: String },
    /// Create a page in a database
    CreatePage {
        database_id: String,
        title: String,
    },
    /// Set a rich text property of a page
    UpdateProperties {
        page_id: String,
        property: String,
        value: String,
    },
    /// Append paragraphs to a page or block
    AppendBlocks {
        id: String,
        #[arg(required = true)]
        paragraphs: Vec<String>,
    },
    /// Search pages and databases by title
    Search { query: Option<String> },
    /// Render the blocks of a page as Markdown
    Render { id: String },
}

impl CommandLineInput {
    /// The token from `--token`, falling back to the environment.
    pub fn resolve_api_key(&self) -> Result<ApiKey> {
        match &self.token {
            Some(token) => Ok(ApiKey::new(token.clone())?),
            None => ApiKey::from_env()
                .ok_or_else(|| {
                    NotionError::MissingConfiguration(
                        "pass --token or set NOTION_API_KEY".to_string(),
                    )
                })?
                .map_err(NotionError::from),
        }
    }

    pub fn resolve_client_config(&self) -> Result<ClientConfig> {
        match &self.base_url {
            Some(base) => ClientConfig::with_base_url(base),
            None => ClientConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_path_is_forced_to_v1() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:8080/anything/else").unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/v1");
    }

    #[test]
    fn page_size_is_clamped_to_api_maximum() {
        assert_eq!(ClientConfig::default().page_size(500).page_size, 100);
        assert_eq!(ClientConfig::default().page_size(0).page_size, 1);
    }

    #[test]
    fn parses_subcommands() {
        let cli = CommandLineInput::parse_from([
            "notion-api",
            "--token",
            "secret_abcdefghijklmnopqrstuvwxyz",
            "append-blocks",
            "block-1",
            "first",
            "second",
        ]);
        assert_eq!(
            cli.command,
            Command::AppendBlocks {
                id: "block-1".into(),
                paragraphs: vec!["first".into(), "second".into()],
            }
        );
        assert!(cli.resolve_api_key().is_ok());
    }
}
