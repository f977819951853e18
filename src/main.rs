// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use indexmap::IndexMap;
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};
use notion_api::config::{Command, CommandLineInput};
use notion_api::formatting::render_blocks;
use notion_api::{Block, NotionClient, Page, PropertyData, PropertyValue};
use serde::Serialize;

/// Sets up logging on stderr so stdout stays machine-readable.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let stderr_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .build(Root::builder().appender("stderr").build(log_level))?;

    log4rs::init_config(config)?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn run(client: &NotionClient, command: Command) -> Result<()> {
    match command {
        Command::GetUser { id } => {
            print_json(&client.get_user(&id).with_context(|| format!("Failed to get user {}", id))?)
        }
        Command::ListUsers => print_json(&client.list_all_users().context("Failed to list users")?),
        Command::Me => print_json(&client.get_me().context("Failed to get the bot user")?),
        Command::ListDatabases => {
            print_json(&client.list_databases().context("Failed to list databases")?)
        }
        Command::GetDatabase { id } => print_json(
            &client
                .get_database(&id)
                .with_context(|| format!("Failed to get database {}", id))?,
        ),
        Command::GetPages { database_id } => print_json(
            &client
                .query_database(&database_id, None, &[])
                .with_context(|| format!("Failed to query database {}", database_id))?,
        ),
        Command::GetPage { id } => print_json(
            &client
                .get_page(&id)
                .with_context(|| format!("Failed to get page {}", id))?,
        ),
        Command::GetBlocks { id } => print_json(
            &client
                .list_block_children(&id)
                .with_context(|| format!("Failed to list children of {}", id))?,
        ),
        Command::CreatePage { database_id, title } => {
            let database = client
                .get_database(&database_id)
                .with_context(|| format!("Failed to get database {}", database_id))?;
            let page = Page::new_in_database(&database, title, Vec::new())?;
            print_json(&client.create_page(&page).context("Failed to create page")?)
        }
        Command::UpdateProperties {
            page_id,
            property,
            value,
        } => {
            let mut properties = IndexMap::new();
            properties.insert(property, PropertyData::new(PropertyValue::rich_text(value)));
            print_json(
                &client
                    .update_page_properties(&page_id, &properties)
                    .with_context(|| format!("Failed to update page {}", page_id))?,
            )
        }
        Command::AppendBlocks { id, paragraphs } => {
            let children: Vec<Block> = paragraphs.into_iter().map(Block::paragraph).collect();
            print_json(
                &client
                    .append_block_children(&id, &children)
                    .with_context(|| format!("Failed to append to {}", id))?,
            )
        }
        Command::Search { query } => print_json(
            &client
                .search(query.as_deref(), None, None)
                .context("Search failed")?,
        ),
        Command::Render { id } => {
            let blocks = client
                .list_block_children(&id)
                .with_context(|| format!("Failed to list children of {}", id))?;
            print!("{}", render_blocks(&blocks)?);
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let cli = CommandLineInput::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let api_key = cli.resolve_api_key()?;
    let config = cli.resolve_client_config()?;
    log::debug!("Using API at {} as {}", config.base_url, api_key);

    let client = NotionClient::with_config(&api_key, config).context("Failed to build client")?;
    run(&client, cli.command)
}
