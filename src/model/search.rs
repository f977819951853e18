use super::common::ObjectKind;
use super::database::Database;
use super::page::Page;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One hit of a search: resolved from its `object` field at decode time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResult {
    Page(Page),
    Database(Database),
}

impl SearchResult {
    pub fn id(&self) -> &str {
        match self {
            SearchResult::Page(page) => page.id(),
            SearchResult::Database(database) => database.id(),
        }
    }

    pub fn as_page(&self) -> Option<&Page> {
        match self {
            SearchResult::Page(page) => Some(page),
            SearchResult::Database(_) => None,
        }
    }

    pub fn as_database(&self) -> Option<&Database> {
        match self {
            SearchResult::Database(database) => Some(database),
            SearchResult::Page(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for SearchResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let object = value
            .get("object")
            .cloned()
            .ok_or_else(|| de::Error::missing_field("object"))?;

        match serde_json::from_value::<ObjectKind>(object).map_err(de::Error::custom)? {
            ObjectKind::Page => Page::deserialize(value)
                .map(SearchResult::Page)
                .map_err(de::Error::custom),
            ObjectKind::Database => Database::deserialize(value)
                .map(SearchResult::Database)
                .map_err(de::Error::custom),
            other => Err(de::Error::invalid_value(
                de::Unexpected::Str(other.as_str()),
                &"page or database",
            )),
        }
    }
}
