// src/model/page.rs
//! Pages and the creation-template transformation.

use super::block::Block;
use super::common::{is_false, Meta, ObjectKind, Parent};
use super::database::Database;
use super::property_value::{PropertyData, PropertyValue};
use crate::error::{NotionError, Result};
use crate::types::{Timestamp, ValidationError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A page, either a database row or a free-standing document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Parent>,
    /// Values keyed by column name.
    #[serde(default)]
    pub properties: IndexMap<String, PropertyData>,
    /// Initial content, only meaningful on create.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Page {
    /// Builds a creation payload for a new row of `database`.
    ///
    /// The title is written to the database's title column. The parent is
    /// not kept as an object reference; pass the database again to
    /// [`Page::set_property`].
    pub fn new_in_database(
        database: &Database,
        title: impl Into<String>,
        children: Vec<Block>,
    ) -> Result<Self, ValidationError> {
        if database.id().is_empty() {
            return Err(ValidationError::MissingParentDatabase);
        }
        let (title_key, _) =
            database
                .title_property()
                .ok_or_else(|| ValidationError::MissingTitleProperty {
                    database_id: database.id().to_string(),
                })?;

        let mut properties = IndexMap::new();
        properties.insert(
            title_key.to_string(),
            PropertyData::new(PropertyValue::title(title)),
        );

        Ok(Self {
            meta: Meta {
                object: Some(ObjectKind::Page),
                id: String::new(),
            },
            parent: Some(Parent::database(database.id())),
            properties,
            children,
            ..Self::default()
        })
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    /// Sets a property value, accepting only columns of `database`.
    pub fn set_property(
        &mut self,
        database: &Database,
        key: impl Into<String>,
        value: PropertyValue,
    ) -> Result<(), ValidationError> {
        let key = key.into();
        if !database.properties.contains_key(&key) {
            return Err(ValidationError::UnknownProperty { key });
        }
        self.properties.insert(key, PropertyData::new(value));
        Ok(())
    }

    /// Plain text of the title column, empty when the page has none.
    pub fn title(&self) -> String {
        self.properties
            .values()
            .find_map(|data| match &data.value {
                PropertyValue::Title { title } => Some(super::rich_text::plain_text_of(title)),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn parent_database_id(&self) -> Option<&str> {
        match &self.parent {
            Some(Parent::DatabaseId { database_id }) => Some(database_id),
            _ => None,
        }
    }

    /// Produces a blank, creation-ready copy of this page.
    ///
    /// The copy goes through the wire codec so it shares nothing with
    /// `self`. Identifier and timestamps are cleared, server-computed
    /// columns are removed, and so are empty relations, unset selects and
    /// empty multi-selects, as are kinds this client cannot encode. Everything
    /// else is copied as-is; no schema validation happens here.
    pub fn derive_template(&self) -> Result<Page> {
        let encoded = serde_json::to_vec(self).map_err(|source| NotionError::Encode {
            operation: "derive page template",
            source,
        })?;
        let mut copy: Page =
            serde_json::from_slice(&encoded).map_err(|source| NotionError::Decode {
                operation: "derive page template",
                source,
                body_preview: String::new(),
            })?;

        copy.meta.id.clear();
        copy.created_time = None;
        copy.last_edited_time = None;
        copy.properties.retain(|_, data| keep_in_template(&data.value));

        Ok(copy)
    }
}

fn keep_in_template(value: &PropertyValue) -> bool {
    match value {
        PropertyValue::Relation { relation } => !relation.is_empty(),
        PropertyValue::Select { select } => select.is_some(),
        PropertyValue::MultiSelect { multi_select } => !multi_select.is_empty(),
        PropertyValue::Unsupported(_) => false,
        other => !other.is_server_computed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PropertyMetadata, PropertySchema, SelectOption};
    use pretty_assertions::assert_eq;

    fn tasks_database() -> Database {
        let mut db = Database::new(Parent::page("root"), "Tasks");
        db.meta.id = "db-1".to_string();
        db.properties.insert(
            "Stage".to_string(),
            PropertyMetadata::new("Stage", PropertySchema::Select {
                select: Default::default(),
            }),
        );
        db
    }

    #[test]
    fn new_in_database_writes_title_column() {
        let page = Page::new_in_database(&tasks_database(), "Write docs", Vec::new()).unwrap();

        assert_eq!(page.parent, Some(Parent::database("db-1")));
        assert_eq!(page.title(), "Write docs");
        assert!(page.properties.contains_key("Name"));
    }

    #[test]
    fn new_in_database_requires_id_and_title_column() {
        let mut db = tasks_database();
        db.properties.shift_remove("Name");
        assert_eq!(
            Page::new_in_database(&db, "x", Vec::new()),
            Err(ValidationError::MissingTitleProperty {
                database_id: "db-1".into()
            })
        );

        db.meta.id.clear();
        assert_eq!(
            Page::new_in_database(&db, "x", Vec::new()),
            Err(ValidationError::MissingParentDatabase)
        );
    }

    #[test]
    fn page_with_unmodelled_column_decodes_and_templates_without_it() {
        let page: Page = serde_json::from_str(
            r#"{
                "object": "page",
                "id": "p1",
                "parent": {"type": "database_id", "database_id": "db-1"},
                "properties": {
                    "Name": {"id": "title", "type": "title", "title": [{"type": "text", "text": {"content": "Kale"}, "plain_text": "Kale"}]},
                    "Approve": {"id": "a%3Fb", "type": "button", "button": {}}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            page.properties["Approve"].value,
            PropertyValue::Unsupported("button".to_string())
        );

        let template = page.derive_template().unwrap();
        assert_eq!(template.title(), "Kale");
        assert!(!template.properties.contains_key("Approve"));
    }

    #[test]
    fn set_property_checks_schema() {
        let db = tasks_database();
        let mut page = Page::new_in_database(&db, "Write docs", Vec::new()).unwrap();

        let stage = PropertyValue::Select {
            select: Some(SelectOption::named("Doing")),
        };
        page.set_property(&db, "Stage", stage.clone()).unwrap();
        assert_eq!(page.properties["Stage"].value, stage);

        let err = page
            .set_property(&db, "Owner", PropertyValue::Checkbox { checkbox: true })
            .unwrap_err();
        assert_eq!(err, ValidationError::UnknownProperty { key: "Owner".into() });
    }
}
