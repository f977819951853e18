use super::common::{is_false, EmptyObject, Meta, ObjectKind, Parent};
use super::property_value::SelectOption;
use super::rich_text::{plain_text_of, RichTextItem};
use crate::types::Timestamp;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A database: a titled collection of pages sharing a property schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Parent>,
    #[serde(default, skip_serializing_if = "Timestamp::is_zero")]
    pub created_time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Meta>,
    #[serde(default, skip_serializing_if = "Timestamp::is_zero")]
    pub last_edited_time: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_by: Option<Meta>,
    #[serde(default)]
    pub title: Vec<RichTextItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<RichTextItem>,
    /// Column schema keyed by display name, in server order.
    #[serde(default)]
    pub properties: IndexMap<String, PropertyMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_inline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub archived: bool,
}

impl Database {
    /// A creation payload under `parent` with a single title column.
    pub fn new(parent: Parent, title: impl Into<String>) -> Self {
        let mut properties = IndexMap::new();
        properties.insert(
            "Name".to_string(),
            PropertyMetadata::new("Name", PropertySchema::Title {
                title: EmptyObject {},
            }),
        );
        Self {
            meta: Meta {
                object: Some(ObjectKind::Database),
                id: String::new(),
            },
            parent: Some(parent),
            title: vec![RichTextItem::plain_text(title)],
            properties,
            ..Self::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn plain_title(&self) -> String {
        plain_text_of(&self.title)
    }

    /// The column holding each row's title, with its schema key.
    pub fn title_property(&self) -> Option<(&str, &PropertyMetadata)> {
        self.properties
            .iter()
            .find(|(_, prop)| matches!(prop.schema, PropertySchema::Title { .. }))
            .map(|(key, prop)| (key.as_str(), prop))
    }
}

/// Schema of one database column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMetadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(flatten)]
    pub schema: PropertySchema,
}

impl PropertyMetadata {
    pub fn new(name: impl Into<String>, schema: PropertySchema) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertySchema {
    Title {
        #[serde(default)]
        title: EmptyObject,
    },
    RichText {
        #[serde(default)]
        rich_text: EmptyObject,
    },
    Number {
        #[serde(default)]
        number: NumberFormat,
    },
    Select {
        #[serde(default)]
        select: SelectOptions,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: SelectOptions,
    },
    Status {
        #[serde(default)]
        status: SelectOptions,
    },
    Date {
        #[serde(default)]
        date: EmptyObject,
    },
    People {
        #[serde(default)]
        people: EmptyObject,
    },
    Files {
        #[serde(default)]
        files: EmptyObject,
    },
    Checkbox {
        #[serde(default)]
        checkbox: EmptyObject,
    },
    Url {
        #[serde(default)]
        url: EmptyObject,
    },
    Email {
        #[serde(default)]
        email: EmptyObject,
    },
    PhoneNumber {
        #[serde(default)]
        phone_number: EmptyObject,
    },
    Formula {
        #[serde(default)]
        formula: FormulaSchema,
    },
    Relation {
        relation: RelationSchema,
    },
    Rollup {
        #[serde(default)]
        rollup: RollupSchema,
    },
    CreatedTime {
        #[serde(default)]
        created_time: EmptyObject,
    },
    CreatedBy {
        #[serde(default)]
        created_by: EmptyObject,
    },
    LastEditedTime {
        #[serde(default)]
        last_edited_time: EmptyObject,
    },
    LastEditedBy {
        #[serde(default)]
        last_edited_by: EmptyObject,
    },
    UniqueId {
        #[serde(default)]
        unique_id: UniqueIdSchema,
    },
    /// A column kind this client does not model.
    #[serde(other)]
    Unsupported,
}

impl PropertySchema {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertySchema::Title { .. } => "title",
            PropertySchema::RichText { .. } => "rich_text",
            PropertySchema::Number { .. } => "number",
            PropertySchema::Select { .. } => "select",
            PropertySchema::MultiSelect { .. } => "multi_select",
            PropertySchema::Status { .. } => "status",
            PropertySchema::Date { .. } => "date",
            PropertySchema::People { .. } => "people",
            PropertySchema::Files { .. } => "files",
            PropertySchema::Checkbox { .. } => "checkbox",
            PropertySchema::Url { .. } => "url",
            PropertySchema::Email { .. } => "email",
            PropertySchema::PhoneNumber { .. } => "phone_number",
            PropertySchema::Formula { .. } => "formula",
            PropertySchema::Relation { .. } => "relation",
            PropertySchema::Rollup { .. } => "rollup",
            PropertySchema::CreatedTime { .. } => "created_time",
            PropertySchema::CreatedBy { .. } => "created_by",
            PropertySchema::LastEditedTime { .. } => "last_edited_time",
            PropertySchema::LastEditedBy { .. } => "last_edited_by",
            PropertySchema::UniqueId { .. } => "unique_id",
            PropertySchema::Unsupported => "unsupported",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NumberFormat {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectOptions {
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormulaSchema {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSchema {
    pub database_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_property_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RollupSchema {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub relation_property_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub relation_property_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rollup_property_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rollup_property_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UniqueIdSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}
