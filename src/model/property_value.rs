// src/model/property_value.rs
//! Property values as they appear on pages.
//!
//! `PropertyValue` mirrors the schema tag space of `PropertySchema` but
//! carries the data of one page. Optional scalars encode `None` as an
//! explicit `null`, which the API reads as "clear this value"; leaving a
//! property out of `Page::properties` leaves it untouched.
//!
//! Values are decoded through `PropertyData` (or `PropertyValue::from_tagged`),
//! which keeps kinds this client does not model as `Unsupported`.

use super::common::Meta;
use super::rich_text::{plain_text_of, RichTextItem};
use super::user::User;
use crate::types::{Color, Date, Timestamp};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// A page's value for one database column.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyData {
    pub id: String,
    pub value: PropertyValue,
}

impl PropertyData {
    pub fn new(value: PropertyValue) -> Self {
        Self {
            id: String::new(),
            value,
        }
    }

    pub fn type_name(&self) -> &str {
        self.value.type_name()
    }
}

impl Serialize for PropertyData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let fields = self
            .value
            .to_tagged()
            .map_err(<S::Error as ser::Error>::custom)?;
        let mut map = serializer.serialize_map(None)?;
        if !self.id.is_empty() {
            map.serialize_entry("id", &self.id)?;
        }
        for (key, value) in &fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertyData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let id = raw
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let value =
            PropertyValue::from_tagged(&raw).map_err(<D::Error as de::Error>::custom)?;
        Ok(Self { id, value })
    }
}

impl From<PropertyValue> for PropertyData {
    fn from(value: PropertyValue) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichTextItem>,
    },
    /// Legacy spelling of `rich_text` still returned by some endpoints.
    Text {
        #[serde(default)]
        text: Vec<RichTextItem>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichTextItem>,
    },
    Number {
        number: Option<f64>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Status {
        status: Option<SelectOption>,
    },
    Date {
        date: Option<DateRange>,
    },
    People {
        #[serde(default)]
        people: Vec<User>,
    },
    Files {
        #[serde(default)]
        files: Vec<File>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    Url {
        url: Option<String>,
    },
    Email {
        email: Option<String>,
    },
    PhoneNumber {
        phone_number: Option<String>,
    },
    Formula {
        formula: Formula,
    },
    Relation {
        #[serde(default)]
        relation: Vec<Meta>,
    },
    Rollup {
        rollup: Rollup,
    },
    CreatedTime {
        #[serde(default)]
        created_time: Timestamp,
    },
    CreatedBy {
        created_by: User,
    },
    LastEditedTime {
        #[serde(default)]
        last_edited_time: Timestamp,
    },
    LastEditedBy {
        last_edited_by: User,
    },
    UniqueId {
        unique_id: UniqueId,
    },
    /// A property kind this client does not model (`button`,
    /// `verification`, ...). Only the tag survives.
    #[serde(skip)]
    Unsupported(String),
}

impl PropertyValue {
    pub const TYPE_NAMES: &'static [&'static str] = &[
        "title",
        "text",
        "rich_text",
        "number",
        "select",
        "multi_select",
        "status",
        "date",
        "people",
        "files",
        "checkbox",
        "url",
        "email",
        "phone_number",
        "formula",
        "relation",
        "rollup",
        "created_time",
        "created_by",
        "last_edited_time",
        "last_edited_by",
        "unique_id",
    ];

    /// Decodes a `type`-tagged object. Unknown tags become `Unsupported`;
    /// a known tag with a malformed payload is an error.
    pub fn from_tagged(raw: &Value) -> Result<Self, serde_json::Error> {
        let tag = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| <serde_json::Error as de::Error>::missing_field("type"))?;
        if !Self::TYPE_NAMES.contains(&tag) {
            return Ok(PropertyValue::Unsupported(tag.to_string()));
        }
        PropertyValue::deserialize(raw)
    }

    /// Encodes the tag and its payload as object fields.
    pub fn to_tagged(&self) -> Result<Map<String, Value>, serde_json::Error> {
        if let PropertyValue::Unsupported(tag) = self {
            let mut fields = Map::new();
            fields.insert("type".to_string(), Value::String(tag.clone()));
            return Ok(fields);
        }
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            other => Err(<serde_json::Error as ser::Error>::custom(format!(
                "property value encoded as a non-object: {}",
                other
            ))),
        }
    }

    /// Wire name of the variant's `type` tag.
    pub fn type_name(&self) -> &str {
        match self {
            PropertyValue::Title { .. } => "title",
            PropertyValue::Text { .. } => "text",
            PropertyValue::RichText { .. } => "rich_text",
            PropertyValue::Number { .. } => "number",
            PropertyValue::Select { .. } => "select",
            PropertyValue::MultiSelect { .. } => "multi_select",
            PropertyValue::Status { .. } => "status",
            PropertyValue::Date { .. } => "date",
            PropertyValue::People { .. } => "people",
            PropertyValue::Files { .. } => "files",
            PropertyValue::Checkbox { .. } => "checkbox",
            PropertyValue::Url { .. } => "url",
            PropertyValue::Email { .. } => "email",
            PropertyValue::PhoneNumber { .. } => "phone_number",
            PropertyValue::Formula { .. } => "formula",
            PropertyValue::Relation { .. } => "relation",
            PropertyValue::Rollup { .. } => "rollup",
            PropertyValue::CreatedTime { .. } => "created_time",
            PropertyValue::CreatedBy { .. } => "created_by",
            PropertyValue::LastEditedTime { .. } => "last_edited_time",
            PropertyValue::LastEditedBy { .. } => "last_edited_by",
            PropertyValue::UniqueId { .. } => "unique_id",
            PropertyValue::Unsupported(tag) => tag.as_str(),
        }
    }

    /// Values the server computes and refuses on create.
    pub fn is_server_computed(&self) -> bool {
        matches!(
            self,
            PropertyValue::CreatedTime { .. }
                | PropertyValue::CreatedBy { .. }
                | PropertyValue::LastEditedTime { .. }
                | PropertyValue::LastEditedBy { .. }
        )
    }

    pub fn title(text: impl Into<String>) -> Self {
        PropertyValue::Title {
            title: vec![RichTextItem::plain_text(text)],
        }
    }

    pub fn rich_text(text: impl Into<String>) -> Self {
        PropertyValue::RichText {
            rich_text: vec![RichTextItem::plain_text(text)],
        }
    }
}

/// One choice of a select, multi-select or status column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl SelectOption {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// An uploaded or external file attached to a page.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct File {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(flatten)]
    pub source: Option<FileSource>,
}

impl<'de> Deserialize<'de> for File {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Named {
            #[serde(default)]
            name: String,
        }

        let raw = Value::deserialize(deserializer)?;
        let source = FileSource::from_tagged(&raw).map_err(<D::Error as de::Error>::custom)?;
        let Named { name } = Named::deserialize(&raw).map_err(<D::Error as de::Error>::custom)?;
        Ok(Self { name, source })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileSource {
    File { file: HostedFile },
    External { external: ExternalFile },
}

impl FileSource {
    /// Reads the source of an object that may embed one. `None` when there
    /// is no `type` tag; a tagged but malformed source is an error.
    pub fn from_tagged(raw: &Value) -> Result<Option<Self>, serde_json::Error> {
        match raw.get("type") {
            None | Some(Value::Null) => Ok(None),
            Some(_) => FileSource::deserialize(raw).map(Some),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            FileSource::File { file } => &file.url,
            FileSource::External { external } => &external.url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedFile {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalFile {
    pub url: String,
}

/// Result of a formula column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Formula {
    String { string: Option<String> },
    Number { number: Option<f64> },
    Boolean { boolean: Option<bool> },
    Date { date: Option<DateRange> },
}

/// Result of a rollup column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rollup {
    Number {
        number: Option<f64>,
    },
    Date {
        date: Option<DateRange>,
    },
    Array {
        #[serde(
            default,
            deserialize_with = "decode_values",
            serialize_with = "encode_values"
        )]
        array: Vec<PropertyValue>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub number: i64,
}

fn decode_values<'de, D>(deserializer: D) -> Result<Vec<PropertyValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<Value>::deserialize(deserializer)?
        .iter()
        .map(|raw| PropertyValue::from_tagged(raw).map_err(de::Error::custom))
        .collect()
}

fn encode_values<S>(values: &[PropertyValue], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for value in values {
        let fields = value
            .to_tagged()
            .map_err(<S::Error as ser::Error>::custom)?;
        seq.serialize_element(&fields)?;
    }
    seq.end()
}

fn write_joined<T, F>(f: &mut fmt::Formatter<'_>, items: &[T], render: F) -> fmt::Result
where
    F: Fn(&T) -> String,
{
    let rendered: Vec<String> = items.iter().map(render).collect();
    f.write_str(&rendered.join(", "))
}

fn write_number(f: &mut fmt::Formatter<'_>, number: Option<f64>) -> fmt::Result {
    match number {
        Some(n) => write!(f, "{}", n),
        None => Ok(()),
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = &self.start {
            write!(f, "{}", start)?;
        }
        if let Some(end) = &self.end {
            write!(f, " - {}", end)?;
        }
        Ok(())
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Title { title: runs }
            | PropertyValue::Text { text: runs }
            | PropertyValue::RichText { rich_text: runs } => f.write_str(&plain_text_of(runs)),
            PropertyValue::Number { number } => write_number(f, *number),
            PropertyValue::Select { select: option } | PropertyValue::Status { status: option } => {
                f.write_str(option.as_ref().map_or("", |o| o.name.as_str()))
            }
            PropertyValue::MultiSelect { multi_select } => {
                write_joined(f, multi_select, |o| o.name.clone())
            }
            PropertyValue::Date { date } => match date {
                Some(range) => write!(f, "{}", range),
                None => Ok(()),
            },
            PropertyValue::People { people } => write_joined(f, people, |u| u.to_string()),
            PropertyValue::Files { files } => write_joined(f, files, |file| file.name.clone()),
            PropertyValue::Checkbox { checkbox } => write!(f, "{}", checkbox),
            PropertyValue::Url { url: value }
            | PropertyValue::Email { email: value }
            | PropertyValue::PhoneNumber {
                phone_number: value,
            } => f.write_str(value.as_deref().unwrap_or_default()),
            PropertyValue::Formula { formula } => match formula {
                Formula::String { string } => f.write_str(string.as_deref().unwrap_or_default()),
                Formula::Number { number } => write_number(f, *number),
                Formula::Boolean { boolean } => match boolean {
                    Some(b) => write!(f, "{}", b),
                    None => Ok(()),
                },
                Formula::Date { date } => match date {
                    Some(range) => write!(f, "{}", range),
                    None => Ok(()),
                },
            },
            PropertyValue::Relation { relation } => {
                write_joined(f, relation, |meta| meta.id.clone())
            }
            PropertyValue::Rollup { rollup } => match rollup {
                Rollup::Number { number } => write_number(f, *number),
                Rollup::Date { date } => match date {
                    Some(range) => write!(f, "{}", range),
                    None => Ok(()),
                },
                Rollup::Array { array } => write_joined(f, array, |v| v.to_string()),
                Rollup::Unsupported => Ok(()),
            },
            PropertyValue::CreatedTime { created_time: ts }
            | PropertyValue::LastEditedTime {
                last_edited_time: ts,
            } => write!(f, "{}", ts),
            PropertyValue::CreatedBy { created_by: user }
            | PropertyValue::LastEditedBy {
                last_edited_by: user,
            } => write!(f, "{}", user),
            PropertyValue::UniqueId { unique_id } => match &unique_id.prefix {
                Some(prefix) => write!(f, "{}-{}", prefix, unique_id.number),
                None => write!(f, "{}", unique_id.number),
            },
            PropertyValue::Unsupported(_) => Ok(()),
        }
    }
}

impl fmt::Display for PropertyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn populates_only_the_tagged_payload() {
        let data: PropertyData = serde_json::from_value(json!({
            "id": "%3AUPp",
            "type": "select",
            "select": {"id": "opt-1", "name": "Done", "color": "green"},
            "number": 42
        }))
        .unwrap();

        assert_eq!(data.id, "%3AUPp");
        assert_eq!(
            data.value,
            PropertyValue::Select {
                select: Some(SelectOption {
                    id: "opt-1".into(),
                    name: "Done".into(),
                    color: Some(Color::Green),
                })
            }
        );
    }

    #[test]
    fn null_and_value_are_distinct_on_the_wire() {
        let cleared = PropertyData::new(PropertyValue::Number { number: None });
        let set = PropertyData::new(PropertyValue::Number { number: Some(3.0) });

        assert_eq!(
            serde_json::to_value(&cleared).unwrap(),
            json!({"type": "number", "number": null})
        );
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({"type": "number", "number": 3.0})
        );
    }

    #[test]
    fn decodes_rollup_and_formula_results() {
        let rollup: PropertyValue = serde_json::from_value(json!({
            "type": "rollup",
            "rollup": {
                "type": "array",
                "function": "show_original",
                "array": [{"type": "number", "number": 2}, {"type": "number", "number": 3}]
            }
        }))
        .unwrap();
        assert_eq!(rollup.to_string(), "2, 3");

        let formula: PropertyValue = serde_json::from_value(json!({
            "type": "formula",
            "formula": {"type": "boolean", "boolean": true}
        }))
        .unwrap();
        assert_eq!(formula.to_string(), "true");
    }

    #[test]
    fn renders_plain_values() {
        let unique: PropertyValue = serde_json::from_value(json!({
            "type": "unique_id", "unique_id": {"prefix": "TASK", "number": 7}
        }))
        .unwrap();
        assert_eq!(unique.to_string(), "TASK-7");

        let date = PropertyValue::Date {
            date: Some(DateRange {
                start: Date::from_ymd(2021, 5, 15),
                end: Date::from_ymd(2021, 5, 16),
                time_zone: None,
            }),
        };
        assert_eq!(date.to_string(), "2021-05-15 - 2021-05-16");

        let multi = PropertyValue::MultiSelect {
            multi_select: vec![SelectOption::named("a"), SelectOption::named("b")],
        };
        assert_eq!(multi.to_string(), "a, b");
    }

    #[test]
    fn unknown_kind_keeps_its_tag() {
        let data: PropertyData = serde_json::from_str(
            r#"{"id": "qL%3F", "type": "button", "button": {}}"#,
        )
        .unwrap();

        assert_eq!(data.value, PropertyValue::Unsupported("button".to_string()));
        assert_eq!(data.type_name(), "button");
        assert_eq!(data.to_string(), "");
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"id": "qL%3F", "type": "button"})
        );
    }

    #[test]
    fn known_kind_with_bad_payload_is_an_error() {
        let err = serde_json::from_str::<PropertyData>(r#"{"type": "checkbox", "checkbox": "yes"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid type"), "{}", err);
    }

    #[test]
    fn rollup_array_tolerates_unknown_kinds() {
        let rollup: PropertyData = serde_json::from_value(json!({
            "type": "rollup",
            "rollup": {
                "type": "array",
                "array": [{"type": "number", "number": 1}, {"type": "place", "place": {}}]
            }
        }))
        .unwrap();

        match &rollup.value {
            PropertyValue::Rollup {
                rollup: Rollup::Array { array },
            } => assert_eq!(array[1], PropertyValue::Unsupported("place".to_string())),
            other => panic!("expected a rollup array, got {:?}", other),
        }
        assert_eq!(
            serde_json::to_value(&rollup).unwrap()["rollup"]["array"][1],
            json!({"type": "place"})
        );
    }

    #[test]
    fn malformed_file_source_is_an_error() {
        let result = serde_json::from_value::<File>(json!({
            "name": "brief.pdf",
            "type": "external",
            "external": {"href": "https://example.com/brief.pdf"}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn file_keeps_its_source() {
        let file: File = serde_json::from_value(json!({
            "name": "brief.pdf",
            "type": "external",
            "external": {"url": "https://example.com/brief.pdf"}
        }))
        .unwrap();
        assert_eq!(file.source.as_ref().map(FileSource::url), Some("https://example.com/brief.pdf"));
    }
}
