// src/model/filter.rs
//! Request-only structures for database queries and search.
//!
//! Each leaf condition is a one-entry object keyed by its operator, e.g.
//! `{"contains": "kale"}`. Marker operators such as `is_empty` always
//! encode as `true` and relative date ranges as `{}`.

use crate::types::Timestamp;
use serde::{Serialize, Serializer};

fn always_true<S: Serializer>(serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bool(true)
}

fn empty_object<S: Serializer>(serializer: S) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    serializer.serialize_map(Some(0))?.end()
}

/// A query filter: a compound of filters or a condition on one property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Filter {
    Or {
        or: Vec<Filter>,
    },
    And {
        and: Vec<Filter>,
    },
    Property {
        property: String,
        #[serde(flatten)]
        condition: PropertyCondition,
    },
    Timestamp {
        timestamp: TimestampKind,
        #[serde(flatten)]
        condition: TimestampCondition,
    },
}

impl Filter {
    pub fn or(filters: Vec<Filter>) -> Self {
        Filter::Or { or: filters }
    }

    pub fn and(filters: Vec<Filter>) -> Self {
        Filter::And { and: filters }
    }

    pub fn property(property: impl Into<String>, condition: PropertyCondition) -> Self {
        Filter::Property {
            property: property.into(),
            condition,
        }
    }

    pub fn created_time(condition: DateCondition) -> Self {
        Filter::Timestamp {
            timestamp: TimestampKind::CreatedTime,
            condition: TimestampCondition::CreatedTime(condition),
        }
    }

    pub fn last_edited_time(condition: DateCondition) -> Self {
        Filter::Timestamp {
            timestamp: TimestampKind::LastEditedTime,
            condition: TimestampCondition::LastEditedTime(condition),
        }
    }
}

/// One comparator per property type, keyed by the type name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCondition {
    RichText(TextCondition),
    Title(TextCondition),
    Url(TextCondition),
    Email(TextCondition),
    PhoneNumber(TextCondition),
    Number(NumberCondition),
    Checkbox(CheckboxCondition),
    Select(SelectCondition),
    Status(SelectCondition),
    MultiSelect(ContainsCondition),
    People(ContainsCondition),
    Relation(ContainsCondition),
    Date(DateCondition),
    Files(EmptinessCondition),
    Formula(FormulaCondition),
    UniqueId(NumberCondition),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextCondition {
    Equals(String),
    DoesNotEqual(String),
    Contains(String),
    DoesNotContain(String),
    StartsWith(String),
    EndsWith(String),
    #[serde(serialize_with = "always_true")]
    IsEmpty,
    #[serde(serialize_with = "always_true")]
    IsNotEmpty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberCondition {
    Equals(f64),
    DoesNotEqual(f64),
    GreaterThan(f64),
    LessThan(f64),
    GreaterThanOrEqualTo(f64),
    LessThanOrEqualTo(f64),
    #[serde(serialize_with = "always_true")]
    IsEmpty,
    #[serde(serialize_with = "always_true")]
    IsNotEmpty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckboxCondition {
    Equals(bool),
    DoesNotEqual(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectCondition {
    Equals(String),
    DoesNotEqual(String),
    #[serde(serialize_with = "always_true")]
    IsEmpty,
    #[serde(serialize_with = "always_true")]
    IsNotEmpty,
}

/// Membership test used by multi-select, people and relation columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainsCondition {
    Contains(String),
    DoesNotContain(String),
    #[serde(serialize_with = "always_true")]
    IsEmpty,
    #[serde(serialize_with = "always_true")]
    IsNotEmpty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptinessCondition {
    #[serde(serialize_with = "always_true")]
    IsEmpty,
    #[serde(serialize_with = "always_true")]
    IsNotEmpty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateCondition {
    Equals(Timestamp),
    Before(Timestamp),
    After(Timestamp),
    OnOrBefore(Timestamp),
    OnOrAfter(Timestamp),
    #[serde(serialize_with = "always_true")]
    IsEmpty,
    #[serde(serialize_with = "always_true")]
    IsNotEmpty,
    #[serde(serialize_with = "empty_object")]
    PastWeek,
    #[serde(serialize_with = "empty_object")]
    PastMonth,
    #[serde(serialize_with = "empty_object")]
    PastYear,
    #[serde(serialize_with = "empty_object")]
    NextWeek,
    #[serde(serialize_with = "empty_object")]
    NextMonth,
    #[serde(serialize_with = "empty_object")]
    NextYear,
}

/// Condition on a formula result, keyed by the result type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaCondition {
    String(TextCondition),
    Checkbox(CheckboxCondition),
    Number(NumberCondition),
    Date(DateCondition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampKind {
    CreatedTime,
    LastEditedTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampCondition {
    CreatedTime(DateCondition),
    LastEditedTime(DateCondition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordering of query results, by a property or by a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sort {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<TimestampKind>,
    pub direction: SortDirection,
}

impl Sort {
    pub fn property(property: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            property: Some(property.into()),
            timestamp: None,
            direction,
        }
    }

    pub fn timestamp(timestamp: TimestampKind, direction: SortDirection) -> Self {
        Self {
            property: None,
            timestamp: Some(timestamp),
            direction,
        }
    }
}

/// Restricts search results to one object kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchFilter {
    pub property: &'static str,
    pub value: SearchObject,
}

impl SearchFilter {
    pub fn only(value: SearchObject) -> Self {
        Self {
            property: "object",
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchObject {
    Page,
    Database,
}

/// Search results can only be sorted by last edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSort {
    pub timestamp: TimestampKind,
    pub direction: SortDirection,
}

impl SearchSort {
    pub fn last_edited(direction: SortDirection) -> Self {
        Self {
            timestamp: TimestampKind::LastEditedTime,
            direction,
        }
    }
}
