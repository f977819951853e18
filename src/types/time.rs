// src/types/time.rs
//! Timestamp and calendar-date codecs for the wire format.
//!
//! The service reads instants in two shapes (`...Z` and `...±HHMM`) and
//! uses an empty object `{}` for "not set" in a handful of places.
//! Encoding always writes the explicit-offset shape.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const UTC_SUFFIX_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// An instant with a UTC offset, or the zero value meaning "not set".
///
/// The zero value is distinct from every parsed date. It decodes from `{}`
/// and encodes back to `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Timestamp(Option<DateTime<FixedOffset>>);

impl Timestamp {
    /// The "not set" sentinel.
    pub const fn zero() -> Self {
        Self(None)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }

    /// Parses either the `Z`-suffixed or the explicit-offset form.
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        if s.ends_with('Z') {
            let naive = NaiveDateTime::parse_from_str(s, UTC_SUFFIX_FORMAT)?;
            return Ok(Self(Some(naive.and_utc().fixed_offset())));
        }
        DateTime::parse_from_str(s, OFFSET_FORMAT).map(|dt| Self(Some(dt)))
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        self.0.as_ref()
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Self(Some(dt))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(Some(dt.fixed_offset()))
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(dt) => write!(f, "{}", dt.format(OFFSET_FORMAT)),
            None => Ok(()),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.0 {
            Some(dt) => serializer.collect_str(&dt.format(OFFSET_FORMAT)),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

struct TimestampVisitor;

impl<'de> Visitor<'de> for TimestampVisitor {
    type Value = Timestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a timestamp string or an empty object")
    }

    fn visit_str<E>(self, v: &str) -> Result<Timestamp, E>
    where
        E: de::Error,
    {
        Timestamp::parse(v).map_err(|e| E::custom(format!("invalid timestamp {:?}: {}", v, e)))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Timestamp, A::Error>
    where
        A: MapAccess<'de>,
    {
        if map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(1, &"an empty object"));
        }
        Ok(Timestamp::zero())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TimestampVisitor)
    }
}

/// A calendar date with no time or zone, `YYYY-MM-DD` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(pub NaiveDate);

impl Date {
    pub fn parse(s: &str) -> Result<Self, chrono::ParseError> {
        NaiveDate::parse_from_str(s, DATE_FORMAT).map(Self)
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl Serialize for Date {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s).map_err(|e| de::Error::custom(format!("invalid date {:?}: {}", s, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_decodes_to_zero() {
        let ts: Timestamp = serde_json::from_str("{}").unwrap();
        assert!(ts.is_zero());
        assert_eq!(ts, Timestamp::zero());
    }

    #[test]
    fn non_empty_object_is_rejected() {
        assert!(serde_json::from_str::<Timestamp>(r#"{"start":"x"}"#).is_err());
    }

    #[test]
    fn utc_suffix_and_offset_forms_parse_to_same_instant() {
        let utc: Timestamp = serde_json::from_str(r#""2021-05-15T10:30:00.123Z""#).unwrap();
        let offset: Timestamp =
            serde_json::from_str(r#""2021-05-15T19:30:00.123+0900""#).unwrap();

        let expected = Utc.with_ymd_and_hms(2021, 5, 15, 10, 30, 0).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(utc.as_datetime().unwrap().with_timezone(&Utc), expected);
        assert_eq!(offset.as_datetime().unwrap().with_timezone(&Utc), expected);
    }

    #[test]
    fn encodes_explicit_offset_even_for_utc() {
        let ts = Timestamp::parse("2021-05-15T10:30:00Z").unwrap();
        assert_eq!(serde_json::to_string(&ts).unwrap(), r#""2021-05-15T10:30:00+0000""#);

        let ts = Timestamp::parse("2021-05-15T10:30:00.250Z").unwrap();
        assert_eq!(
            serde_json::to_string(&ts).unwrap(),
            r#""2021-05-15T10:30:00.250+0000""#
        );
    }

    #[test]
    fn encoded_timestamps_decode_to_equal_instants() {
        let samples = [
            "2021-05-15T10:30:00Z",
            "2021-01-01T00:00:00.001Z",
            "1999-12-31T23:59:59.999-0700",
            "2024-02-29T12:00:00+0530",
        ];
        for sample in samples {
            let ts = Timestamp::parse(sample).unwrap();
            let encoded = serde_json::to_string(&ts).unwrap();
            let decoded: Timestamp = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, ts, "{}", sample);
        }
    }

    #[test]
    fn zero_encodes_as_empty_object() {
        assert_eq!(serde_json::to_string(&Timestamp::zero()).unwrap(), "{}");
    }

    #[test]
    fn malformed_timestamp_fails() {
        assert!(serde_json::from_str::<Timestamp>(r#""2021-05-15""#).is_err());
        assert!(serde_json::from_str::<Timestamp>(r#""yesterday""#).is_err());
        assert!(serde_json::from_str::<Timestamp>("42").is_err());
    }

    #[test]
    fn date_codec_is_calendar_only() {
        let date: Date = serde_json::from_str(r#""2021-05-15""#).unwrap();
        assert_eq!(date, Date::from_ymd(2021, 5, 15).unwrap());
        assert_eq!(serde_json::to_string(&date).unwrap(), r#""2021-05-15""#);
        assert!(serde_json::from_str::<Date>(r#""2021-05-15T00:00:00Z""#).is_err());
    }
}
