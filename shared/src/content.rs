use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Backend identifier for a post or news article.
///
/// The backend is not consistent about emitting ids as strings or numbers, so
/// both normalize to the same textual key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        let id = match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text,
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
        };
        Ok(Self(id))
    }
}

/// A backend timestamp field.
///
/// Presence matters separately from validity: a field that is there but does
/// not parse still shadows the fields behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timestamp {
    /// Missing, null or empty.
    #[default]
    Absent,
    /// Parsed, keeping the offset the backend sent.
    At(DateTime<FixedOffset>),
    Invalid,
}

impl Timestamp {
    pub fn at(self) -> Option<DateTime<FixedOffset>> {
        match self {
            Timestamp::At(at) => Some(at),
            Timestamp::Absent | Timestamp::Invalid => None,
        }
    }

    pub fn is_absent(self) -> bool {
        matches!(self, Timestamp::Absent)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Timestamp::At(at.fixed_offset())
    }
}

/// A post or news article as returned by the backend listing endpoints.
///
/// Everything except `id` decodes leniently: missing or malformed counts are 0
/// and a missing body is empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub content: String,
    /// Post kind (`album`, `text`, ...). News articles carry none.
    #[serde(default, rename = "type", deserialize_with = "lenient_opt_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Timestamp,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Timestamp,
    #[serde(default, rename = "likes_count", deserialize_with = "lenient_count")]
    pub likes: u64,
    #[serde(default, rename = "comments_count", deserialize_with = "lenient_count")]
    pub comments: u64,
    #[serde(default, rename = "collects_count", deserialize_with = "lenient_count")]
    pub collects: u64,
}

impl ContentItem {
    /// Bare item with no engagement, body or timestamps.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: ContentId::new(id),
            content: String::new(),
            kind: None,
            created_at: Timestamp::Absent,
            updated_at: Timestamp::Absent,
            likes: 0,
            comments: 0,
            collects: 0,
        }
    }

    /// Body length in UTF-16 code units, the unit the site's web clients count in.
    pub fn content_len(&self) -> usize {
        self.content.encode_utf16().count()
    }

    pub fn is_album(&self) -> bool {
        self.kind.as_deref() == Some("album")
    }

    /// `updated_at` when present, otherwise `created_at`.
    ///
    /// An `updated_at` that is present but unparseable yields `None` rather
    /// than falling back to the creation time.
    pub fn last_modified(&self) -> Option<DateTime<FixedOffset>> {
        if self.updated_at.is_absent() {
            self.created_at.at()
        } else {
            self.updated_at.at()
        }
    }

    /// Fractional days elapsed between [`Self::last_modified`] and `now`.
    pub fn age_days(&self, now: DateTime<Utc>) -> Option<f64> {
        let last_modified = self.last_modified()?.with_timezone(&Utc);
        let elapsed = now.signed_duration_since(last_modified);
        Some(elapsed.num_milliseconds() as f64 / MILLIS_PER_DAY)
    }
}

/// Parses the timestamp shapes the backend has been seen to emit.
///
/// Offset-less values are read as UTC; explicit offsets are kept.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Coerces a JSON value into an engagement count.
///
/// Numbers and numeric strings are accepted; anything negative, non-finite or
/// non-numeric is 0. Fractions truncate.
fn count_from_value(value: &Value) -> u64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    raw.filter(|v| v.is_finite() && *v > 0.0)
        .map_or(0, |v| v as u64)
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map_or(0, count_from_value))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_opt_text(deserializer)?.unwrap_or_default())
}

fn lenient_opt_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Ok(Some(text)),
        _ => Ok(None),
    }
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    let timestamp = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Timestamp::Absent,
        Some(Value::String(text)) if text.trim().is_empty() => Timestamp::Absent,
        Some(Value::String(text)) => {
            parse_timestamp(&text).map_or(Timestamp::Invalid, Timestamp::At)
        }
        Some(_) => Timestamp::Invalid,
    };
    Ok(timestamp)
}
