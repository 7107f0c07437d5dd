use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const WATCH_URL: &str = "https://www.youtube.com/watch";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecordError {
    #[error("comment record is not a JSON object")]
    NotAnObject,
    #[error("comment record is missing field `{0}`")]
    MissingField(&'static str),
    #[error("comment record field `{0}` must be a non-empty string")]
    InvalidField(&'static str),
    #[error("comment record has unparseable timestamp {0:?}")]
    InvalidTimestamp(String),
}

/// A comment or reply as delivered by the remote channel.
///
/// Only `id` and `publishedAt` are interpreted here; every other field is
/// kept verbatim in `payload` for the formatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub id: String,
    pub published_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl CommentRecord {
    pub fn new(id: impl Into<String>, published_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            published_at,
            payload: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    /// Validates the shape of a raw record and splits it into the fields the
    /// controller relies on plus the opaque payload.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let Value::Object(mut payload) = value else {
            return Err(RecordError::NotAnObject);
        };

        let id = match payload.remove("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => id,
            Some(_) => return Err(RecordError::InvalidField("id")),
            None => return Err(RecordError::MissingField("id")),
        };

        let published_at = match payload.remove("publishedAt") {
            Some(Value::String(raw)) => DateTime::parse_from_rfc3339(raw.trim())
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|_| RecordError::InvalidTimestamp(raw))?,
            Some(_) => return Err(RecordError::InvalidField("publishedAt")),
            None => return Err(RecordError::MissingField("publishedAt")),
        };

        Ok(Self {
            id,
            published_at,
            payload,
        })
    }

    fn text_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    pub fn author(&self) -> &str {
        self.text_field("authorDisplayName")
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("[unknown]")
    }

    pub fn author_channel_id(&self) -> Option<&str> {
        self.text_field("authorChannelId")
    }

    pub fn author_image_url(&self) -> Option<&str> {
        self.text_field("authorProfileImageUrl")
    }

    pub fn text(&self) -> &str {
        self.text_field("textDisplay")
            .or_else(|| self.text_field("textOriginal"))
            .unwrap_or("")
    }

    pub fn like_count(&self) -> u64 {
        self.payload
            .get("likeCount")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    pub fn total_reply_count(&self) -> u64 {
        self.payload
            .get("totalReplyCount")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }
}

impl<'de> Deserialize<'de> for CommentRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        CommentRecord::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// Validates a batch of raw records, keeping the valid ones in order.
pub fn parse_records(values: Vec<Value>) -> (Vec<CommentRecord>, Vec<RecordError>) {
    let mut records = Vec::with_capacity(values.len());
    let mut errors = Vec::new();
    for value in values {
        match CommentRecord::from_value(value) {
            Ok(record) => records.push(record),
            Err(err) => errors.push(err),
        }
    }
    (records, errors)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub id: String,
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
}

impl VideoMetadata {
    pub fn watch_url(&self) -> String {
        format!("{WATCH_URL}?v={}", self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    pub published_at: DateTime<Utc>,
    pub channel_id: String,
    #[serde(default)]
    pub channel_title: String,
}

/// Counts arrive as decimal strings from the upstream API; plain numbers are
/// accepted too. A missing count (comments disabled) reads as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default, deserialize_with = "lenient_count")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comment_count: u64,
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
        Null(Option<()>),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(text) => text
            .trim()
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid count {text:?}"))),
        Count::Null(_) => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_known_fields_from_payload() {
        let record = CommentRecord::from_value(json!({
            "id": "c1",
            "publishedAt": "2023-10-01T12:00:00Z",
            "authorDisplayName": "alice",
            "textDisplay": "hello",
            "likeCount": 3
        }))
        .unwrap();
        assert_eq!(record.id, "c1");
        assert_eq!(record.published_at.to_rfc3339(), "2023-10-01T12:00:00+00:00");
        assert_eq!(record.author(), "alice");
        assert_eq!(record.text(), "hello");
        assert_eq!(record.like_count(), 3);
        assert!(!record.payload.contains_key("id"));
    }

    #[test]
    fn rejects_malformed_records() {
        assert_eq!(
            CommentRecord::from_value(json!("c1")),
            Err(RecordError::NotAnObject)
        );
        assert_eq!(
            CommentRecord::from_value(json!({"publishedAt": "2023-10-01T12:00:00Z"})),
            Err(RecordError::MissingField("id"))
        );
        assert_eq!(
            CommentRecord::from_value(json!({"id": "", "publishedAt": "2023-10-01T12:00:00Z"})),
            Err(RecordError::InvalidField("id"))
        );
        assert_eq!(
            CommentRecord::from_value(json!({"id": "c1", "publishedAt": "yesterday"})),
            Err(RecordError::InvalidTimestamp("yesterday".into()))
        );
    }

    #[test]
    fn parse_records_keeps_valid_ones_in_order() {
        let (records, errors) = parse_records(vec![
            json!({"id": "a", "publishedAt": "2023-10-01T12:00:00Z"}),
            json!({"id": 7}),
            json!({"id": "b", "publishedAt": "2023-10-02T12:00:00+02:00"}),
        ]);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn statistics_accept_string_counts() {
        let video: VideoMetadata = serde_json::from_value(json!({
            "id": "vid",
            "snippet": {
                "title": "A video",
                "publishedAt": "2023-01-01T00:00:00Z",
                "channelId": "UC1"
            },
            "statistics": {"commentCount": "1250", "viewCount": 10}
        }))
        .unwrap();
        assert_eq!(video.statistics.comment_count, 1250);
        assert_eq!(video.statistics.view_count, 10);
        assert_eq!(video.statistics.like_count, 0);
        assert_eq!(video.watch_url(), "https://www.youtube.com/watch?v=vid");
    }

    #[test]
    fn missing_statistics_read_as_zero() {
        let video: VideoMetadata = serde_json::from_value(json!({
            "id": "vid",
            "snippet": {"publishedAt": "2023-01-01T00:00:00Z", "channelId": "UC1"}
        }))
        .unwrap();
        assert_eq!(video.statistics.comment_count, 0);
    }
}
