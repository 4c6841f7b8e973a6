use chrono::{DateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The only event type that is ever surfaced to the user.
pub const SHARE_REQUEST: &str = "share_request";

/// One entry returned by the notification listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Opaque payload. Usually a JSON-encoded string, sometimes an inline
    /// object, and not guaranteed to parse.
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(deserialize_with = "rfc3339_or_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
}

impl NotificationEvent {
    pub fn is_share_request(&self) -> bool {
        self.kind == SHARE_REQUEST
    }

    /// Unread share request created strictly after `prior_check`.
    pub fn is_eligible_after(&self, prior_check: DateTime<Utc>) -> bool {
        self.created_at > prior_check && self.is_share_request() && !self.is_read
    }

    pub fn parse_metadata(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match &self.metadata {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(Value::String(raw)) => serde_json::from_str(raw),
            Some(other) => Err(de::Error::custom(format!(
                "metadata must be an object, got {}",
                other
            ))),
        }
    }
}

/// An eligible event paired with its parsed (or empty) metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareRequest {
    pub event: NotificationEvent,
    pub metadata: Map<String, Value>,
}

impl ShareRequest {
    pub fn share_id(&self) -> Option<&Value> {
        self.metadata.get("shareId")
    }
}

/// Decode a listing body: either a bare array of events or
/// `{"notifications": [...]}`.
///
/// Entries are decoded one by one. An entry that does not decode is skipped,
/// so it can never cost its siblings their presentation.
pub fn decode_listing(body: &[u8]) -> Result<Vec<NotificationEvent>, serde_json::Error> {
    let entries = match serde_json::from_slice::<Value>(body)? {
        Value::Array(entries) => entries,
        Value::Object(mut wrapper) => match wrapper.remove("notifications") {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "\"notifications\" must be an array, got {}",
                    other
                )))
            }
            None => return Err(de::Error::missing_field("notifications")),
        },
        other => {
            return Err(de::Error::custom(format!(
                "listing must be an array or an object, got {}",
                other
            )))
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<NotificationEvent>(entry) {
            Ok(event) => Some(event),
            Err(e) => {
                log::debug!("Skipping undecodable listing entry: {}", e);
                None
            }
        })
        .collect())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

fn rfc3339_or_millis<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Millis(i64),
    }

    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(de::Error::custom),
        RawTimestamp::Millis(millis) => Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {}", millis))),
    }
}
