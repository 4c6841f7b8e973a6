use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Account whose share requests are being watched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Blank ids are not subjects.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Messages a foreground instance posts to the background service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    #[serde(rename = "SET_USER_ID")]
    SetUserId {
        #[serde(rename = "userId", default)]
        user_id: Option<String>,
    },
    #[serde(rename = "STOP_BACKGROUND_CHECK")]
    StopBackgroundCheck,
}

impl ControlMessage {
    pub fn set_user_id(user_id: impl Into<String>) -> Self {
        ControlMessage::SetUserId {
            user_id: Some(user_id.into()),
        }
    }

    /// Unknown or malformed messages decode to `None` and are dropped.
    pub fn decode(body: &[u8]) -> Option<Self> {
        match serde_json::from_slice(body) {
            Ok(message) => Some(message),
            Err(e) => {
                log::debug!("Ignoring unrecognized control message: {}", e);
                None
            }
        }
    }
}

/// Events the hosting platform delivers to the background service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlatformEvent {
    Install,
    Activate,
    NotificationClick {
        tag: String,
        #[serde(default)]
        action: Option<String>,
        #[serde(default)]
        data: Option<Value>,
    },
    NotificationClose {
        tag: String,
    },
    Push {
        #[serde(default)]
        payload: Option<Value>,
    },
}

impl PlatformEvent {
    pub fn decode(body: &[u8]) -> Option<Self> {
        match serde_json::from_slice(body) {
            Ok(event) => Some(event),
            Err(e) => {
                log::debug!("Ignoring unrecognized platform event: {}", e);
                None
            }
        }
    }
}
