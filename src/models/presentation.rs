use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OPEN_ACTION: &str = "open";
pub const DISMISS_ACTION: &str = "dismiss";

/// What gets handed to the platform notification surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresentationRequest {
    pub title: String,
    pub options: NotificationOptions,
}

impl PresentationRequest {
    pub fn tag(&self) -> Option<&str> {
        self.options.tag.as_deref()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationOptions {
    pub body: Option<String>,
    pub icon: Option<String>,
    pub badge: Option<String>,
    /// Presentations sharing a tag replace each other instead of stacking.
    pub tag: Option<String>,
    pub require_interaction: bool,
    pub data: Option<Value>,
    pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Routing data carried by a share-request presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharePayload {
    pub notification_id: String,
    pub share_id: Option<Value>,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Structured body of an inbound push delivery.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub options: NotificationOptions,
}

pub fn share_tag(notification_id: &str) -> String {
    format!("share-{}", notification_id)
}
