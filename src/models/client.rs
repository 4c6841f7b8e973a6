use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A foreground application instance known to the background service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub id: Uuid,
    pub url: String,
    pub focused: bool,
    /// Set once the background service has claimed this instance.
    pub controlled: bool,
    pub registered_at: DateTime<Utc>,
}

impl ClientInfo {
    pub fn new(url: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            url,
            focused: false,
            controlled: false,
            registered_at: Utc::now(),
        }
    }

    /// Path portion of the instance location; relative urls are taken as-is.
    pub fn path(&self) -> String {
        match Url::parse(&self.url) {
            Ok(url) => url.path().to_string(),
            Err(_) => self
                .url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn is_at(&self, root: &str) -> bool {
        normalize(&self.path()) == normalize(root)
    }
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterClientRequest {
    pub url: String,
}
