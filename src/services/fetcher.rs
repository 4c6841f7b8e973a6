use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::config::ApiConfig;
use crate::error::{NotifyError, Result};
use crate::models::message::SubjectId;
use crate::models::notification::{decode_listing, NotificationEvent};

/// One poll of the notification listing for a subject.
#[async_trait]
pub trait NotificationFetcher: Send + Sync {
    async fn fetch(&self, subject: &SubjectId) -> Result<Vec<NotificationEvent>>;
}

#[derive(Clone)]
pub struct HttpNotificationFetcher {
    client: Client,
    base_url: Url,
}

impl HttpNotificationFetcher {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| NotifyError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(NotifyError::InvalidBaseUrl(config.base_url));
        }

        Ok(Self { client, base_url })
    }

    /// `{base}/notifications/user/{subject}`, with the subject encoded as a
    /// single path segment.
    pub fn listing_url(&self, subject: &SubjectId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["notifications", "user", subject.as_str()]);
        }
        url
    }
}

#[async_trait]
impl NotificationFetcher for HttpNotificationFetcher {
    async fn fetch(&self, subject: &SubjectId) -> Result<Vec<NotificationEvent>> {
        let url = self.listing_url(subject);
        log::debug!("Polling notifications for {}", subject);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(decode_listing(&bytes)?)
    }
}
