use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::Result;
use crate::models::client::ClientInfo;
use crate::models::presentation::PresentationRequest;

/// Platform notification surface. Display is fire-and-forget: a denied
/// permission looks the same as a successful show from the caller's side.
pub trait NotificationSurface: Send + Sync {
    fn show(&self, request: PresentationRequest);
    fn close(&self, tag: &str);
}

/// Foreground application instances the platform lets us reach.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    async fn match_all(&self) -> Vec<ClientInfo>;
    async fn focus(&self, client: &ClientInfo) -> Result<()>;
    async fn open_window(&self, path: &str) -> Result<ClientInfo>;
    /// Take control of every existing instance; returns how many.
    async fn claim(&self) -> usize;
}

/// In-process surface: presentations live in a tag-keyed table, so showing a
/// tag twice replaces the first entry rather than stacking.
#[derive(Clone, Default)]
pub struct DisplayedNotifications {
    shown: Arc<RwLock<Vec<PresentationRequest>>>,
}

impl DisplayedNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<PresentationRequest> {
        self.shown.read().clone()
    }

    pub fn len(&self) -> usize {
        self.shown.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.read().is_empty()
    }
}

impl NotificationSurface for DisplayedNotifications {
    fn show(&self, request: PresentationRequest) {
        log::info!(
            "Showing notification {:?}: {}",
            request.tag().unwrap_or("<untagged>"),
            request.options.body.as_deref().unwrap_or_default()
        );

        let mut shown = self.shown.write();
        let replaces = request
            .tag()
            .and_then(|tag| shown.iter().position(|existing| existing.tag() == Some(tag)));
        match replaces {
            Some(index) => shown[index] = request,
            None => shown.push(request),
        }
    }

    fn close(&self, tag: &str) {
        self.shown.write().retain(|existing| existing.tag() != Some(tag));
    }
}
