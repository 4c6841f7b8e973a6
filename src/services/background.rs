use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::error::{NotifyError, Result};
use crate::models::message::{ControlMessage, PlatformEvent, SubjectId};
use crate::models::presentation::DISMISS_ACTION;
use crate::services::presenter::NotificationPresenter;
use crate::services::scheduler::BackgroundScheduler;
use crate::services::surface::{ClientRegistry, NotificationSurface};

/// Everything the background service reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Control(ControlMessage),
    Platform(PlatformEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Registered,
    Installed,
    Activated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub lifecycle: LifecycleState,
    pub watching: Option<String>,
}

/// The only way foreground instances and the platform reach the service.
/// Nothing is acknowledged: a send succeeds once the message is queued.
#[derive(Clone)]
pub struct ServiceHandle {
    inbox: mpsc::Sender<Inbound>,
    status: watch::Receiver<ServiceStatus>,
}

impl ServiceHandle {
    pub async fn post_message(&self, message: ControlMessage) -> Result<()> {
        self.send(Inbound::Control(message)).await
    }

    pub async fn dispatch_event(&self, event: PlatformEvent) -> Result<()> {
        self.send(Inbound::Platform(event)).await
    }

    pub fn status(&self) -> ServiceStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ServiceStatus> {
        self.status.clone()
    }

    async fn send(&self, inbound: Inbound) -> Result<()> {
        self.inbox
            .send(inbound)
            .await
            .map_err(|_| NotifyError::ChannelClosed)
    }
}

pub struct BackgroundService {
    scheduler: BackgroundScheduler,
    presenter: NotificationPresenter,
    surface: Arc<dyn NotificationSurface>,
    clients: Arc<dyn ClientRegistry>,
    app_root: String,
    lifecycle: LifecycleState,
    status: watch::Sender<ServiceStatus>,
}

impl BackgroundService {
    pub fn new(
        scheduler: BackgroundScheduler,
        presenter: NotificationPresenter,
        surface: Arc<dyn NotificationSurface>,
        clients: Arc<dyn ClientRegistry>,
        app_root: String,
    ) -> Self {
        let (status, _) = watch::channel(ServiceStatus {
            lifecycle: LifecycleState::Registered,
            watching: None,
        });

        Self {
            scheduler,
            presenter,
            surface,
            clients,
            app_root,
            lifecycle: LifecycleState::Registered,
            status,
        }
    }

    /// Move the service onto its own task and hand back the way to reach it.
    pub fn spawn(self, capacity: usize) -> (ServiceHandle, JoinHandle<()>) {
        let (inbox, receiver) = mpsc::channel(capacity.max(1));
        let handle = ServiceHandle {
            inbox,
            status: self.status.subscribe(),
        };
        let task = tokio::spawn(self.run(receiver));
        (handle, task)
    }

    pub async fn run(mut self, mut inbox: mpsc::Receiver<Inbound>) {
        log::info!("Background notification service running");
        while let Some(inbound) = inbox.recv().await {
            self.handle(inbound).await;
        }
        self.scheduler.stop();
        log::info!("Background notification service shut down");
    }

    pub async fn handle(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Control(message) => self.handle_control(message),
            Inbound::Platform(event) => self.handle_platform(event).await,
        }
        self.publish_status();
    }

    pub fn scheduler(&self) -> &BackgroundScheduler {
        &self.scheduler
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    fn handle_control(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::SetUserId { user_id } => {
                let subject = user_id.as_deref().and_then(SubjectId::parse);
                if subject.is_none() {
                    log::debug!("SET_USER_ID without a usable id, ignoring");
                }
                self.scheduler.set_subject(subject);
            }
            ControlMessage::StopBackgroundCheck => self.scheduler.stop(),
        }
    }

    async fn handle_platform(&mut self, event: PlatformEvent) {
        match event {
            PlatformEvent::Install => {
                // Nothing to wait for: take over as soon as installed.
                self.lifecycle = LifecycleState::Installed;
                log::info!("Installed, skipping wait");
            }
            PlatformEvent::Activate => {
                self.lifecycle = LifecycleState::Activated;
                let claimed = self.clients.claim().await;
                log::info!("Activated, claimed {} foreground instance(s)", claimed);
            }
            PlatformEvent::NotificationClick { tag, action, .. } => {
                self.route_click(&tag, action.as_deref()).await;
            }
            PlatformEvent::NotificationClose { tag } => {
                self.surface.close(&tag);
                log::debug!("Notification {} dismissed", tag);
            }
            PlatformEvent::Push { payload } => {
                let Some(payload) = payload else {
                    log::debug!("Push delivery without payload, ignoring");
                    return;
                };
                if let Some(request) = self.presenter.push_presentation(&payload) {
                    self.surface.show(request);
                }
            }
        }
    }

    /// Close the notification, then bring the root instance forward, or open
    /// one if none is reachable.
    async fn route_click(&self, tag: &str, action: Option<&str>) {
        self.surface.close(tag);
        if action == Some(DISMISS_ACTION) {
            log::debug!("Notification {} dismissed from its action", tag);
            return;
        }

        let clients = self.clients.match_all().await;
        if let Some(client) = clients.iter().find(|client| client.is_at(&self.app_root)) {
            match self.clients.focus(client).await {
                Ok(()) => return,
                Err(e) => log::warn!("Could not focus instance {}: {}", client.id, e),
            }
        }

        if let Err(e) = self.clients.open_window(&self.app_root).await {
            log::warn!("Could not open {}: {}", self.app_root, e);
        }
    }

    fn publish_status(&self) {
        self.status.send_replace(ServiceStatus {
            lifecycle: self.lifecycle,
            watching: self.scheduler.subject().map(|subject| subject.to_string()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PresenterConfig;
    use crate::models::client::ClientInfo;
    use crate::services::clients::ClientTable;
    use crate::services::scheduler::tests::{runner, share_event, ScriptedFetcher};
    use crate::services::surface::DisplayedNotifications;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::time::Duration;

    struct Harness {
        service: BackgroundService,
        fetcher: Arc<ScriptedFetcher>,
        surface: DisplayedNotifications,
        clients: ClientTable,
    }

    fn harness() -> Harness {
        harness_with_clients(ClientTable::new())
    }

    fn harness_with_clients(clients: ClientTable) -> Harness {
        let fetcher = ScriptedFetcher::with_listing(Vec::new());
        let surface = DisplayedNotifications::new();
        let scheduler = BackgroundScheduler::new(
            runner(fetcher.clone(), surface.clone(), Utc::now()),
            Duration::from_secs(30),
        );
        let service = BackgroundService::new(
            scheduler,
            NotificationPresenter::new(PresenterConfig::default()),
            Arc::new(surface.clone()),
            Arc::new(clients.clone()),
            "/".to_string(),
        );

        Harness {
            service,
            fetcher,
            surface,
            clients,
        }
    }

    fn click(tag: &str, action: Option<&str>) -> Inbound {
        Inbound::Platform(PlatformEvent::NotificationClick {
            tag: tag.to_string(),
            action: action.map(str::to_string),
            data: None,
        })
    }

    fn show_share(h: &Harness, id: &str) {
        let request = crate::models::notification::ShareRequest {
            event: share_event(id, Utc::now()),
            metadata: Default::default(),
        };
        NotificationPresenter::new(PresenterConfig::default()).present(&h.surface, &request);
    }

    #[tokio::test]
    async fn test_control_messages_drive_scheduler() {
        let mut h = harness();

        h.service
            .handle(Inbound::Control(ControlMessage::set_user_id("u1")))
            .await;
        assert_eq!(h.service.scheduler().subject().map(|s| s.as_str()), Some("u1"));

        h.service
            .handle(Inbound::Control(ControlMessage::StopBackgroundCheck))
            .await;
        assert!(!h.service.scheduler().is_active());
    }

    #[tokio::test]
    async fn test_blank_user_id_is_ignored() {
        let mut h = harness();

        h.service
            .handle(Inbound::Control(ControlMessage::SetUserId { user_id: None }))
            .await;
        h.service
            .handle(Inbound::Control(ControlMessage::set_user_id("")))
            .await;

        assert!(!h.service.scheduler().is_active());
        tokio::task::yield_now().await;
        assert_eq!(h.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_click_focuses_existing_root_instance() {
        let clients = ClientTable::new();
        let root = clients.register("https://space.example.com/".to_string());
        clients.register("https://space.example.com/files/7".to_string());
        let mut h = harness_with_clients(clients);
        show_share(&h, "n1");

        h.service.handle(click("share-n1", Some("open"))).await;

        assert!(h.surface.is_empty());
        let all = h.clients.list();
        assert_eq!(all.len(), 2);
        assert!(all.iter().find(|c| c.id == root.id).unwrap().focused);
    }

    #[tokio::test]
    async fn test_click_without_root_instance_opens_one() {
        let clients = ClientTable::new();
        clients.register("https://space.example.com/files/7".to_string());
        let mut h = harness_with_clients(clients);
        show_share(&h, "n1");

        h.service.handle(click("share-n1", None)).await;

        let all = h.clients.list();
        assert_eq!(all.len(), 2);
        let opened = all.iter().find(|c| c.focused).unwrap();
        assert_eq!(opened.url, "/");
    }

    #[tokio::test]
    async fn test_dismiss_action_only_closes() {
        let clients = ClientTable::new();
        clients.register("/".to_string());
        let mut h = harness_with_clients(clients);
        show_share(&h, "n1");

        h.service.handle(click("share-n1", Some("dismiss"))).await;

        assert!(h.surface.is_empty());
        assert!(h.clients.list().iter().all(|c| !c.focused));
    }

    struct UnfocusableClients {
        inner: ClientTable,
    }

    #[async_trait]
    impl ClientRegistry for UnfocusableClients {
        async fn match_all(&self) -> Vec<ClientInfo> {
            self.inner.match_all().await
        }

        async fn focus(&self, _client: &ClientInfo) -> Result<()> {
            Err(NotifyError::Platform("focus not allowed".to_string()))
        }

        async fn open_window(&self, path: &str) -> Result<ClientInfo> {
            self.inner.open_window(path).await
        }

        async fn claim(&self) -> usize {
            self.inner.claim().await
        }
    }

    #[tokio::test]
    async fn test_failed_focus_falls_back_to_opening() {
        let table = ClientTable::new();
        table.register("/".to_string());
        let surface = DisplayedNotifications::new();
        let fetcher = ScriptedFetcher::with_listing(Vec::new());
        let mut service = BackgroundService::new(
            BackgroundScheduler::new(
                runner(fetcher, surface.clone(), Utc::now()),
                Duration::from_secs(30),
            ),
            NotificationPresenter::new(PresenterConfig::default()),
            Arc::new(surface),
            Arc::new(UnfocusableClients {
                inner: table.clone(),
            }),
            "/".to_string(),
        );

        service.handle(click("share-n1", None)).await;
        assert_eq!(table.list().len(), 2);
    }

    #[tokio::test]
    async fn test_push_bypasses_cursor_and_subject() {
        let mut h = harness();

        h.service
            .handle(Inbound::Platform(PlatformEvent::Push {
                payload: Some(json!({ "title": "New share", "body": "Open it" })),
            }))
            .await;
        h.service
            .handle(Inbound::Platform(PlatformEvent::Push { payload: None }))
            .await;

        let shown = h.surface.snapshot();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "New share");
        assert!(!h.service.scheduler().is_active());
    }

    #[tokio::test]
    async fn test_lifecycle_claims_clients() {
        let clients = ClientTable::new();
        clients.register("/".to_string());
        let mut h = harness_with_clients(clients);

        h.service.handle(Inbound::Platform(PlatformEvent::Install)).await;
        assert_eq!(h.service.lifecycle(), LifecycleState::Installed);

        h.service.handle(Inbound::Platform(PlatformEvent::Activate)).await;
        assert_eq!(h.service.lifecycle(), LifecycleState::Activated);
        assert!(h.clients.list().iter().all(|c| c.controlled));
    }

    #[tokio::test]
    async fn test_spawned_service_reports_status() {
        let h = harness();
        let (handle, task) = h.service.spawn(8);
        let mut status = handle.subscribe();

        handle
            .post_message(ControlMessage::set_user_id("u1"))
            .await
            .unwrap();
        status.changed().await.unwrap();
        assert_eq!(handle.status().watching.as_deref(), Some("u1"));

        handle
            .post_message(ControlMessage::StopBackgroundCheck)
            .await
            .unwrap();
        status.changed().await.unwrap();
        assert_eq!(handle.status().watching, None);

        drop(status);
        drop(handle);
        task.await.unwrap();
    }
}
