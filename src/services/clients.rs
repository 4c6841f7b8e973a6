use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{NotifyError, Result};
use crate::models::client::ClientInfo;
use crate::services::surface::ClientRegistry;

/// Registry of foreground instances that announced themselves over the
/// control surface.
#[derive(Clone, Default)]
pub struct ClientTable {
    clients: Arc<RwLock<Vec<ClientInfo>>>,
}

impl ClientTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, url: String) -> ClientInfo {
        let client = ClientInfo::new(url);
        log::info!("Registered foreground instance {} at {}", client.id, client.url);
        self.clients.write().push(client.clone());
        client
    }

    pub fn unregister(&self, id: Uuid) -> bool {
        let mut clients = self.clients.write();
        let before = clients.len();
        clients.retain(|client| client.id != id);
        clients.len() != before
    }

    pub fn list(&self) -> Vec<ClientInfo> {
        self.clients.read().clone()
    }
}

#[async_trait]
impl ClientRegistry for ClientTable {
    async fn match_all(&self) -> Vec<ClientInfo> {
        self.list()
    }

    async fn focus(&self, target: &ClientInfo) -> Result<()> {
        let mut clients = self.clients.write();
        if !clients.iter().any(|client| client.id == target.id) {
            return Err(NotifyError::Platform(format!(
                "instance {} is gone",
                target.id
            )));
        }

        for client in clients.iter_mut() {
            client.focused = client.id == target.id;
        }
        log::info!("Focused foreground instance {}", target.id);
        Ok(())
    }

    async fn open_window(&self, path: &str) -> Result<ClientInfo> {
        let mut client = ClientInfo::new(path.to_string());
        client.focused = true;
        client.controlled = true;

        let mut clients = self.clients.write();
        for existing in clients.iter_mut() {
            existing.focused = false;
        }
        clients.push(client.clone());
        log::info!("Opened new foreground instance {} at {}", client.id, path);
        Ok(client)
    }

    async fn claim(&self) -> usize {
        let mut clients = self.clients.write();
        for client in clients.iter_mut() {
            client.controlled = true;
        }
        clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_focus_moves_between_instances() {
        let table = ClientTable::new();
        let first = table.register("https://space.example.com/".to_string());
        let second = table.register("https://space.example.com/files".to_string());

        table.focus(&first).await.unwrap();
        table.focus(&second).await.unwrap();

        let clients = table.match_all().await;
        assert!(!clients.iter().find(|c| c.id == first.id).unwrap().focused);
        assert!(clients.iter().find(|c| c.id == second.id).unwrap().focused);
    }

    #[tokio::test]
    async fn test_focusing_a_departed_instance_fails() {
        let table = ClientTable::new();
        let client = table.register("/".to_string());
        assert!(table.unregister(client.id));
        assert!(!table.unregister(client.id));

        assert!(table.focus(&client).await.is_err());
    }

    #[tokio::test]
    async fn test_open_window_adds_focused_instance() {
        let table = ClientTable::new();
        table.register("/files".to_string());

        let opened = table.open_window("/").await.unwrap();
        assert!(opened.focused);
        assert_eq!(table.list().len(), 2);
        assert_eq!(table.list().iter().filter(|c| c.focused).count(), 1);
    }

    #[tokio::test]
    async fn test_claim_marks_everything_controlled() {
        let table = ClientTable::new();
        table.register("/".to_string());
        table.register("/files".to_string());

        assert_eq!(table.claim().await, 2);
        assert!(table.list().iter().all(|c| c.controlled));
    }
}
