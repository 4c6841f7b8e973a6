use serde_json::Value;

use crate::config::PresenterConfig;
use crate::models::notification::{ShareRequest, SHARE_REQUEST};
use crate::models::presentation::{
    share_tag, NotificationAction, NotificationOptions, PresentationRequest, PushPayload,
    SharePayload, DISMISS_ACTION, OPEN_ACTION,
};
use crate::services::surface::NotificationSurface;

/// Turns share requests and push payloads into surface presentations.
#[derive(Debug, Clone)]
pub struct NotificationPresenter {
    config: PresenterConfig,
}

impl NotificationPresenter {
    pub fn new(config: PresenterConfig) -> Self {
        Self { config }
    }

    pub fn share_presentation(&self, request: &ShareRequest) -> PresentationRequest {
        let body = request
            .event
            .message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(self.config.default_body.as_str())
            .to_string();

        let payload = SharePayload {
            notification_id: request.event.id.clone(),
            share_id: request.share_id().cloned(),
            kind: SHARE_REQUEST.to_string(),
        };

        PresentationRequest {
            title: self.config.title.clone(),
            options: NotificationOptions {
                body: Some(body),
                icon: Some(self.config.icon.clone()),
                badge: Some(self.config.badge.clone()),
                tag: Some(share_tag(&request.event.id)),
                require_interaction: true,
                data: serde_json::to_value(payload).ok(),
                actions: vec![
                    NotificationAction {
                        action: OPEN_ACTION.to_string(),
                        title: self.config.open_action_title.clone(),
                    },
                    NotificationAction {
                        action: DISMISS_ACTION.to_string(),
                        title: self.config.dismiss_action_title.clone(),
                    },
                ],
            },
        }
    }

    pub fn present(&self, surface: &dyn NotificationSurface, request: &ShareRequest) {
        surface.show(self.share_presentation(request));
    }

    /// Push payloads are shown as delivered; missing fields fall back to the
    /// configured title and icons.
    pub fn push_presentation(&self, payload: &Value) -> Option<PresentationRequest> {
        let push: PushPayload = match serde_json::from_value(payload.clone()) {
            Ok(push) => push,
            Err(e) => {
                log::debug!("Ignoring push payload without usable structure: {}", e);
                return None;
            }
        };

        let mut options = push.options;
        if push.body.is_some() {
            options.body = push.body;
        }
        options.icon.get_or_insert_with(|| self.config.icon.clone());
        options.badge.get_or_insert_with(|| self.config.badge.clone());

        Some(PresentationRequest {
            title: push.title.unwrap_or_else(|| self.config.title.clone()),
            options,
        })
    }
}
