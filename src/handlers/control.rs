use actix_web::web::{Bytes, Data};
use actix_web::{post, HttpResponse, Result};

use crate::models::message::{ControlMessage, PlatformEvent};
use crate::services::background::ServiceHandle;

/// Foreground instances post `SET_USER_ID` / `STOP_BACKGROUND_CHECK` here.
/// Always accepted; unrecognized bodies are dropped without an error.
#[post("/messages")]
pub async fn post_message(service: Data<ServiceHandle>, body: Bytes) -> Result<HttpResponse> {
    if let Some(message) = ControlMessage::decode(&body) {
        if let Err(e) = service.post_message(message).await {
            log::error!("Could not queue control message: {}", e);
        }
    }
    Ok(HttpResponse::Accepted().finish())
}

/// Platform deliveries: install, activate, notification click/close, push.
#[post("/events")]
pub async fn dispatch_event(service: Data<ServiceHandle>, body: Bytes) -> Result<HttpResponse> {
    if let Some(event) = PlatformEvent::decode(&body) {
        if let Err(e) = service.dispatch_event(event).await {
            log::error!("Could not queue platform event: {}", e);
        }
    }
    Ok(HttpResponse::Accepted().finish())
}
