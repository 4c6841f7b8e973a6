use actix_web::http::StatusCode;
use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, HttpResponse, Result};
use uuid::Uuid;

use super::envelope::Envelope;
use crate::models::client::RegisterClientRequest;
use crate::services::clients::ClientTable;

#[post("")]
pub async fn register_client(
    clients: Data<ClientTable>,
    payload: Json<RegisterClientRequest>,
) -> Result<HttpResponse> {
    if payload.url.trim().is_empty() {
        return Ok(Envelope::rejected("url is required").reply(StatusCode::BAD_REQUEST));
    }

    let client = clients.register(payload.into_inner().url);
    log::debug!("Registered foreground instance {} at {}", client.id, client.url);
    Ok(Envelope::of(client).reply(StatusCode::CREATED))
}

#[get("")]
pub async fn list_clients(clients: Data<ClientTable>) -> Result<HttpResponse> {
    Ok(Envelope::listing(clients.list()).reply(StatusCode::OK))
}

#[delete("/{client_id}")]
pub async fn unregister_client(
    clients: Data<ClientTable>,
    path: Path<Uuid>,
) -> Result<HttpResponse> {
    let client_id = path.into_inner();
    if clients.unregister(client_id) {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Ok(Envelope::rejected(format!("Unknown instance {}", client_id))
            .reply(StatusCode::NOT_FOUND))
    }
}
