use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{get, HttpResponse, Result};

use super::envelope::Envelope;
use crate::services::surface::DisplayedNotifications;

#[get("")]
pub async fn list_displayed(surface: Data<DisplayedNotifications>) -> Result<HttpResponse> {
    Ok(Envelope::listing(surface.snapshot()).reply(StatusCode::OK))
}
