use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{HttpResponse, Result};

use super::envelope::Envelope;
use crate::services::background::ServiceHandle;

pub async fn health_check(service: Data<ServiceHandle>) -> Result<HttpResponse> {
    Ok(Envelope::of(service.status()).reply(StatusCode::OK))
}
