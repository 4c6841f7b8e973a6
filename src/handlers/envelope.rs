use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// JSON body wrapped around every management-surface reply that carries
/// one. `data` and `error` are mutually exclusive and absent when unset.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Number of items when `data` is a list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub served_at: DateTime<Utc>,
}

impl<T: Serialize> Envelope<T> {
    pub fn of(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            count: None,
            error: None,
            served_at: Utc::now(),
        }
    }

    pub fn reply(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    pub fn listing(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::of(items)
        }
    }
}

impl Envelope<()> {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            count: None,
            error: Some(reason.into()),
            served_at: Utc::now(),
        }
    }
}
