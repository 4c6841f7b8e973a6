use chrono::{DateTime, Utc};
use serde_json::Map;

use crate::models::notification::{NotificationEvent, ShareRequest};

/// Timestamp boundary between processed and unprocessed events.
///
/// The boundary is moved to "now" at the end of every cycle, including
/// cycles whose fetch failed. That keeps a recovered outage from replaying
/// its whole backlog, at the price of never surfacing share requests created
/// while the endpoint was unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupCursor {
    last_check: DateTime<Utc>,
}

impl DedupCursor {
    pub fn starting_at(last_check: DateTime<Utc>) -> Self {
        Self { last_check }
    }

    pub fn last_check(&self) -> DateTime<Utc> {
        self.last_check
    }

    /// Never moves backward.
    pub fn advance_to(&mut self, now: DateTime<Utc>) {
        if now > self.last_check {
            self.last_check = now;
        }
    }

    /// Eligible events newer than the boundary, in fetch order, with metadata
    /// parsed or replaced by an empty object.
    pub fn select_new(&self, events: Vec<NotificationEvent>) -> Vec<ShareRequest> {
        select_eligible(events, self.last_check)
    }
}

pub fn select_eligible(
    events: Vec<NotificationEvent>,
    prior_check: DateTime<Utc>,
) -> Vec<ShareRequest> {
    events
        .into_iter()
        .filter(|event| event.is_eligible_after(prior_check))
        .map(|event| {
            let metadata = event.parse_metadata().unwrap_or_else(|e| {
                log::debug!("Unreadable metadata on notification {}: {}", event.id, e);
                Map::new()
            });
            ShareRequest { event, metadata }
        })
        .collect()
}
