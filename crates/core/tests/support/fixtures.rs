//! Ticket and clock fixtures.

use std::sync::Arc;

use chamados_core::{ActiveTicketTracker, ManualClock};
use chamados_domain::{ServiceSummary, Ticket};
use chrono::{DateTime, Utc};

use super::store::MockStore;

pub const NOW: &str = "2024-03-01T12:00:00.000Z";

pub fn at(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

pub fn clock() -> ManualClock {
    ManualClock::new(at(NOW))
}

pub fn ticket(id: &str, status: &str, started_at: Option<&str>) -> Ticket {
    let mut ticket = Ticket::new(id, status);
    ticket.started_at = started_at.map(str::to_string);
    ticket
}

/// Running ticket with a priced service, ready to complete.
pub fn billable(id: &str, started_at: &str) -> Ticket {
    let mut ticket = ticket(id, "INICIADO", Some(started_at));
    ticket.service_id = Some("svc-1".into());
    ticket.service = Some(ServiceSummary {
        name: Some("Visita técnica".into()),
        price: 120.0,
        warranty: Some("90 dias".into()),
    });
    ticket
}

pub fn tracker(store: &Arc<MockStore>, clock: &ManualClock) -> Arc<ActiveTicketTracker> {
    Arc::new(ActiveTicketTracker::new(store.clone(), Arc::new(clock.clone())))
}
