//! Banner controller: rows, dialogs and unmount safety.

mod support;

use std::sync::Arc;

use chamados_core::tickets::{ActiveTicketBanner, BannerDialog, Outcome, TicketLifecycle};
use chamados_core::ManualClock;
use chamados_domain::constants::LOADING_PLACEHOLDER;
use chamados_domain::{CancellationSource, ChamadosError, Ticket, ValidationError};
use chrono::Duration;
use support::api::{ApiCall, MockTicketApi};
use support::fixtures::{billable, clock, ticket, tracker};
use support::notifier::RecordingNotifier;
use support::store::MockStore;

const STARTED: &str = "2024-03-01T11:00:00.000Z";

fn banner(clock: &ManualClock, api: Arc<MockTicketApi>, load_snapshot: bool) -> ActiveTicketBanner {
    let snapshot = load_snapshot.then(|| billable("t1", STARTED));
    banner_with(clock, api, snapshot)
}

fn banner_with(
    clock: &ManualClock,
    api: Arc<MockTicketApi>,
    snapshot: Option<Ticket>,
) -> ActiveTicketBanner {
    let store = Arc::new(MockStore::with_active(&[("t1", STARTED)]));
    let tracker = tracker(&store, clock);
    match snapshot {
        Some(ticket) => tracker.apply_server_tickets(vec![ticket]),
        None => tracker.reconcile(),
    };
    let lifecycle = Arc::new(TicketLifecycle::new(
        api,
        tracker,
        Arc::new(RecordingNotifier::default()),
    ));
    ActiveTicketBanner::new(lifecycle, Arc::new(clock.clone()))
}

#[test]
fn rows_show_placeholder_until_server_data_arrives() {
    let clock = clock();
    let banner = banner(&clock, Arc::new(MockTicketApi::default()), false);

    let rows = banner.tickets();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].loading);
    assert_eq!(rows[0].ticket.client.as_ref().unwrap().name, LOADING_PLACEHOLDER);
    assert_eq!(rows[0].elapsed_display, "01:00:00");
    assert!(banner.is_visible());
}

#[test]
fn completion_form_follows_the_clock() {
    let clock = clock();
    let mut banner = banner(&clock, Arc::new(MockTicketApi::default()), true);

    let form = banner.open_completion("t1").unwrap();
    assert_eq!(form.elapsed_seconds(), 3_600);
    assert_eq!(form.service_items[0].name, "Visita técnica");

    clock.advance(Duration::seconds(30));
    banner.sync_elapsed();
    assert_eq!(banner.completion_form_mut().unwrap().elapsed_seconds(), 3_630);

    assert!(banner.open_completion("unknown").is_none());
}

#[tokio::test]
async fn successful_completion_closes_dialog_and_drafts_receipt() {
    let clock = clock();
    let api = Arc::new(MockTicketApi::default());
    let mut banner = banner(&clock, api.clone(), true);

    banner.open_completion("t1").unwrap().should_issue_receipt = true;
    let outcome = banner.submit_completion().await.unwrap().unwrap();

    assert!(matches!(outcome, Outcome::Done(_)));
    assert_eq!(banner.dialog(), &BannerDialog::Closed);
    assert!(!banner.is_visible());
    let receipt = banner.take_receipt().unwrap();
    assert_eq!(receipt.ticket_id, "t1");
    assert_eq!(receipt.amount, 120.0);
}

#[tokio::test]
async fn completion_bills_time_worked_while_dialog_was_open() {
    let clock = clock();
    let api = Arc::new(MockTicketApi::default());
    let mut ticket = billable("t1", STARTED);
    ticket.duration = 1.0;
    ticket.additional_hour_rate = 60.0;
    let mut banner = banner_with(&clock, api.clone(), Some(ticket));

    let form = banner.open_completion("t1").unwrap();
    assert_eq!(form.elapsed_seconds(), 3_600);
    assert_eq!(form.total_display(), "R$ 120,00");

    clock.advance(Duration::hours(1));
    let outcome = banner.submit_completion().await.unwrap().unwrap();

    let Outcome::Done(sent) = outcome else { panic!("expected a completed ticket") };
    assert_eq!(sent.elapsed_seconds, 7_200);
    assert_eq!(sent.total_amount, 180.0);
    assert!(matches!(
        api.calls().as_slice(),
        [ApiCall::Complete(id, payload)] if id == "t1" && payload.elapsed_seconds == 7_200
    ));
}

#[tokio::test]
async fn completion_without_any_base_value_is_refused() {
    let clock = clock();
    let api = Arc::new(MockTicketApi::default());
    let bare = ticket("t1", "INICIADO", Some(STARTED));
    let mut banner = banner_with(&clock, api.clone(), Some(bare));

    let form = banner.open_completion("t1").unwrap();
    assert_eq!(form.total_display(), "R$ 0,00");
    let err = banner.submit_completion().await.unwrap().unwrap_err();

    assert_eq!(err, ChamadosError::Validation(ValidationError::MissingBaseValue));
    assert!(api.calls().is_empty());
    assert!(banner.is_visible());
    assert!(matches!(banner.dialog(), BannerDialog::Complete { .. }));

    // An amount typed into the service line is enough to bill.
    banner.completion_form_mut().unwrap().service_items[0].amount = "R$ 80,00".into();
    let outcome = banner.submit_completion().await.unwrap().unwrap();
    assert!(matches!(outcome, Outcome::Done(sent) if sent.base_amount == 80.0));
}

#[tokio::test]
async fn failed_completion_keeps_dialog_open() {
    let clock = clock();
    let api = Arc::new(MockTicketApi::default());
    api.queue_complete(Err(ChamadosError::Network("offline".into())));
    let mut banner = banner(&clock, api.clone(), true);

    banner.open_completion("t1").unwrap().discount = "10".into();
    assert!(banner.submit_completion().await.unwrap().is_err());

    assert_eq!(banner.completion_form_mut().unwrap().discount, "10");
    assert!(!banner.is_submitting());
    assert!(banner.is_visible());
}

#[tokio::test]
async fn unmounted_banner_leaves_state_alone() {
    let clock = clock();
    let api = Arc::new(MockTicketApi::default());
    let mut banner = banner(&clock, api.clone(), true);
    let handle = banner.mount_handle();
    api.on_call(move || handle.unmount());

    banner.open_completion("t1");
    let result = banner.submit_completion().await.unwrap();

    assert!(result.is_ok());
    assert!(matches!(banner.dialog(), BannerDialog::Complete { .. }));
    assert!(banner.is_submitting());
    assert!(banner.take_receipt().is_none());
}

#[tokio::test]
async fn cancellation_dialog_sends_chosen_source() {
    let clock = clock();
    let api = Arc::new(MockTicketApi::default());
    let mut banner = banner(&clock, api.clone(), true);

    assert!(banner.confirm_cancellation().await.is_none());

    banner.open_cancellation("t1");
    banner.set_cancellation("Cliente ausente", CancellationSource::Technician);
    let outcome = banner.confirm_cancellation().await.unwrap().unwrap();

    assert_eq!(outcome, Outcome::Done(()));
    assert_eq!(banner.dialog(), &BannerDialog::Closed);
    assert!(!banner.is_visible());
}
