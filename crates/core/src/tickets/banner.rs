//! Controller behind the active-ticket banner.
//!
//! Lists the running tickets with their elapsed time and drives the complete
//! and cancel dialogs. State is only touched after an await while the banner
//! is still mounted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chamados_domain::{
    format_elapsed, CancellationRequest, CancellationSource, CompletionResult, ReceiptDraft,
    Result, Ticket,
};
use tracing::debug;

use super::lifecycle::{Outcome, TicketLifecycle};
use crate::billing::{build_receipt_draft, CompletionForm};
use crate::clock::Clock;

/// One row of the banner.
#[derive(Debug, Clone, PartialEq)]
pub struct BannerTicket {
    pub ticket: Ticket,
    pub elapsed_seconds: u64,
    pub elapsed_display: String,
    /// No server data for the ticket yet.
    pub loading: bool,
}

/// Shared flag cleared when the banner goes away.
#[derive(Debug, Clone)]
pub struct MountHandle(Arc<AtomicBool>);

impl MountHandle {
    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BannerDialog {
    Closed,
    Complete { ticket: Ticket, form: CompletionForm },
    Cancel { ticket_id: String, reason: String, source: CancellationSource },
}

pub struct ActiveTicketBanner {
    lifecycle: Arc<TicketLifecycle>,
    clock: Arc<dyn Clock>,
    dialog: BannerDialog,
    receipt: Option<ReceiptDraft>,
    submitting: bool,
    mounted: MountHandle,
}

impl ActiveTicketBanner {
    pub fn new(lifecycle: Arc<TicketLifecycle>, clock: Arc<dyn Clock>) -> Self {
        Self {
            lifecycle,
            clock,
            dialog: BannerDialog::Closed,
            receipt: None,
            submitting: false,
            mounted: MountHandle(Arc::new(AtomicBool::new(true))),
        }
    }

    pub fn mount_handle(&self) -> MountHandle {
        self.mounted.clone()
    }

    /// Running tickets in display order.
    pub fn tickets(&self) -> Vec<BannerTicket> {
        let tracker = self.lifecycle.tracker();
        let elapsed = tracker.elapsed();

        tracker
            .active()
            .into_iter()
            .map(|entry| {
                let server = tracker.find_server_ticket(&entry.ticket_id);
                let loading = server.is_none();
                let ticket = server.unwrap_or_else(|| {
                    Ticket::loading_placeholder(&entry.ticket_id, &entry.started_at)
                });
                let seconds = elapsed.get(&entry.ticket_id).copied().unwrap_or_else(|| {
                    tracker.elapsed_seconds(&entry.ticket_id, Some(&entry.started_at), None)
                });
                BannerTicket {
                    ticket,
                    elapsed_seconds: seconds,
                    elapsed_display: format_elapsed(seconds),
                    loading,
                }
            })
            .collect()
    }

    pub fn is_visible(&self) -> bool {
        !self.lifecycle.tracker().active().is_empty()
    }

    pub fn dialog(&self) -> &BannerDialog {
        &self.dialog
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn close_dialog(&mut self) {
        self.dialog = BannerDialog::Closed;
    }

    /// Open the completion dialog for an active ticket.
    pub fn open_completion(&mut self, ticket_id: &str) -> Option<&mut CompletionForm> {
        let tracker = self.lifecycle.tracker();
        let entry = tracker.active().into_iter().find(|e| e.ticket_id == ticket_id)?;
        let ticket = tracker
            .find_server_ticket(ticket_id)
            .unwrap_or_else(|| Ticket::loading_placeholder(ticket_id, &entry.started_at));
        let elapsed = tracker.elapsed_seconds(ticket_id, None, None);
        let form = CompletionForm::open(&ticket, elapsed, self.clock.now().date_naive());

        self.dialog = BannerDialog::Complete { ticket, form };
        self.completion_form_mut()
    }

    pub fn completion_form_mut(&mut self) -> Option<&mut CompletionForm> {
        match &mut self.dialog {
            BannerDialog::Complete { form, .. } => Some(form),
            _ => None,
        }
    }

    /// Push the tracker's current reading into an open completion form.
    pub fn sync_elapsed(&mut self) {
        let tracker = Arc::clone(self.lifecycle.tracker());
        if let BannerDialog::Complete { ticket, form } = &mut self.dialog {
            form.set_elapsed_seconds(tracker.elapsed_seconds(&ticket.id, None, None));
        }
    }

    /// Submit the open completion form. `None` when no form is open.
    ///
    /// Elapsed time is read from the tracker at submission, so hours worked
    /// while the dialog was open are billed. On success the dialog closes
    /// and, if requested, a receipt draft is prepared. On failure the dialog
    /// stays open with the user's input.
    pub async fn submit_completion(&mut self) -> Option<Result<Outcome<CompletionResult>>> {
        self.sync_elapsed();
        let BannerDialog::Complete { ticket, form } = &self.dialog else {
            return None;
        };
        let ticket = ticket.clone();
        let payload = form.submission();
        let issue_receipt = form.should_issue_receipt;

        self.submitting = true;
        let result = self.lifecycle.complete(&ticket, payload).await;
        if !self.mounted.is_mounted() {
            debug!(ticket_id = %ticket.id, "Banner unmounted during completion");
            return Some(result);
        }
        self.submitting = false;

        match &result {
            Ok(Outcome::Done(sent)) => {
                if issue_receipt {
                    self.receipt = Some(build_receipt_draft(&ticket, sent));
                }
                self.dialog = BannerDialog::Closed;
            }
            Ok(Outcome::Gone) => self.dialog = BannerDialog::Closed,
            Err(_) => {}
        }
        Some(result)
    }

    pub fn open_cancellation(&mut self, ticket_id: &str) {
        self.dialog = BannerDialog::Cancel {
            ticket_id: ticket_id.to_string(),
            reason: String::new(),
            source: CancellationSource::default(),
        };
    }

    pub fn set_cancellation(&mut self, new_reason: &str, new_source: CancellationSource) {
        if let BannerDialog::Cancel { reason, source, .. } = &mut self.dialog {
            *reason = new_reason.to_string();
            *source = new_source;
        }
    }

    /// Confirm the open cancellation dialog. `None` when none is open.
    pub async fn confirm_cancellation(&mut self) -> Option<Result<Outcome<()>>> {
        let BannerDialog::Cancel { ticket_id, reason, source } = &self.dialog else {
            return None;
        };
        let ticket_id = ticket_id.clone();
        let request = CancellationRequest::new(reason, *source);

        self.submitting = true;
        let result = self.lifecycle.cancel(&ticket_id, request).await;
        if !self.mounted.is_mounted() {
            debug!(ticket_id = %ticket_id, "Banner unmounted during cancellation");
            return Some(result);
        }
        self.submitting = false;

        if result.is_ok() {
            self.dialog = BannerDialog::Closed;
        }
        Some(result)
    }

    /// Receipt prepared by the last completion, if any.
    pub fn take_receipt(&mut self) -> Option<ReceiptDraft> {
        self.receipt.take()
    }
}
