//! Ticket lifecycle use cases
//!
//! Every transition that takes a ticket out of the active set updates the
//! tracker before the request is sent. A failed request puts the state back;
//! a 404 means the ticket is already gone and is treated as success.

use std::sync::Arc;

use chamados_domain::{
    CancellationRequest, ChamadosError, CompletionResult, Notice, Result, Ticket, ValidationError,
};
use tracing::{info, warn};

use super::ports::{Notifier, TicketApi};
use crate::tracking::{ActiveTicketTracker, TicketEnding};

const WARRANTY_FIELD: &str = "warranty";

const CHECK_IN_DONE: (&str, &str) = ("Check-in realizado", "Atendimento iniciado com sucesso.");
const CHECK_IN_FAILED: (&str, &str) =
    ("Erro ao fazer check-in", "Não foi possível iniciar o atendimento. Tente novamente.");
const COMPLETE_DONE: (&str, &str) = ("Chamado finalizado", "O chamado foi concluído com sucesso.");
const COMPLETE_FAILED: (&str, &str) =
    ("Erro ao finalizar", "Não foi possível finalizar o chamado. Tente novamente.");
const CANCEL_DONE: (&str, &str) =
    ("Chamado cancelado", "O chamado foi cancelado e voltou para o status aberto.");
const CANCEL_FAILED: (&str, &str) =
    ("Erro ao cancelar", "Não foi possível cancelar o chamado. Tente novamente.");
const DELETE_DONE: (&str, &str) = ("Chamado excluído", "O chamado foi excluído com sucesso.");
const DELETE_FAILED: (&str, &str) =
    ("Erro ao excluir chamado", "Não foi possível excluir o chamado. Tente novamente.");
const NOT_FOUND: (&str, &str) =
    ("Chamado não encontrado", "O chamado não foi encontrado no sistema. O banner foi fechado.");

/// Result of a lifecycle action that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    /// The backend no longer knows the ticket; local state was cleared.
    Gone,
}

impl<T> Outcome<T> {
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Gone)
    }
}

/// Tickets removed by [`TicketLifecycle::delete_tickets`] and the ones that
/// could not be.
#[derive(Debug, Default)]
pub struct DeletionReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, ChamadosError)>,
}

pub struct TicketLifecycle {
    api: Arc<dyn TicketApi>,
    tracker: Arc<ActiveTicketTracker>,
    notifier: Arc<dyn Notifier>,
}

impl TicketLifecycle {
    pub fn new(
        api: Arc<dyn TicketApi>,
        tracker: Arc<ActiveTicketTracker>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { api, tracker, notifier }
    }

    pub fn tracker(&self) -> &Arc<ActiveTicketTracker> {
        &self.tracker
    }

    /// Fetch the ticket list and reconcile against it.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<usize> {
        let tickets = self.api.list_tickets().await?;
        let count = tickets.len();
        self.tracker.apply_server_tickets(tickets);
        Ok(count)
    }

    /// Start work on a ticket.
    ///
    /// The ledger entry is written from the local clock before the request
    /// and replaced with the server's `startedAt` once it answers.
    pub async fn check_in(&self, ticket_id: &str) -> Result<Outcome<Ticket>> {
        let previous = self.tracker.ledger().load().remove(ticket_id);
        self.tracker.begin_now(ticket_id);

        match self.api.check_in(ticket_id).await {
            Ok(ticket) => {
                if let Some(server_start) = ticket.started_at() {
                    self.tracker.confirm_started_at(ticket_id, server_start);
                }
                self.tracker.upsert_server_ticket(ticket.clone());
                info!(ticket_id, "Checked in");
                self.notify_info(CHECK_IN_DONE);
                Ok(Outcome::Done(ticket))
            }
            Err(err) if err.is_not_found() => {
                self.converge_gone(ticket_id);
                Ok(Outcome::Gone)
            }
            Err(err) => {
                warn!(ticket_id, error = %err, "Check-in failed");
                self.tracker.abandon(ticket_id, previous);
                self.notify_failure(CHECK_IN_FAILED, &err);
                Err(err)
            }
        }
    }

    /// Submit a completion.
    ///
    /// Without a ticket value, a linked service or a priced service item
    /// there is nothing to bill: the submission is rejected before anything
    /// changes.
    /// A backend that rejects the `warranty` field gets one retry without it.
    pub async fn complete(
        &self,
        ticket: &Ticket,
        payload: CompletionResult,
    ) -> Result<Outcome<CompletionResult>> {
        let ticket_id = ticket.id.as_str();
        let current = self.tracker.find_server_ticket(ticket_id);
        let context = current.as_ref().unwrap_or(ticket);

        if context.ticket_value().is_none()
            && !context.has_service()
            && !payload.has_billable_items()
        {
            let err = ChamadosError::from(ValidationError::MissingBaseValue);
            self.notify_failure(COMPLETE_FAILED, &err);
            return Err(err);
        }

        let ended = self.tracker.end(ticket_id, TicketEnding::Completed);

        let sent = match self.api.complete(ticket_id, &payload).await {
            Err(err) if err.mentions_field(WARRANTY_FIELD) => {
                warn!(ticket_id, error = %err, "Backend rejected warranty, retrying without it");
                let fallback = payload.without_warranty();
                self.api.complete(ticket_id, &fallback).await.map(|()| fallback)
            }
            other => other.map(|()| payload),
        };

        match sent {
            Ok(sent) => {
                info!(ticket_id, total = sent.total_amount, "Ticket completed");
                self.notify_info(COMPLETE_DONE);
                Ok(Outcome::Done(sent))
            }
            Err(err) if err.is_not_found() => {
                self.converge_gone(ticket_id);
                Ok(Outcome::Gone)
            }
            Err(err) => {
                warn!(ticket_id, error = %err, "Completion failed");
                self.tracker.restore(ended);
                self.notify_failure(COMPLETE_FAILED, &err);
                Err(err)
            }
        }
    }

    /// Cancel a ticket back to open.
    ///
    /// A ticket missing from the snapshot is fetched first so a ticket that
    /// no longer exists converges without a cancel request.
    pub async fn cancel(
        &self,
        ticket_id: &str,
        request: CancellationRequest,
    ) -> Result<Outcome<()>> {
        if self.tracker.find_server_ticket(ticket_id).is_none() {
            match self.api.get_ticket(ticket_id).await {
                Ok(ticket) => self.tracker.upsert_server_ticket(ticket),
                Err(err) if err.is_not_found() => {
                    self.converge_gone(ticket_id);
                    return Ok(Outcome::Gone);
                }
                Err(err) => warn!(ticket_id, error = %err, "Could not fetch ticket before cancel"),
            }
        }

        let ended = self.tracker.end(ticket_id, TicketEnding::Cancelled);

        match self.api.cancel(ticket_id, &request).await {
            Ok(()) => {
                info!(ticket_id, source = %request.cancellation_source, "Ticket cancelled");
                self.notify_info(CANCEL_DONE);
                Ok(Outcome::Done(()))
            }
            Err(err) if err.is_not_found() => {
                self.converge_gone(ticket_id);
                Ok(Outcome::Gone)
            }
            Err(err) => {
                warn!(ticket_id, error = %err, "Cancellation failed");
                self.tracker.restore(ended);
                self.notify_failure(CANCEL_FAILED, &err);
                Err(err)
            }
        }
    }

    /// Delete tickets. Every ledger entry is dropped before the first
    /// request; entries whose deletion fails are put back.
    pub async fn delete_tickets(&self, ticket_ids: &[String]) -> DeletionReport {
        let ended: Vec<_> =
            ticket_ids.iter().map(|id| self.tracker.end(id, TicketEnding::Gone)).collect();

        let mut report = DeletionReport::default();
        for ended in ended {
            let ticket_id = ended.ticket_id.clone();
            match self.api.delete(&ticket_id).await {
                Ok(()) => report.deleted.push(ticket_id),
                Err(err) if err.is_not_found() => report.deleted.push(ticket_id),
                Err(err) => {
                    warn!(ticket_id = %ticket_id, error = %err, "Deletion failed");
                    self.tracker.restore(ended);
                    report.failed.push((ticket_id, err));
                }
            }
        }

        match report.failed.first() {
            None if !report.deleted.is_empty() => self.notify_info(DELETE_DONE),
            Some((_, err)) => self.notify_failure(DELETE_FAILED, err),
            None => {}
        }
        report
    }

    fn converge_gone(&self, ticket_id: &str) {
        info!(ticket_id, "Ticket no longer exists on the backend");
        self.tracker.end(ticket_id, TicketEnding::Gone);
        self.notifier.notify(Notice::destructive(NOT_FOUND.0, NOT_FOUND.1));
    }

    fn notify_info(&self, (title, description): (&str, &str)) {
        self.notifier.notify(Notice::info(title, description));
    }

    fn notify_failure(&self, (title, generic): (&str, &str), err: &ChamadosError) {
        self.notifier.notify(Notice::destructive(title, err.user_message(generic)));
    }
}
