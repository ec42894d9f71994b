//! Scripted `TicketApi`.
//!
//! Each endpoint answers from a queue of canned responses and falls back to a
//! happy-path default once the queue is empty. Every call is recorded along
//! with the persisted ledger as it was when the request went out.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chamados_core::TicketApi;
use chamados_domain::{
    ActiveTicketMap, CancellationRequest, ChamadosError, CompletionResult,
    Result as DomainResult, Ticket,
};
use parking_lot::Mutex;

use super::store::MockStore;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    List,
    Get(String),
    CheckIn(String),
    Complete(String, CompletionResult),
    Cancel(String, CancellationRequest),
    Delete(String),
}

type Hook = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct MockTicketApi {
    tickets: Mutex<Vec<Ticket>>,
    list: Mutex<VecDeque<DomainResult<Vec<Ticket>>>>,
    check_in: Mutex<VecDeque<DomainResult<Ticket>>>,
    complete: Mutex<VecDeque<DomainResult<()>>>,
    cancel: Mutex<VecDeque<DomainResult<()>>>,
    delete: Mutex<VecDeque<DomainResult<()>>>,
    calls: Mutex<Vec<(ApiCall, ActiveTicketMap)>>,
    probe: Option<Arc<MockStore>>,
    on_call: Mutex<Option<Hook>>,
}

impl MockTicketApi {
    pub fn new(tickets: Vec<Ticket>) -> Self {
        Self { tickets: Mutex::new(tickets), ..Default::default() }
    }

    /// Record `store`'s active map alongside every call.
    pub fn probing(mut self, store: &Arc<MockStore>) -> Self {
        self.probe = Some(store.clone());
        self
    }

    /// Run `hook` inside every call, before it answers.
    pub fn on_call(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_call.lock() = Some(Box::new(hook));
    }

    pub fn set_tickets(&self, tickets: Vec<Ticket>) {
        *self.tickets.lock() = tickets;
    }

    pub fn queue_list(&self, response: DomainResult<Vec<Ticket>>) {
        self.list.lock().push_back(response);
    }

    pub fn queue_check_in(&self, response: DomainResult<Ticket>) {
        self.check_in.lock().push_back(response);
    }

    pub fn queue_complete(&self, response: DomainResult<()>) {
        self.complete.lock().push_back(response);
    }

    pub fn queue_cancel(&self, response: DomainResult<()>) {
        self.cancel.lock().push_back(response);
    }

    pub fn queue_delete(&self, response: DomainResult<()>) {
        self.delete.lock().push_back(response);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().iter().map(|(call, _)| call.clone()).collect()
    }

    /// Ledger contents seen by each call.
    pub fn ledger_at_calls(&self) -> Vec<ActiveTicketMap> {
        self.calls.lock().iter().map(|(_, map)| map.clone()).collect()
    }

    fn record(&self, call: ApiCall) {
        let ledger = self.probe.as_ref().map(|s| s.active_map()).unwrap_or_default();
        self.calls.lock().push((call, ledger));
        if let Some(hook) = self.on_call.lock().as_ref() {
            hook();
        }
    }
}

fn not_found(id: &str) -> ChamadosError {
    ChamadosError::NotFound(format!("ticket {id}"))
}

#[async_trait]
impl TicketApi for MockTicketApi {
    async fn list_tickets(&self) -> DomainResult<Vec<Ticket>> {
        self.record(ApiCall::List);
        let queued = self.list.lock().pop_front();
        queued.unwrap_or_else(|| Ok(self.tickets.lock().clone()))
    }

    async fn get_ticket(&self, ticket_id: &str) -> DomainResult<Ticket> {
        self.record(ApiCall::Get(ticket_id.to_string()));
        self.tickets
            .lock()
            .iter()
            .find(|t| t.id == ticket_id)
            .cloned()
            .ok_or_else(|| not_found(ticket_id))
    }

    async fn check_in(&self, ticket_id: &str) -> DomainResult<Ticket> {
        self.record(ApiCall::CheckIn(ticket_id.to_string()));
        let queued = self.check_in.lock().pop_front();
        queued.unwrap_or_else(|| {
            let mut ticket = Ticket::new(ticket_id, "INICIADO");
            ticket.started_at = Some("2024-03-01T11:59:58.000Z".into());
            Ok(ticket)
        })
    }

    async fn complete(&self, ticket_id: &str, payload: &CompletionResult) -> DomainResult<()> {
        self.record(ApiCall::Complete(ticket_id.to_string(), payload.clone()));
        self.complete.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn cancel(&self, ticket_id: &str, request: &CancellationRequest) -> DomainResult<()> {
        self.record(ApiCall::Cancel(ticket_id.to_string(), request.clone()));
        self.cancel.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn delete(&self, ticket_id: &str) -> DomainResult<()> {
        self.record(ApiCall::Delete(ticket_id.to_string()));
        self.delete.lock().pop_front().unwrap_or(Ok(()))
    }
}
