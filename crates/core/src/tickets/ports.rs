//! Ticket backend and notification port interfaces

use async_trait::async_trait;
use chamados_domain::{CancellationRequest, CompletionResult, Notice, Result, Ticket};

/// Trait for the ticket backend.
///
/// Implementations map an unknown ticket to
/// [`ChamadosError::NotFound`](chamados_domain::ChamadosError::NotFound) and
/// a rejected request to
/// [`ChamadosError::BackendRejection`](chamados_domain::ChamadosError::BackendRejection)
/// carrying the server's message.
#[async_trait]
pub trait TicketApi: Send + Sync {
    /// Full ticket list for the signed-in user
    async fn list_tickets(&self) -> Result<Vec<Ticket>>;

    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket>;

    /// Start work on a ticket. The returned ticket carries the server's
    /// `startedAt`.
    async fn check_in(&self, ticket_id: &str) -> Result<Ticket>;

    async fn complete(&self, ticket_id: &str, payload: &CompletionResult) -> Result<()>;

    async fn cancel(&self, ticket_id: &str, request: &CancellationRequest) -> Result<()>;

    async fn delete(&self, ticket_id: &str) -> Result<()>;
}

/// Sink for user-facing notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
