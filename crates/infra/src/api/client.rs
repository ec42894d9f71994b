//! REST client for the ticket backend
//!
//! Implements the core [`TicketApi`] port over [`HttpClient`]. A 404 becomes
//! [`ChamadosError::NotFound`]; any other non-success status becomes
//! [`ChamadosError::BackendRejection`] carrying the body's `message` when it
//! has one.

use std::time::Duration;

use async_trait::async_trait;
use chamados_core::TicketApi;
use chamados_domain::{
    ApiConfig, CancellationRequest, ChamadosError, CompletionResult, Result, Ticket,
};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Configuration for [`TicketApiClient`]
#[derive(Debug, Clone)]
pub struct TicketApiClientConfig {
    /// Base URL including the API prefix (e.g., "http://localhost:5000/api")
    pub base_url: String,
    pub timeout: Duration,
    /// Attempts for idempotent requests
    pub max_attempts: usize,
    /// Bearer token sent with every request
    pub token: Option<String>,
}

impl Default for TicketApiClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for TicketApiClientConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_seconds.max(1)),
            max_attempts: config.max_attempts.max(1) as usize,
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
        }
    }
}

/// Ticket list responses come bare or wrapped, depending on the endpoint
/// version.
#[derive(Deserialize)]
#[serde(untagged)]
enum TicketList {
    Bare(Vec<Ticket>),
    Wrapped { tickets: Vec<Ticket> },
    Data { data: Vec<Ticket> },
}

impl From<TicketList> for Vec<Ticket> {
    fn from(list: TicketList) -> Self {
        match list {
            TicketList::Bare(tickets)
            | TicketList::Wrapped { tickets }
            | TicketList::Data { data: tickets } => tickets,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

pub struct TicketApiClient {
    http: HttpClient,
    config: TicketApiClientConfig,
}

impl TicketApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built
    pub fn new(config: TicketApiClientConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .user_agent(concat!("chamados/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(TicketApiClientConfig::from(config))
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        let builder = self.http.request(method, url).header("Accept", "application/json");
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder, path: &str) -> Result<Response> {
        let response = self.http.send(builder).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(path, %status, "Backend returned error status");
        Err(map_status_error(status, path, &body))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        response.json::<T>().await.map_err(|err| InfraError::from(err).into())
    }
}

fn ticket_path(ticket_id: &str) -> String {
    format!("/tickets/{ticket_id}")
}

/// Map a non-success response to the domain taxonomy.
fn map_status_error(status: StatusCode, path: &str, body: &str) -> ChamadosError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let text = body.trim();
            if text.is_empty() || text.starts_with('<') {
                String::new()
            } else {
                text.to_string()
            }
        });

    if status == StatusCode::NOT_FOUND {
        let detail = if message.is_empty() { format!("{path} returned 404") } else { message };
        return ChamadosError::NotFound(detail);
    }

    ChamadosError::BackendRejection { status: status.as_u16(), message }
}

#[async_trait]
impl TicketApi for TicketApiClient {
    #[instrument(skip(self))]
    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        let path = "/tickets";
        let response = self.execute(self.request(Method::GET, path), path).await?;
        let tickets: Vec<Ticket> = Self::read_json::<TicketList>(response).await?.into();
        debug!(count = tickets.len(), "Fetched tickets");
        Ok(tickets)
    }

    #[instrument(skip(self))]
    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket> {
        let path = ticket_path(ticket_id);
        let response = self.execute(self.request(Method::GET, &path), &path).await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self))]
    async fn check_in(&self, ticket_id: &str) -> Result<Ticket> {
        let path = format!("{}/check-in", ticket_path(ticket_id));
        let builder = self.request(Method::POST, &path).json(&serde_json::json!({}));
        let response = self.execute(builder, &path).await?;
        let ticket = Self::read_json(response).await?;
        info!(ticket_id, "Check-in accepted");
        Ok(ticket)
    }

    #[instrument(skip(self, payload), fields(total = payload.total_amount))]
    async fn complete(&self, ticket_id: &str, payload: &CompletionResult) -> Result<()> {
        let path = format!("{}/complete", ticket_path(ticket_id));
        self.execute(self.request(Method::POST, &path).json(payload), &path).await?;
        info!(ticket_id, "Completion accepted");
        Ok(())
    }

    #[instrument(skip(self, request))]
    async fn cancel(&self, ticket_id: &str, request: &CancellationRequest) -> Result<()> {
        let path = format!("{}/cancel", ticket_path(ticket_id));
        self.execute(self.request(Method::POST, &path).json(request), &path).await?;
        info!(ticket_id, "Cancellation accepted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, ticket_id: &str) -> Result<()> {
        let path = ticket_path(ticket_id);
        self.execute(self.request(Method::DELETE, &path), &path).await?;
        info!(ticket_id, "Ticket deleted");
        Ok(())
    }
}
