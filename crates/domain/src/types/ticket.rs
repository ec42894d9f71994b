//! Ticket as returned by the backend, plus the client and service it
//! references.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::amount;
use super::billing::ServiceItem;
use super::status::TicketStatus;
use crate::constants::LOADING_PLACEHOLDER;
use crate::impl_wire_label_conversions;

/// Kind of client, which decides where billing defaults come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClientType {
    /// Pessoa física.
    #[default]
    Individual,
    /// Pessoa jurídica.
    Business,
    /// Company with negotiated per-client pricing and payment cycle.
    PartnerCompany,
}

impl_wire_label_conversions!(ClientType {
    Individual => "PF",
    Business => "PJ",
    PartnerCompany => "EMPRESA_PARCEIRA",
});

impl ClientType {
    /// Parse a backend label, also accepting the English names.
    /// Unknown labels are treated as individuals.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| match raw.trim().to_uppercase().as_str() {
            "BUSINESS" => Self::Business,
            "PARTNER_COMPANY" => Self::PartnerCompany,
            _ => Self::Individual,
        })
    }
}

impl Serialize for ClientType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_label())
    }
}

impl<'de> Deserialize<'de> for ClientType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse_lenient).unwrap_or_default())
    }
}

/// Client fields the billing engine reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub client_type: ClientType,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub default_ticket_value: f64,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub default_hours_included: f64,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub default_km_rate: f64,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub default_additional_hour_rate: f64,
    #[serde(default)]
    pub payment_cycle_start_day: Option<u32>,
    #[serde(default)]
    pub payment_cycle_end_day: Option<u32>,
    #[serde(default)]
    pub payment_due_day: Option<u32>,
}

/// Catalog service attached to a ticket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub price: f64,
    #[serde(default)]
    pub warranty: Option<String>,
}

/// Service ticket, restricted to the fields tracking and billing use.
///
/// Timestamps stay as the backend sent them; use the accessors, which treat
/// blank values as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "started_at")]
    pub started_at: Option<String>,
    #[serde(default, alias = "stopped_at")]
    pub stopped_at: Option<String>,
    #[serde(default, alias = "completed_at")]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub ticket_number: Option<String>,
    #[serde(default)]
    pub client: Option<ClientSummary>,
    #[serde(default)]
    pub service: Option<ServiceSummary>,
    #[serde(default)]
    pub service_id: Option<String>,
    #[serde(default = "calculations_enabled_default")]
    pub calculations_enabled: bool,
    #[serde(default, deserialize_with = "amount::lenient_opt")]
    pub ticket_value: Option<f64>,
    #[serde(default, alias = "service_items")]
    pub service_items: Option<Vec<ServiceItem>>,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub km_total: f64,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub km_rate: f64,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub additional_hour_rate: f64,
    /// Scheduled duration in hours.
    #[serde(default, deserialize_with = "amount::lenient")]
    pub duration: f64,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub warranty: Option<String>,
}

fn calculations_enabled_default() -> bool {
    true
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Ticket {
    /// Ticket with only `id` and `status` set.
    pub fn new(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
            started_at: None,
            stopped_at: None,
            completed_at: None,
            user_id: None,
            ticket_number: None,
            client: None,
            service: None,
            service_id: None,
            calculations_enabled: true,
            ticket_value: None,
            service_items: None,
            km_total: 0.0,
            km_rate: 0.0,
            additional_hour_rate: 0.0,
            duration: 0.0,
            scheduled_date: None,
            payment_date: None,
            warranty: None,
        }
    }

    /// Stand-in shown while the ticket list is still loading.
    pub fn loading_placeholder(id: impl Into<String>, started_at: impl Into<String>) -> Self {
        let mut ticket = Self::new(id, TicketStatus::Started.backend_code());
        ticket.started_at = Some(started_at.into());
        ticket.client =
            Some(ClientSummary { name: LOADING_PLACEHOLDER.to_string(), ..Default::default() });
        ticket.service = Some(ServiceSummary {
            name: Some(LOADING_PLACEHOLDER.to_string()),
            ..Default::default()
        });
        ticket
    }

    pub fn status(&self) -> TicketStatus {
        TicketStatus::normalize(&self.status)
    }

    pub fn started_at(&self) -> Option<&str> {
        non_blank(&self.started_at)
    }

    pub fn stopped_at(&self) -> Option<&str> {
        non_blank(&self.stopped_at)
    }

    pub fn completed_at(&self) -> Option<&str> {
        non_blank(&self.completed_at)
    }

    /// Closed by status, or carrying a stop/completion timestamp.
    pub fn is_closed(&self) -> bool {
        self.status().is_closed() || self.stopped_at().is_some() || self.completed_at().is_some()
    }

    /// Started on the server and not yet stopped.
    pub fn is_running(&self) -> bool {
        self.status() == TicketStatus::Started
            && self.started_at().is_some()
            && self.stopped_at().is_none()
    }

    pub fn client_type(&self) -> ClientType {
        self.client.as_ref().map(|c| c.client_type).unwrap_or_default()
    }

    pub fn service_name(&self) -> Option<&str> {
        self.service.as_ref().and_then(|s| non_blank(&s.name))
    }

    /// Non-zero ticket value, if one was recorded.
    pub fn ticket_value(&self) -> Option<f64> {
        self.ticket_value.filter(|v| *v != 0.0)
    }

    pub fn has_service(&self) -> bool {
        non_blank(&self.service_id).is_some()
    }
}
