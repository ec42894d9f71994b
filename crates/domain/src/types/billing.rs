//! Completion inputs, the computed breakdown, and the payloads sent to the
//! backend when a ticket is finished or cancelled.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::amount;
use crate::constants::DEFAULT_CANCELLATION_REASON;
use crate::impl_wire_label_conversions;
use crate::utils::currency::parse_currency;

/// One billable line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub amount: f64,
}

impl ServiceItem {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self { name: name.into(), amount }
    }
}

/// Whether the user typed their own total.
///
/// The text is kept as typed so the field can be redisplayed verbatim; it only
/// becomes a number when the breakdown is computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TotalOverride {
    #[default]
    Calculated,
    Overridden(String),
}

impl TotalOverride {
    /// The override as a number, when set and parseable.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Calculated => None,
            Self::Overridden(text) => parse_currency(text),
        }
    }

    pub fn is_overridden(&self) -> bool {
        matches!(self, Self::Overridden(_))
    }
}

/// Final amount and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "source", content = "value", rename_all = "camelCase")]
pub enum TotalAmount {
    Calculated(f64),
    Overridden(f64),
}

impl TotalAmount {
    pub fn value(&self) -> f64 {
        match self {
            Self::Calculated(value) | Self::Overridden(value) => *value,
        }
    }
}

/// Everything the user fills in when finishing a ticket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionInput {
    pub service_items: Vec<ServiceItem>,
    pub km_total: f64,
    pub km_rate: f64,
    pub km_charge_exempt: bool,
    pub additional_hour_rate: f64,
    pub extra_expenses: f64,
    pub expense_details: String,
    pub discount: f64,
    /// Hours covered by the base price.
    pub included_hours: f64,
    pub elapsed_seconds: u64,
    pub total_override: TotalOverride,
    pub warranty: String,
    pub payment_date: Option<NaiveDate>,
    pub should_issue_receipt: bool,
}

/// Intermediate values of the pricing formula, shared by display and payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionBreakdown {
    pub base_amount: f64,
    pub elapsed_hours: f64,
    pub extra_hours: f64,
    pub extra_hours_value: f64,
    pub km_value_raw: f64,
    pub km_value: f64,
    pub calculated_total: f64,
    /// Discount after clamping at zero.
    pub discount: f64,
    pub total_with_discount: f64,
    pub total: TotalAmount,
    pub in_extra_hours: bool,
}

impl CompletionBreakdown {
    pub fn total_amount(&self) -> f64 {
        self.total.value()
    }
}

/// Body of `POST /tickets/{id}/complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub base_amount: f64,
    pub total_amount: f64,
    pub discount: f64,
    pub service_items: Vec<ServiceItem>,
    pub km_total: f64,
    pub km_rate: f64,
    pub km_charge_exempt: bool,
    pub additional_hour_rate: f64,
    pub extra_expenses: f64,
    pub expense_details: String,
    pub elapsed_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
}

impl CompletionResult {
    /// Whether any service line carries a positive amount.
    ///
    /// A placeholder line added for display does not count.
    pub fn has_billable_items(&self) -> bool {
        self.service_items.iter().any(|item| item.amount.is_finite() && item.amount > 0.0)
    }

    /// Same payload without `warranty`, for backends that reject the field.
    pub fn without_warranty(&self) -> Self {
        Self { warranty: None, ..self.clone() }
    }
}

/// Who asked for the cancellation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancellationSource {
    #[default]
    #[serde(rename = "CLIENTE")]
    Client,
    #[serde(rename = "TECNICO")]
    Technician,
}

impl_wire_label_conversions!(CancellationSource {
    Client => "CLIENTE",
    Technician => "TECNICO",
});

/// Body of `POST /tickets/{id}/cancel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequest {
    pub cancellation_reason: String,
    pub cancellation_source: CancellationSource,
}

impl CancellationRequest {
    /// Blank reasons fall back to the default wording.
    pub fn new(reason: &str, source: CancellationSource) -> Self {
        let reason = reason.trim();
        let cancellation_reason = if reason.is_empty() {
            DEFAULT_CANCELLATION_REASON.to_string()
        } else {
            reason.to_string()
        };
        Self { cancellation_reason, cancellation_source: source }
    }
}
