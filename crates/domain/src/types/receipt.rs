//! Receipt data handed to the document renderer.

use chrono::NaiveDate;
use serde::Serialize;

/// A line on the receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub description: String,
    pub amount: f64,
}

/// Amounts and lines for one receipt.
///
/// `amount` is what the client pays. The discount has already been taken out
/// of it; `original_amount` is the pre-discount figure shown for reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDraft {
    pub ticket_id: String,
    pub ticket_number: Option<String>,
    pub client_name: String,
    pub service_summary: String,
    pub amount: f64,
    pub discount: f64,
    pub original_amount: f64,
    pub lines: Vec<ReceiptLine>,
    pub warranty: Option<String>,
    pub payment_date: Option<NaiveDate>,
}
