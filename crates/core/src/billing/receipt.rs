//! Receipt data derived from a completed ticket.

use chamados_domain::constants::{
    DEFAULT_SERVICE_NAME, RECEIPT_EXTRA_COST_LABEL, RECEIPT_MILEAGE_LABEL,
};
use chamados_domain::{format_brl, CompletionResult, ReceiptDraft, ReceiptLine, Ticket};

use super::service_items::{build_service_summary, coerce_service_items};

const MILEAGE_KEYWORDS: &[&str] = &["km", "desloc"];
const EXTRA_COST_KEYWORDS: &[&str] = &["adicional", "despesa", "extra"];

/// Build the receipt for a completion.
///
/// The receipt amount is the completion's `total_amount`, which already has
/// the discount applied; it is never subtracted a second time.
pub fn build_receipt_draft(ticket: &Ticket, result: &CompletionResult) -> ReceiptDraft {
    let items = coerce_service_items(&result.service_items);
    let fallback = ticket.service_name().unwrap_or(DEFAULT_SERVICE_NAME);

    let mut lines: Vec<ReceiptLine> = items
        .iter()
        .map(|item| ReceiptLine { description: item.name.clone(), amount: item.amount })
        .collect();

    let mentions = |keywords: &[&str]| {
        items.iter().any(|item| {
            let name = item.name.to_lowercase();
            keywords.iter().any(|k| name.contains(k))
        })
    };

    let km_value = result.km_total * result.km_rate;
    if km_value > 0.0 && !result.km_charge_exempt && !mentions(MILEAGE_KEYWORDS) {
        lines.push(ReceiptLine {
            description: format!(
                "{RECEIPT_MILEAGE_LABEL} ({} km x {})",
                result.km_total,
                format_brl(result.km_rate)
            ),
            amount: km_value,
        });
    }

    if result.extra_expenses > 0.0 && !mentions(EXTRA_COST_KEYWORDS) {
        lines.push(ReceiptLine {
            description: RECEIPT_EXTRA_COST_LABEL.to_string(),
            amount: result.extra_expenses,
        });
    }

    let discount =
        if result.discount.is_finite() && result.discount > 0.0 { result.discount } else { 0.0 };
    let amount = if result.total_amount.is_finite() { result.total_amount } else { 0.0 };

    ReceiptDraft {
        ticket_id: ticket.id.clone(),
        ticket_number: ticket.ticket_number.clone(),
        client_name: ticket.client.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
        service_summary: build_service_summary(&items, fallback),
        amount,
        discount,
        original_amount: amount + discount,
        lines,
        warranty: result.warranty.clone(),
        payment_date: result.payment_date,
    }
}
