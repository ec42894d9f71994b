//! Completion pricing.
//!
//! The formula is applied in a fixed order:
//!
//! ```text
//! base              = sum(service item amounts)
//! extra_hours       = included > 0 ? max(0, elapsed_h - included) : 0
//! extra_hours_value = extra_hours * additional_hour_rate
//! km_value          = exempt ? 0 : km_total * km_rate
//! calculated_total  = base + extra_hours_value + km_value + extra_expenses
//! with_discount     = max(0, calculated_total - max(0, discount))
//! total             = override (when set and parseable) else with_discount
//! ```

use chamados_domain::constants::{EXTRA_HOURS_GRACE_SECONDS, SECONDS_PER_HOUR};
use chamados_domain::{
    CompletionBreakdown, CompletionInput, CompletionResult, ServiceItem, TotalAmount,
};

use super::service_items::normalize_service_items;

/// Stateless pricing engine. Same input, same output.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionCalculator;

impl CompletionCalculator {
    /// Evaluate the formula over `input` as given.
    pub fn breakdown(input: &CompletionInput) -> CompletionBreakdown {
        let base_amount: f64 =
            input.service_items.iter().map(|item| non_negative(item.amount)).sum();

        let included_hours = non_negative(input.included_hours);
        let elapsed_hours = input.elapsed_seconds as f64 / SECONDS_PER_HOUR as f64;
        let extra_hours =
            if included_hours > 0.0 { (elapsed_hours - included_hours).max(0.0) } else { 0.0 };
        let extra_hours_value = extra_hours * non_negative(input.additional_hour_rate);

        let km_value_raw = non_negative(input.km_total) * non_negative(input.km_rate);
        let km_value = if input.km_charge_exempt { 0.0 } else { km_value_raw };

        let calculated_total =
            base_amount + extra_hours_value + km_value + non_negative(input.extra_expenses);
        let discount = non_negative(input.discount);
        let total_with_discount = (calculated_total - discount).max(0.0);

        let total = match input.total_override.amount() {
            Some(value) => TotalAmount::Overridden(value),
            None => TotalAmount::Calculated(total_with_discount),
        };

        CompletionBreakdown {
            base_amount,
            elapsed_hours,
            extra_hours,
            extra_hours_value,
            km_value_raw,
            km_value,
            calculated_total,
            discount,
            total_with_discount,
            total,
            in_extra_hours: Self::is_in_extra_hours(included_hours, input.elapsed_seconds),
        }
    }

    /// Past the included allotment by more than the grace period.
    pub fn is_in_extra_hours(included_hours: f64, elapsed_seconds: u64) -> bool {
        if included_hours <= 0.0 || !included_hours.is_finite() {
            return false;
        }
        let threshold = included_hours * SECONDS_PER_HOUR as f64 + EXTRA_HOURS_GRACE_SECONDS as f64;
        elapsed_seconds as f64 >= threshold
    }

    /// Normalize the service items and build the payload sent to the backend.
    ///
    /// `fallback_service_name` names the single item synthesized when no
    /// usable item remains.
    pub fn finalize(input: &CompletionInput, fallback_service_name: &str) -> CompletionResult {
        let raw_base: f64 = input.service_items.iter().map(|item| non_negative(item.amount)).sum();
        let service_items =
            normalize_service_items(&input.service_items, fallback_service_name, raw_base);

        let normalized = CompletionInput { service_items, ..input.clone() };
        let breakdown = Self::breakdown(&normalized);

        let warranty =
            Some(normalized.warranty.trim()).filter(|w| !w.is_empty()).map(str::to_string);

        CompletionResult {
            base_amount: breakdown.base_amount,
            total_amount: breakdown.total_amount(),
            discount: breakdown.discount,
            service_items: normalized.service_items,
            km_total: non_negative(normalized.km_total),
            km_rate: non_negative(normalized.km_rate),
            km_charge_exempt: normalized.km_charge_exempt,
            additional_hour_rate: non_negative(normalized.additional_hour_rate),
            extra_expenses: non_negative(normalized.extra_expenses),
            expense_details: normalized.expense_details.trim().to_string(),
            elapsed_seconds: normalized.elapsed_seconds,
            payment_date: normalized.payment_date,
            warranty,
        }
    }

    /// Sum of item amounts, ignoring negative and non-finite values.
    pub fn subtotal(items: &[ServiceItem]) -> f64 {
        items.iter().map(|item| non_negative(item.amount)).sum()
    }
}

pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
