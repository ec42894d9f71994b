//! Editable completion form.
//!
//! Fields are held as the user typed them. Every read goes through
//! [`CompletionCalculator`], so what the form shows and what gets submitted
//! are computed the same way.

use chamados_domain::constants::DEFAULT_SERVICE_NAME;
use chamados_domain::{
    format_brl, format_elapsed, parse_currency, CompletionBreakdown, CompletionInput,
    CompletionResult, ServiceItem, Ticket, TotalOverride,
};
use chrono::NaiveDate;

use super::calculator::CompletionCalculator;
use super::defaults::{suggest_payment_date, BillingDefaults};

/// One editable service line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceItemField {
    pub name: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionForm {
    pub ticket_id: String,
    pub calculations_enabled: bool,
    pub service_items: Vec<ServiceItemField>,
    pub km_total: String,
    pub km_rate: String,
    pub km_charge_exempt: bool,
    pub additional_hour_rate: String,
    pub extra_expenses: String,
    pub expense_details: String,
    pub discount: String,
    pub included_hours: f64,
    pub warranty: String,
    pub payment_date: Option<NaiveDate>,
    pub payment_date_auto_filled: bool,
    pub should_issue_receipt: bool,
    elapsed_seconds: u64,
    total_override: TotalOverride,
    fallback_service_name: String,
}

impl CompletionForm {
    /// Open the form for `ticket`, prefilled from its billing defaults.
    pub fn open(ticket: &Ticket, elapsed_seconds: u64, today: NaiveDate) -> Self {
        let defaults = BillingDefaults::from_ticket(ticket);
        let payment = suggest_payment_date(ticket, today);

        Self {
            ticket_id: ticket.id.clone(),
            calculations_enabled: ticket.calculations_enabled,
            service_items: defaults
                .service_items
                .iter()
                .map(|item| ServiceItemField {
                    name: item.name.clone(),
                    amount: format_brl(item.amount),
                })
                .collect(),
            km_total: if defaults.km_total > 0.0 {
                defaults.km_total.to_string()
            } else {
                String::new()
            },
            km_rate: format_brl(defaults.km_rate),
            km_charge_exempt: false,
            additional_hour_rate: format_brl(defaults.additional_hour_rate),
            extra_expenses: String::new(),
            expense_details: String::new(),
            discount: String::new(),
            included_hours: defaults.included_hours,
            warranty: defaults.warranty,
            payment_date: Some(payment.date),
            payment_date_auto_filled: payment.auto_filled,
            should_issue_receipt: false,
            elapsed_seconds,
            total_override: TotalOverride::Calculated,
            fallback_service_name: ticket
                .service_name()
                .unwrap_or(DEFAULT_SERVICE_NAME)
                .to_string(),
        }
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Feed the latest tracker reading.
    pub fn set_elapsed_seconds(&mut self, seconds: u64) {
        self.elapsed_seconds = seconds;
    }

    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }

    pub fn add_service_item(&mut self) {
        self.service_items.push(ServiceItemField::default());
    }

    pub fn remove_service_item(&mut self, index: usize) {
        if index < self.service_items.len() {
            self.service_items.remove(index);
        }
    }

    pub fn set_payment_date(&mut self, date: Option<NaiveDate>) {
        self.payment_date = date;
        self.payment_date_auto_filled = false;
    }

    /// The user typed into the total field. Clearing it goes back to the
    /// calculated total.
    pub fn edit_total(&mut self, text: &str) {
        self.total_override = if text.trim().is_empty() {
            TotalOverride::Calculated
        } else {
            TotalOverride::Overridden(text.to_string())
        };
    }

    /// Discard any override.
    pub fn use_calculated_total(&mut self) {
        self.total_override = TotalOverride::Calculated;
    }

    pub fn total_override(&self) -> &TotalOverride {
        &self.total_override
    }

    /// Text for the total field: the user's own text while overridden,
    /// otherwise the freshly calculated total.
    pub fn total_display(&self) -> String {
        match &self.total_override {
            TotalOverride::Overridden(text) => text.clone(),
            TotalOverride::Calculated => format_brl(self.breakdown().total_with_discount),
        }
    }

    /// Parsed view of the fields.
    ///
    /// With calculations disabled only the service items count: mileage,
    /// extra hours, expenses, discount and any override are zeroed, so the
    /// total equals the base amount.
    pub fn input(&self) -> CompletionInput {
        let service_items = self
            .service_items
            .iter()
            .map(|field| ServiceItem::new(field.name.clone(), amount(&field.amount)))
            .collect();

        let mut input = CompletionInput {
            service_items,
            km_total: amount(&self.km_total),
            km_rate: amount(&self.km_rate),
            km_charge_exempt: self.km_charge_exempt,
            additional_hour_rate: amount(&self.additional_hour_rate),
            extra_expenses: amount(&self.extra_expenses),
            expense_details: self.expense_details.clone(),
            discount: amount(&self.discount),
            included_hours: self.included_hours,
            elapsed_seconds: self.elapsed_seconds,
            total_override: self.total_override.clone(),
            warranty: self.warranty.clone(),
            payment_date: self.payment_date,
            should_issue_receipt: self.should_issue_receipt,
        };

        if !self.calculations_enabled {
            input.km_total = 0.0;
            input.km_rate = 0.0;
            input.additional_hour_rate = 0.0;
            input.included_hours = 0.0;
            input.extra_expenses = 0.0;
            input.discount = 0.0;
            input.total_override = TotalOverride::Calculated;
        }
        input
    }

    pub fn breakdown(&self) -> CompletionBreakdown {
        CompletionCalculator::breakdown(&self.input())
    }

    pub fn is_in_extra_hours(&self) -> bool {
        self.calculations_enabled && self.breakdown().in_extra_hours
    }

    /// Payload for the `complete` call.
    pub fn submission(&self) -> CompletionResult {
        CompletionCalculator::finalize(&self.input(), &self.fallback_service_name)
    }
}

fn amount(text: &str) -> f64 {
    parse_currency(text).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use chamados_domain::{ServiceSummary, TotalAmount};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn ticket() -> Ticket {
        let mut ticket = Ticket::new("t1", "INICIADO");
        ticket.service = Some(ServiceSummary {
            name: Some("Visit".into()),
            price: 120.0,
            warranty: None,
        });
        ticket
    }

    fn filled_form() -> CompletionForm {
        let mut form = CompletionForm::open(&ticket(), 0, today());
        form.km_total = "10".into();
        form.km_rate = "R$ 1,50".into();
        form.extra_expenses = "R$ 20,00".into();
        form.discount = "10".into();
        form
    }

    #[test]
    fn opens_prefilled() {
        let form = CompletionForm::open(&ticket(), 42, today());

        assert_eq!(form.service_items.len(), 1);
        assert_eq!(form.service_items[0].name, "Visit");
        assert_eq!(form.service_items[0].amount, "R$ 120,00");
        assert_eq!(form.payment_date, Some(today()));
        assert!(form.payment_date_auto_filled);
        assert_eq!(form.elapsed_display(), "00:00:42");
    }

    #[test]
    fn live_total_tracks_edits() {
        let mut form = filled_form();
        assert_eq!(form.total_display(), "R$ 145,00");

        form.km_charge_exempt = true;
        assert_eq!(form.total_display(), "R$ 130,00");
    }

    #[test]
    fn override_then_clear_recomputes() {
        let mut form = filled_form();

        form.edit_total("200");
        assert_eq!(form.total_display(), "200");
        assert_eq!(form.breakdown().total, TotalAmount::Overridden(200.0));
        assert_eq!(form.submission().total_amount, 200.0);

        form.edit_total("");
        assert_eq!(form.total_override(), &TotalOverride::Calculated);
        assert_eq!(form.total_display(), "R$ 145,00");

        form.edit_total("R$ 99,90");
        form.use_calculated_total();
        assert_eq!(form.total_override(), &TotalOverride::Calculated);
        assert_eq!(form.submission().total_amount, 145.0);
    }

    #[test]
    fn disabled_calculations_bill_base_only() {
        let mut form = filled_form();
        form.calculations_enabled = false;
        form.included_hours = 1.0;
        form.set_elapsed_seconds(10_000);
        form.edit_total("500");

        let result = form.submission();
        assert_eq!(result.total_amount, 120.0);
        assert_eq!(result.discount, 0.0);
        assert_eq!(result.km_total, 0.0);
        assert!(!form.is_in_extra_hours());
    }

    #[test]
    fn blank_items_fall_back_to_service_name() {
        let mut form = filled_form();
        form.service_items = vec![ServiceItemField::default()];

        let result = form.submission();
        assert_eq!(result.service_items, vec![ServiceItem::new("Visit", 0.0)]);
    }

    #[test]
    fn manual_payment_date_is_not_auto_filled() {
        let mut form = filled_form();
        form.set_payment_date(NaiveDate::from_ymd_opt(2024, 3, 20));
        assert!(!form.payment_date_auto_filled);
        assert_eq!(form.submission().payment_date, NaiveDate::from_ymd_opt(2024, 3, 20));
    }
}
