//! Prefill values for the completion form.
//!
//! Partner companies are billed from the client's negotiated defaults;
//! individuals and businesses from the service booked on the ticket. Either
//! way the ticket's own values fill any gap.

use chamados_domain::constants::DEFAULT_SERVICE_NAME;
use chamados_domain::{parse_timestamp, ClientType, ServiceItem, Ticket};
use chrono::{Datelike, Days, Months, NaiveDate};

const DEFAULT_CYCLE_START_DAY: u32 = 1;
const DEFAULT_CYCLE_END_DAY: u32 = 30;

/// Starting values for a ticket's completion.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingDefaults {
    pub base_amount: f64,
    pub service_items: Vec<ServiceItem>,
    pub km_total: f64,
    pub km_rate: f64,
    pub additional_hour_rate: f64,
    pub included_hours: f64,
    pub warranty: String,
}

/// Suggested payment date and whether it was derived rather than recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentDateSuggestion {
    pub date: NaiveDate,
    pub auto_filled: bool,
}

impl BillingDefaults {
    pub fn from_ticket(ticket: &Ticket) -> Self {
        let client = ticket.client.clone().unwrap_or_default();
        let ticket_value = ticket.ticket_value().unwrap_or(0.0);

        let (base_amount, km_rate, additional_hour_rate, included_hours) =
            match ticket.client_type() {
                ClientType::PartnerCompany => (
                    or_fallback(client.default_ticket_value, ticket_value),
                    or_fallback(client.default_km_rate, ticket.km_rate),
                    or_fallback(client.default_additional_hour_rate, ticket.additional_hour_rate),
                    or_fallback(client.default_hours_included, ticket.duration),
                ),
                ClientType::Individual | ClientType::Business => {
                    let price = ticket.service.as_ref().map(|s| s.price).unwrap_or(0.0);
                    (
                        or_fallback(price, ticket_value),
                        ticket.km_rate,
                        or_fallback(
                            ticket.additional_hour_rate,
                            client.default_additional_hour_rate,
                        ),
                        ticket.duration,
                    )
                }
            };

        let service_items = match ticket.service_items.as_deref() {
            Some(items) if !items.is_empty() => items.to_vec(),
            _ => vec![ServiceItem::new(
                ticket.service_name().unwrap_or(DEFAULT_SERVICE_NAME),
                base_amount,
            )],
        };

        let service_warranty = ticket.service.as_ref().and_then(|s| s.warranty.as_deref());
        let warranty = [ticket.warranty.as_deref(), service_warranty]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|w| !w.is_empty())
            .unwrap_or_default()
            .to_string();

        Self {
            base_amount,
            service_items,
            km_total: ticket.km_total,
            km_rate,
            additional_hour_rate,
            included_hours,
            warranty,
        }
    }
}

/// Pick the payment date to prefill.
///
/// A recorded payment date is used as is. Partner companies with a due day
/// get one derived from their billing cycle; everyone else gets `today`.
pub fn suggest_payment_date(ticket: &Ticket, today: NaiveDate) -> PaymentDateSuggestion {
    if let Some(recorded) = ticket.payment_date.as_deref().and_then(parse_date) {
        return PaymentDateSuggestion { date: recorded, auto_filled: false };
    }

    let cycle_date = ticket
        .client
        .as_ref()
        .filter(|client| client.client_type == ClientType::PartnerCompany)
        .and_then(|client| {
            let due_day = client.payment_due_day.filter(|d| *d > 0)?;
            let scheduled = ticket.scheduled_date.as_deref().and_then(parse_date).unwrap_or(today);
            cycle_due_date(
                scheduled,
                client
                    .payment_cycle_start_day
                    .filter(|d| *d > 0)
                    .unwrap_or(DEFAULT_CYCLE_START_DAY),
                client.payment_cycle_end_day.filter(|d| *d > 0).unwrap_or(DEFAULT_CYCLE_END_DAY),
                due_day,
            )
        });

    PaymentDateSuggestion { date: cycle_date.unwrap_or(today), auto_filled: true }
}

/// Due date for work scheduled on `scheduled`.
///
/// Work inside `[start_day, end_day]` is due on `due_day` of the following
/// month. Outside the cycle it is due this month, or next month when
/// `due_day` has already passed. A `due_day` past the end of the month rolls
/// over into the next one (day 31 of April is May 1st).
pub fn cycle_due_date(
    scheduled: NaiveDate,
    start_day: u32,
    end_day: u32,
    due_day: u32,
) -> Option<NaiveDate> {
    let day = scheduled.day();
    let in_cycle = (start_day..=end_day).contains(&day);
    let next_month = in_cycle || due_day < day;

    let month_start = scheduled.with_day(1)?;
    let month_start =
        if next_month { month_start.checked_add_months(Months::new(1))? } else { month_start };

    month_start.checked_add_days(Days::new(u64::from(due_day.saturating_sub(1))))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    parse_timestamp(raw)
        .map(|ts| ts.date_naive())
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

fn or_fallback(preferred: f64, fallback: f64) -> f64 {
    if preferred != 0.0 {
        preferred
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use chamados_domain::{ClientSummary, ServiceSummary};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn partner_ticket() -> Ticket {
        let mut ticket = Ticket::new("t1", "INICIADO");
        ticket.client = Some(ClientSummary {
            client_type: ClientType::PartnerCompany,
            default_ticket_value: 300.0,
            default_km_rate: 0.0,
            default_hours_included: 0.0,
            default_additional_hour_rate: 45.0,
            payment_cycle_start_day: Some(1),
            payment_cycle_end_day: Some(15),
            payment_due_day: Some(10),
            ..Default::default()
        });
        ticket.km_rate = 1.2;
        ticket.duration = 4.0;
        ticket
    }

    #[test]
    fn partner_defaults_come_from_client_with_ticket_fallback() {
        let defaults = BillingDefaults::from_ticket(&partner_ticket());

        assert_eq!(defaults.base_amount, 300.0);
        assert_eq!(defaults.km_rate, 1.2);
        assert_eq!(defaults.additional_hour_rate, 45.0);
        assert_eq!(defaults.included_hours, 4.0);
        assert_eq!(defaults.service_items, vec![ServiceItem::new(DEFAULT_SERVICE_NAME, 300.0)]);
    }

    #[test]
    fn individual_defaults_come_from_service() {
        let mut ticket = Ticket::new("t1", "INICIADO");
        ticket.client = Some(ClientSummary {
            default_additional_hour_rate: 60.0,
            ..Default::default()
        });
        ticket.service = Some(ServiceSummary {
            name: Some("Formatação".into()),
            price: 0.0,
            warranty: Some("90 dias".into()),
        });
        ticket.ticket_value = Some(180.0);
        ticket.duration = 2.0;

        let defaults = BillingDefaults::from_ticket(&ticket);

        assert_eq!(defaults.base_amount, 180.0);
        assert_eq!(defaults.additional_hour_rate, 60.0);
        assert_eq!(defaults.included_hours, 2.0);
        assert_eq!(defaults.warranty, "90 dias");
        assert_eq!(defaults.service_items, vec![ServiceItem::new("Formatação", 180.0)]);
    }

    #[test]
    fn existing_items_are_reused() {
        let mut ticket = partner_ticket();
        ticket.service_items = Some(vec![ServiceItem::new("Visita", 90.0)]);
        ticket.warranty = Some("30 dias".into());

        let defaults = BillingDefaults::from_ticket(&ticket);
        assert_eq!(defaults.service_items, vec![ServiceItem::new("Visita", 90.0)]);
        assert_eq!(defaults.warranty, "30 dias");
    }

    #[test]
    fn cycle_dates() {
        // Inside the cycle: due next month.
        assert_eq!(cycle_due_date(date(2024, 1, 5), 1, 15, 10), Some(date(2024, 2, 10)));
        // Outside, due day still ahead: this month.
        assert_eq!(cycle_due_date(date(2024, 1, 20), 1, 15, 25), Some(date(2024, 1, 25)));
        // Outside, due day passed: next month.
        assert_eq!(cycle_due_date(date(2024, 1, 20), 1, 15, 10), Some(date(2024, 2, 10)));
        // Year rollover.
        assert_eq!(cycle_due_date(date(2024, 12, 3), 1, 30, 5), Some(date(2025, 1, 5)));
        // Day overflow rolls into the following month.
        assert_eq!(cycle_due_date(date(2024, 1, 10), 1, 30, 31), Some(date(2024, 3, 2)));
    }

    #[test]
    fn payment_date_suggestions() {
        let today = date(2024, 3, 1);

        let mut recorded = partner_ticket();
        recorded.payment_date = Some("2024-04-15T00:00:00.000Z".into());
        assert_eq!(
            suggest_payment_date(&recorded, today),
            PaymentDateSuggestion { date: date(2024, 4, 15), auto_filled: false }
        );

        let mut scheduled = partner_ticket();
        scheduled.scheduled_date = Some("2024-02-20T13:00:00.000Z".into());
        assert_eq!(
            suggest_payment_date(&scheduled, today),
            PaymentDateSuggestion { date: date(2024, 3, 10), auto_filled: true }
        );

        let individual = Ticket::new("t2", "INICIADO");
        assert_eq!(
            suggest_payment_date(&individual, today),
            PaymentDateSuggestion { date: today, auto_filled: true }
        );
    }
}
