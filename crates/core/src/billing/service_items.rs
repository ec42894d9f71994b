//! Service item clean-up and summaries.

use chamados_domain::constants::ADDITIONAL_SERVICE_PREFIX;
use chamados_domain::ServiceItem;

use super::calculator::non_negative;

/// Clean up the user's item list before submission.
///
/// Names are trimmed. An unnamed item with a positive amount is named after
/// its position in the original list (`Additional service 2`); an unnamed,
/// zero-amount item is dropped. If nothing survives, one item named
/// `fallback_name` carrying `fallback_amount` is returned.
pub fn normalize_service_items(
    items: &[ServiceItem],
    fallback_name: &str,
    fallback_amount: f64,
) -> Vec<ServiceItem> {
    let mut normalized: Vec<ServiceItem> = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let amount = non_negative(item.amount);
            let name = item.name.trim();
            if !name.is_empty() {
                Some(ServiceItem::new(name, amount))
            } else if amount > 0.0 {
                Some(ServiceItem::new(format!("{ADDITIONAL_SERVICE_PREFIX} {}", index + 1), amount))
            } else {
                None
            }
        })
        .collect();

    if normalized.is_empty() {
        normalized.push(ServiceItem::new(fallback_name.trim(), non_negative(fallback_amount)));
    }
    normalized
}

/// Items as a receipt shows them: trimmed names, blank names and non-positive
/// amounts removed.
pub fn coerce_service_items(items: &[ServiceItem]) -> Vec<ServiceItem> {
    items
        .iter()
        .filter_map(|item| {
            let name = item.name.trim();
            let amount = non_negative(item.amount);
            (!name.is_empty() && amount > 0.0).then(|| ServiceItem::new(name, amount))
        })
        .collect()
}

/// One-line description of the work done.
///
/// One or two names are joined with `" + "`; longer lists show the first name
/// and a count of the rest. Without named items, `fallback` is used.
pub fn build_service_summary(items: &[ServiceItem], fallback: &str) -> String {
    let names: Vec<&str> =
        items.iter().map(|item| item.name.trim()).filter(|name| !name.is_empty()).collect();

    match names.as_slice() {
        [] => fallback.to_string(),
        [only] => (*only).to_string(),
        [first, second] => format!("{first} + {second}"),
        [first, rest @ ..] => format!("{first} + {} servicos", rest.len()),
    }
}
