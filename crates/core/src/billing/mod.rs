//! Completion billing: pricing formula, form state, defaults and receipts

pub mod calculator;
pub mod defaults;
pub mod form;
pub mod receipt;
pub mod service_items;

pub use calculator::CompletionCalculator;
pub use defaults::{cycle_due_date, suggest_payment_date, BillingDefaults, PaymentDateSuggestion};
pub use form::{CompletionForm, ServiceItemField};
pub use receipt::build_receipt_draft;
pub use service_items::{build_service_summary, coerce_service_items, normalize_service_items};
