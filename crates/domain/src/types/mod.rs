//! Domain types and models

mod amount;
pub mod active;
pub mod billing;
pub mod notice;
pub mod receipt;
pub mod status;
pub mod ticket;

pub use active::{entries_from_map, ActiveTicketEntry, ActiveTicketMap, ElapsedTimes};
pub use billing::{
    CancellationRequest, CancellationSource, CompletionBreakdown, CompletionInput,
    CompletionResult, ServiceItem, TotalAmount, TotalOverride,
};
pub use notice::{Notice, NoticeLevel};
pub use receipt::{ReceiptDraft, ReceiptLine};
pub use status::{TicketStatus, STATUS_SYNONYMS};
pub use ticket::{ClientSummary, ClientType, ServiceSummary, Ticket};
