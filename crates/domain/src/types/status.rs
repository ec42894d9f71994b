//! Ticket lifecycle status and its legacy spellings.
//!
//! The backend has stored status under several vocabularies over time
//! (Portuguese codes, English words, kebab and snake case, with and without
//! accents). Every raw value is folded into [`TicketStatus`] through
//! [`STATUS_SYNONYMS`], which is the single place new spellings get added.

use serde::{Deserialize, Serialize};

/// Normalized ticket lifecycle: `Open -> Started -> Completed | Cancelled`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    #[default]
    Open,
    Started,
    Completed,
    Cancelled,
}

/// Raw status spellings (upper-cased) and what they mean.
pub const STATUS_SYNONYMS: &[(&str, TicketStatus)] = &[
    ("ABERTO", TicketStatus::Open),
    ("OPEN", TicketStatus::Open),
    ("PENDENTE", TicketStatus::Open),
    ("PENDING", TicketStatus::Open),
    ("AGENDADO", TicketStatus::Open),
    ("SCHEDULED", TicketStatus::Open),
    ("INICIADO", TicketStatus::Started),
    ("STARTED", TicketStatus::Started),
    ("EXECUCAO", TicketStatus::Started),
    ("EXECUÇÃO", TicketStatus::Started),
    ("EM_ANDAMENTO", TicketStatus::Started),
    ("IN_PROGRESS", TicketStatus::Started),
    ("IN-PROGRESS", TicketStatus::Started),
    ("CONCLUIDO", TicketStatus::Completed),
    ("CONCLUÍDO", TicketStatus::Completed),
    ("COMPLETED", TicketStatus::Completed),
    ("FINALIZADO", TicketStatus::Completed),
    ("CANCELADO", TicketStatus::Cancelled),
    ("CANCELLED", TicketStatus::Cancelled),
    ("CANCELED", TicketStatus::Cancelled),
    ("NO_SHOW", TicketStatus::Cancelled),
    ("NO-SHOW", TicketStatus::Cancelled),
];

impl TicketStatus {
    /// Look up a raw status. `None` when the spelling is unknown.
    pub fn lookup(raw: &str) -> Option<Self> {
        let key = raw.trim().to_uppercase();
        STATUS_SYNONYMS.iter().find(|(spelling, _)| *spelling == key).map(|(_, status)| *status)
    }

    /// Fold any raw status into the closed set. Unknown or blank is `Open`.
    pub fn normalize(raw: &str) -> Self {
        Self::lookup(raw).unwrap_or_default()
    }

    /// Code the backend expects when this client writes a status.
    pub fn backend_code(&self) -> &'static str {
        match self {
            Self::Open => "ABERTO",
            Self::Started => "INICIADO",
            Self::Completed => "CONCLUIDO",
            Self::Cancelled => "CANCELADO",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Open => "OPEN",
            Self::Started => "STARTED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| format!("Invalid TicketStatus: {s}"))
    }
}
