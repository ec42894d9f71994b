//! Serde helpers for backend decimals.
//!
//! Decimal columns reach the client as JSON numbers, decimal strings, empty
//! strings or `null` depending on the endpoint. These deserializers accept all
//! of them.

use serde::{Deserialize, Deserializer};

use crate::utils::currency::parse_decimal_value;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Flag(bool),
}

impl RawAmount {
    fn into_value(self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(value),
            Self::Number(_) | Self::Flag(_) => None,
            Self::Text(text) if text.trim().is_empty() => None,
            Self::Text(text) => Some(parse_decimal_value(&text)),
        }
    }
}

/// Missing, `null`, blank or unparseable becomes `0.0`.
pub(crate) fn lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;
    Ok(raw.and_then(RawAmount::into_value).unwrap_or(0.0))
}

/// Like [`lenient`] but keeps "not set" (`null`, blank) distinct from zero.
pub(crate) fn lenient_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;
    Ok(raw.and_then(RawAmount::into_value))
}
