//! Parsing and formatting helpers shared by the domain types

pub mod currency;
pub mod time;
