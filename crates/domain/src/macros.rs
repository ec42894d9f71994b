//! Macro for implementing Display and FromStr for wire-label enums
//!
//! The backend exchanges several closed vocabularies as upper-case labels
//! (`"EMPRESA_PARCEIRA"`, `"TECNICO"`). This macro generates the two-way
//! mapping once so every enum parses and prints its labels the same way.
//!
//! # Example
//!
//! ```rust
//! use chamados_domain::impl_wire_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Phone,
//!     Email,
//! }
//!
//! impl_wire_label_conversions!(Channel {
//!     Phone => "TELEFONE",
//!     Email => "EMAIL",
//! });
//!
//! assert_eq!("telefone".parse::<Channel>(), Ok(Channel::Phone));
//! assert_eq!(Channel::Email.to_string(), "EMAIL");
//! ```

/// Implements Display and FromStr for enums carried as upper-case labels
///
/// - Display writes the canonical label
/// - FromStr trims and matches case-insensitively against the labels
///
/// Labels must be written in upper case.
#[macro_export]
macro_rules! impl_wire_label_conversions {
    ($enum_name:ident { $($variant:ident => $label:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical wire label.
            pub fn as_label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_label())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Shift {
        Morning,
        Night,
    }

    impl_wire_label_conversions!(Shift {
        Morning => "MANHA",
        Night => "NOITE",
    });

    #[test]
    fn display_writes_canonical_label() {
        assert_eq!(Shift::Morning.to_string(), "MANHA");
        assert_eq!(Shift::Night.as_label(), "NOITE");
    }

    #[test]
    fn parsing_ignores_case_and_padding() {
        assert_eq!(Shift::from_str("manha").unwrap(), Shift::Morning);
        assert_eq!(Shift::from_str("  Noite ").unwrap(), Shift::Night);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = Shift::from_str("tarde").unwrap_err();
        assert!(err.contains("Invalid Shift: tarde"));
        assert!(Shift::from_str("").is_err());
    }
}
