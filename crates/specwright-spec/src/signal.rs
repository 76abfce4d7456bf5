//! Stop-signal parsing.

use std::str::FromStr;

use nix::sys::signal::Signal;
use specwright_common::error::{Result, SpecError};

/// Parses a signal given by name (`SIGTERM`, `term`) or number (`15`).
///
/// # Errors
///
/// Returns [`SpecError::Validation`] if the input names no known signal.
pub fn parse_signal(input: &str) -> Result<Signal> {
    let trimmed = input.trim();
    if let Ok(number) = trimmed.parse::<i32>() {
        return Signal::try_from(number)
            .map_err(|_| SpecError::validation(format!("invalid signal number {number}")));
    }
    let upper = trimmed.to_ascii_uppercase();
    let name = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{upper}")
    };
    Signal::from_str(&name).map_err(|_| SpecError::validation(format!("invalid signal {input:?}")))
}

/// Serde helpers for an optional signal stored by name.
pub mod option_name {
    use nix::sys::signal::Signal;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes the signal as its `SIG`-prefixed name.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &Option<Signal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(sig) => serializer.serialize_some(sig.as_str()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes a signal name or number.
    ///
    /// # Errors
    ///
    /// Fails if the stored value names no known signal.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Signal>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| super::parse_signal(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_name() {
        assert_eq!(parse_signal("SIGTERM").expect("parse"), Signal::SIGTERM);
    }

    #[test]
    fn parses_bare_lowercase_name() {
        assert_eq!(parse_signal("kill").expect("parse"), Signal::SIGKILL);
    }

    #[test]
    fn parses_number() {
        assert_eq!(parse_signal("2").expect("parse"), Signal::SIGINT);
    }

    #[test]
    fn rejects_unknown_names_and_numbers() {
        assert!(parse_signal("SIGBOGUS").is_err());
        assert!(parse_signal("999").is_err());
        assert!(parse_signal("").is_err());
    }
}
