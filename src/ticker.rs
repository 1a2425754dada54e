use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::ValidationError;

const MAX_LEN: usize = 12;

/// Upper-cased exchange symbol, e.g. `AAPL`, `BRK.B` or `^GSPC`.
#[derive(Serialize, Deserialize, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let symbol = value.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^');
        if symbol.len() > MAX_LEN || !symbol.chars().all(allowed) {
            return Err(ValidationError::InvalidTicker(value.trim().to_string()));
        }
        Ok(Self(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Ticker {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: &String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}
