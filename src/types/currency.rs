use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// ISO currency code carried next to amounts for display. Arithmetic never looks at it.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Self {
        CurrencyCode(code.trim().to_uppercase())
    }

    pub fn usd() -> Self {
        CurrencyCode::new("USD")
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    //NOTE: Only USD is mapped today, every other code falls back to the dollar sign as well.
    pub fn symbol(&self) -> &'static str {
        match self.0.as_str() {
            "USD" => "$",
            _ => "$"
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        CurrencyCode::usd()
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
