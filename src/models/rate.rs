use rust_decimal::Decimal;

use crate::models::TipType;
use crate::types::{parse_percent, Cents};

/// A resolved adjustment: either a fixed number of cents or a percentage of some base amount.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RateMode {
    Fixed(Cents),
    Percentage(Decimal)
}

impl RateMode {
    /// The amount this mode contributes on top of `base`.
    pub fn amount_on(&self, base: Cents) -> Cents {
        match self {
            RateMode::Fixed(cents) => *cents,
            RateMode::Percentage(rate) => base.apply_rate(*rate)
        }
    }

    pub fn is_positive(&self) -> bool {
        match self {
            RateMode::Fixed(cents) => cents.is_positive(),
            RateMode::Percentage(rate) => rate.is_sign_positive() && !rate.is_zero()
        }
    }

    pub fn fixed_cents(&self) -> Option<Cents> {
        match self {
            RateMode::Fixed(cents) => Some(*cents),
            RateMode::Percentage(_) => None
        }
    }

    pub fn rate(&self) -> Option<Decimal> {
        match self {
            RateMode::Fixed(_) => None,
            RateMode::Percentage(rate) => Some(*rate)
        }
    }
}

/// The raw text a user typed into one adjustment field, tagged with the selected mode.
///
/// Only one variant exists at a time, so switching from fixed to percentage (or back) drops
/// whatever was typed for the other mode.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum RateEntry {
    Fixed(String),
    Percentage(String)
}

impl RateEntry {
    pub fn fixed(text: &str) -> Self {
        RateEntry::Fixed(text.to_string())
    }

    pub fn percentage(text: &str) -> Self {
        RateEntry::Percentage(text.to_string())
    }

    /// Parses the entered text leniently; malformed text resolves to a zero amount or rate.
    pub fn resolve(&self) -> RateMode {
        match self {
            RateEntry::Fixed(text) => RateMode::Fixed(Cents::parse_lenient(text)),
            RateEntry::Percentage(text) => RateMode::Percentage(parse_percent(text))
        }
    }

    pub fn tip_type(&self) -> TipType {
        match self {
            RateEntry::Fixed(_) => TipType::Fixed,
            RateEntry::Percentage(_) => TipType::Percentage
        }
    }

    pub fn text(&self) -> &str {
        match self {
            RateEntry::Fixed(text) | RateEntry::Percentage(text) => text
        }
    }
}

impl Default for RateEntry {
    fn default() -> Self {
        RateEntry::Fixed(String::new())
    }
}
