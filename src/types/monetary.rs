use crate::types::currency::CurrencyCode;
use crate::types::errors::MonetaryError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::AddAssign;
use std::str::FromStr;
use tracing::{error, warn};

const DECIMAL_PLACES: usize = 2;
const SCALE: i64 = 10i64.pow(DECIMAL_PLACES as u32);

/// Largest amount accepted at the parse boundary ($100bn). Anything above is treated as malformed,
/// which keeps every sum of four components far away from `i64` overflow.
pub const MAX_CENTS: i64 = 10_000_000_000_000;

/// An integer number of minor currency units.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub const fn new(value: i64) -> Self {
        Cents(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Cents) -> Option<Cents> {
        self.0.checked_add(rhs.0).map(Cents)
    }

    pub fn checked_sub(self, rhs: Cents) -> Option<Cents> {
        self.0.checked_sub(rhs.0).map(Cents)
    }

    /// Subtraction floored at zero.
    pub fn floor_sub(self, rhs: Cents) -> Cents {
        Cents(self.0.saturating_sub(rhs.0).max(0))
    }

    /// Clamps negative values to zero.
    pub fn non_negative(self) -> Cents {
        Cents(self.0.max(0))
    }

    /// Converts an exact decimal amount of major units to cents, rounding half away from zero.
    pub fn from_decimal(amount: Decimal) -> Option<Cents> {
        amount.checked_mul(Decimal::from(SCALE))
            .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|rounded| rounded.to_i64())
            .filter(|value| value.abs() <= MAX_CENTS)
            .map(Cents)
    }

    /// Computes `round(self * rate / 100)` with the same half-away-from-zero rule used at the
    /// parse boundary. Results that cannot be represented degrade to zero.
    pub fn apply_rate(self, rate: Decimal) -> Cents {
        let applied = Decimal::from(self.0)
            .checked_mul(rate)
            .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
            .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|rounded| rounded.to_i64())
            .filter(|value| value.abs() <= MAX_CENTS);

        match applied {
            Some(value) => Cents(value),
            None => {
                warn!("Rate [{rate}] applied to [{}] is out of range, using zero", self);
                Cents::ZERO
            }
        }
    }

    /// Parses user-entered text without ever failing.
    ///
    /// Blank, malformed, negative or out-of-range text is a valid "no amount yet" state and
    /// yields zero. A leading currency symbol and `,` grouping separators are ignored.
    pub fn parse_lenient(text: &str) -> Cents {
        let sanitized = sanitize(text);

        if sanitized.is_empty() {
            return Cents::ZERO;
        }

        match Decimal::from_str(&sanitized).ok().and_then(Cents::from_decimal) {
            Some(cents) if cents.0 >= 0 => cents,
            Some(_) => {
                warn!("Negative amount [{text}] clamped to zero");
                Cents::ZERO
            }
            None => {
                warn!("Malformed amount [{text}] treated as zero");
                Cents::ZERO
            }
        }
    }

    /// Renders the amount with the currency symbol, e.g. `$12.88`.
    pub fn format(&self, currency: &CurrencyCode) -> String {
        let text = self.to_string();

        match text.strip_prefix('-') {
            Some(magnitude) => format!("-{}{}", currency.symbol(), magnitude),
            None => format!("{}{}", currency.symbol(), text)
        }
    }
}

impl AddAssign<Cents> for Cents {
    fn add_assign(&mut self, rhs: Cents) {
        if let Some(new_val) = self.checked_add(rhs) {
            self.0 = new_val.0;
        } else {
            error!("Cents AddAssign error: Overflow")
        }
    }
}

impl Display for Cents {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let integer = abs / SCALE as u64;
        let fraction = abs % SCALE as u64;
        write!(formatter, "{}{}.{:0width$}", sign, integer, fraction, width = DECIMAL_PLACES)
    }
}

impl FromStr for Cents {
    type Err = MonetaryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let sanitized = sanitize(value);

        if sanitized.is_empty() {
            return Err(MonetaryError::InvalidFormat("Value is an empty string".to_string()));
        }

        let amount = Decimal::from_str(&sanitized).map_err(|error| {
            MonetaryError::InvalidFormat(format!("Value [{value}] is not a decimal: {error}"))
        })?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MonetaryError::Negative(value.to_string()));
        }

        Cents::from_decimal(amount).ok_or(MonetaryError::Overflow)
    }
}

/// Parses a user-entered percentage. Malformed or negative text yields zero.
pub fn parse_percent(text: &str) -> Decimal {
    let sanitized = text.trim().trim_end_matches('%').trim();

    if sanitized.is_empty() {
        return Decimal::ZERO;
    }

    match Decimal::from_str(sanitized) {
        Ok(rate) if rate.is_sign_negative() => {
            warn!("Negative rate [{text}] clamped to zero");
            Decimal::ZERO
        }
        Ok(rate) => rate,
        Err(_) => {
            warn!("Malformed rate [{text}] treated as zero");
            Decimal::ZERO
        }
    }
}

fn sanitize(text: &str) -> String {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);

    trimmed.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect()
}
