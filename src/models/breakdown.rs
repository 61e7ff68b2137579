use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{RateMode, TipType};
use crate::types::{Cents, CurrencyCode};

/// How the surcharge of a breakdown came about.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SurchargeApplied {
    /// Not computed client-side.
    None,
    /// Explicitly waived; the processor must not add its own.
    Bypassed,
    /// Merchant-supplied amount or rate.
    Override(RateMode)
}

/// Cents-exact result of pricing a checkout.
///
/// `total_amount` is always the integer sum of the four components.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PricingBreakdown {
    pub subtotal: Cents,
    pub tax_amount: Cents,
    pub tip_amount: Cents,
    pub surcharge_amount: Cents,
    pub total_amount: Cents,
    pub tax_mode: Option<RateMode>,
    pub tip_mode: Option<RateMode>,
    pub surcharge: SurchargeApplied,
    pub currency: CurrencyCode
}

impl PricingBreakdown {
    /// Whether a breakdown payload accompanies the amount. An all-zero breakdown is never sent.
    pub fn has_components(&self) -> bool {
        self.tax_amount.is_positive()
            || self.tip_amount.is_positive()
            || self.surcharge != SurchargeApplied::None
    }

    /// Builds the wire payload, or `None` when there is nothing beyond the subtotal to describe.
    pub fn to_payload(&self) -> Option<PaymentBreakdown> {
        if !self.has_components() {
            return None;
        }

        let tax_rate = self.tax_mode
            .and_then(|mode| mode.rate())
            .filter(|rate| rate.is_sign_positive() && !rate.is_zero());

        let tip_type = match self.tip_mode {
            Some(RateMode::Percentage(_)) => TipType::Percentage,
            _ => TipType::Fixed
        };

        let tip_rate = self.tip_mode
            .and_then(|mode| mode.rate())
            .filter(|rate| rate.is_sign_positive() && !rate.is_zero());

        let tip_amount = match tip_rate {
            Some(_) => None,
            None => Some(self.tip_amount)
        };

        let surcharge = match self.surcharge {
            SurchargeApplied::None => None,
            SurchargeApplied::Bypassed => Some(SurchargePayload::bypass()),
            SurchargeApplied::Override(mode) => Some(SurchargePayload::from_mode(mode))
        };

        Some(PaymentBreakdown {
            subtotal: self.subtotal,
            tax_rate,
            tax_amount: self.tax_amount,
            tip_amount,
            tip_rate,
            tip_type,
            surcharge
        })
    }

    pub fn formatted_total(&self) -> String {
        self.total_amount.format(&self.currency)
    }
}

/// Breakdown as the processor expects it on the wire.
///
/// `tip_amount` and `tip_rate` are never both present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    pub subtotal: Cents,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub tax_rate: Option<Decimal>,
    pub tax_amount: Cents,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_amount: Option<Cents>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub tip_rate: Option<Decimal>,
    pub tip_type: TipType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<SurchargePayload>
}

impl PaymentBreakdown {
    /// Breakdown sent with a surcharge override during confirmation. The pending base already
    /// includes any tax and tip, so it travels as the subtotal.
    pub fn for_override(base: Cents, mode: RateMode) -> Self {
        Self {
            subtotal: base,
            tax_rate: None,
            tax_amount: Cents::ZERO,
            tip_amount: Some(Cents::ZERO),
            tip_rate: None,
            tip_type: TipType::Fixed,
            surcharge: Some(SurchargePayload::from_mode(mode))
        }
    }

    /// Surcharge this payload asks for, computed the way the processor does: fixed amounts as-is,
    /// percentages on the fully-loaded amount.
    pub fn requested_surcharge(&self) -> Option<Cents> {
        let surcharge = self.surcharge.as_ref()?;

        if surcharge.bypass {
            return Some(Cents::ZERO);
        }

        if let Some(amount) = surcharge.amount {
            return Some(amount);
        }

        let rate = surcharge.percentage?;
        let mut base = self.subtotal;
        base += self.tax_amount;
        base += self.tip_amount.unwrap_or_else(|| {
            self.tip_rate.map(|rate| self.subtotal.apply_rate(rate)).unwrap_or(Cents::ZERO)
        });

        Some(base.apply_rate(rate))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurchargePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Cents>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub percentage: Option<Decimal>,
    pub bypass: bool
}

impl SurchargePayload {
    pub fn bypass() -> Self {
        Self {
            amount: None,
            percentage: None,
            bypass: true
        }
    }

    pub fn from_mode(mode: RateMode) -> Self {
        Self {
            amount: mode.fixed_cents(),
            percentage: mode.rate(),
            bypass: false
        }
    }
}
