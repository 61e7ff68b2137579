use rust_decimal::Decimal;

use crate::models::{RateEntry, RateMode};
use crate::types::Cents;

/// Client-side surcharge handling for a checkout.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum SurchargeEntry {
    /// Nothing computed locally; the processor may still impose its own surcharge.
    #[default]
    Off,
    /// The merchant supplies the surcharge.
    Override(RateEntry),
    /// No surcharge, and the processor is told not to add one either.
    Bypass
}

/// Everything a cashier has typed for one checkout.
///
/// Mutating this struct never recomputes anything. Callers run the calculator again after
/// each change.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PricingInput {
    /// Subtotal exactly as entered.
    pub subtotal: String,
    /// Tax and tip only apply while the breakdown is switched on.
    pub breakdown_enabled: bool,
    pub tax_enabled: bool,
    tax: RateEntry,
    tip: RateEntry,
    surcharge: SurchargeEntry
}

impl PricingInput {
    pub fn new(subtotal: &str) -> Self {
        Self {
            subtotal: subtotal.to_string(),
            breakdown_enabled: false,
            tax_enabled: true,
            tax: RateEntry::default(),
            tip: RateEntry::default(),
            surcharge: SurchargeEntry::Off
        }
    }

    pub fn with_breakdown(mut self, enabled: bool) -> Self {
        self.breakdown_enabled = enabled;
        self
    }

    pub fn with_tax(mut self, tax: RateEntry) -> Self {
        self.set_tax(tax);
        self
    }

    pub fn with_tip(mut self, tip: RateEntry) -> Self {
        self.set_tip(tip);
        self
    }

    pub fn with_surcharge(mut self, surcharge: SurchargeEntry) -> Self {
        self.surcharge = surcharge;
        self
    }

    pub fn tax(&self) -> &RateEntry {
        &self.tax
    }

    /// Replaces the tax entry; the value typed for the previous mode is discarded.
    pub fn set_tax(&mut self, tax: RateEntry) {
        self.tax = tax;
    }

    pub fn tax_fixed_cents(&self) -> Option<Cents> {
        self.tax.resolve().fixed_cents()
    }

    pub fn tax_rate(&self) -> Option<Decimal> {
        self.tax.resolve().rate()
    }

    pub fn tip(&self) -> &RateEntry {
        &self.tip
    }

    pub fn set_tip(&mut self, tip: RateEntry) {
        self.tip = tip;
    }

    pub fn surcharge(&self) -> &SurchargeEntry {
        &self.surcharge
    }

    /// Turns on the merchant override, which also switches bypass off.
    pub fn set_surcharge_override(&mut self, entry: RateEntry) {
        self.surcharge = SurchargeEntry::Override(entry);
    }

    /// Turns on bypass, which also switches the override off.
    pub fn enable_bypass(&mut self) {
        self.surcharge = SurchargeEntry::Bypass;
    }

    pub fn disable_override(&mut self) {
        if self.is_override_enabled() {
            self.surcharge = SurchargeEntry::Off;
        }
    }

    pub fn disable_bypass(&mut self) {
        if self.is_bypassed() {
            self.surcharge = SurchargeEntry::Off;
        }
    }

    pub fn is_override_enabled(&self) -> bool {
        matches!(self.surcharge, SurchargeEntry::Override(_))
    }

    pub fn is_bypassed(&self) -> bool {
        matches!(self.surcharge, SurchargeEntry::Bypass)
    }

    pub(crate) fn resolved_tax(&self) -> Option<RateMode> {
        (self.breakdown_enabled && self.tax_enabled).then(|| self.tax.resolve())
    }

    pub(crate) fn resolved_tip(&self) -> Option<RateMode> {
        self.breakdown_enabled.then(|| self.tip.resolve())
    }
}

impl Default for PricingInput {
    fn default() -> Self {
        PricingInput::new("")
    }
}
