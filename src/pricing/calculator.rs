use tracing::trace;

use crate::config::{CheckoutConfig, TaxBase};
use crate::models::{PricingBreakdown, PricingInput, RateMode, SurchargeApplied, SurchargeEntry};
use crate::types::{Cents, CurrencyCode};

/// Turns entered checkout fields into a cents-exact breakdown.
///
/// The calculator holds no state besides its configuration, so pricing the same input twice
/// always yields the same breakdown. Components are derived in a fixed order (tip, tax,
/// surcharge) because each percentage is charged on the amounts computed before it, and the
/// processor rounds in exactly that order.
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    tax_base: TaxBase,
    currency: CurrencyCode
}

impl PricingCalculator {
    pub fn new(config: &CheckoutConfig) -> Self {
        Self {
            tax_base: config.tax_base,
            currency: config.currency.clone()
        }
    }

    pub fn tax_base(&self) -> TaxBase {
        self.tax_base
    }

    /// Prices a checkout. Never fails: malformed or negative text counts as zero.
    pub fn compute_breakdown(&self, input: &PricingInput) -> PricingBreakdown {
        let subtotal = Cents::parse_lenient(&input.subtotal);

        let tip_mode = input.resolved_tip();
        let tip_amount = tip_mode
            .map(|mode| mode.amount_on(subtotal).non_negative())
            .unwrap_or(Cents::ZERO);

        let tax_mode = input.resolved_tax();
        let tax_amount = tax_mode
            .map(|mode| mode.amount_on(self.taxable_amount(subtotal, tip_mode, tip_amount)).non_negative())
            .unwrap_or(Cents::ZERO);

        let mut loaded = subtotal;
        loaded += tax_amount;
        loaded += tip_amount;

        let (surcharge, surcharge_amount) = match input.surcharge() {
            SurchargeEntry::Off => (SurchargeApplied::None, Cents::ZERO),
            SurchargeEntry::Bypass => (SurchargeApplied::Bypassed, Cents::ZERO),
            SurchargeEntry::Override(entry) => {
                let mode = entry.resolve();
                let amount = mode.amount_on(loaded);

                //NOTE: A surcharge of zero cents or less is no surcharge at all, and nothing is sent for it
                if amount.is_positive() {
                    (SurchargeApplied::Override(mode), amount)
                } else {
                    (SurchargeApplied::None, Cents::ZERO)
                }
            }
        };

        let mut total_amount = loaded;
        total_amount += surcharge_amount;

        trace!(
            "Priced subtotal [{subtotal}] tax [{tax_amount}] tip [{tip_amount}] surcharge [{surcharge_amount}] total [{total_amount}]"
        );

        PricingBreakdown {
            subtotal,
            tax_amount,
            tip_amount,
            surcharge_amount,
            total_amount,
            tax_mode,
            tip_mode,
            surcharge,
            currency: self.currency.clone()
        }
    }

    fn taxable_amount(&self, subtotal: Cents, tip_mode: Option<RateMode>, tip: Cents) -> Cents {
        match (self.tax_base, tip_mode) {
            (TaxBase::SubtotalAndRateTip, Some(RateMode::Percentage(_))) => {
                let mut base = subtotal;
                base += tip;
                base
            }
            _ => subtotal
        }
    }
}

impl Default for PricingCalculator {
    fn default() -> Self {
        PricingCalculator::new(&CheckoutConfig::default())
    }
}

/// Prices `input` with the default configuration.
pub fn compute_breakdown(input: &PricingInput) -> PricingBreakdown {
    PricingCalculator::default().compute_breakdown(input)
}

/// Surcharge a resolved override would add on `base`, or `None` when it is not positive.
pub fn override_surcharge(mode: RateMode, base: Cents) -> Option<Cents> {
    if !mode.is_positive() {
        return None;
    }

    Some(mode.amount_on(base)).filter(|amount| amount.is_positive())
}
