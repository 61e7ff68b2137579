use crate::types::CurrencyCode;

/// What a percentage tax is charged on.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum TaxBase {
    /// Tax is charged on the subtotal plus the tip when the tip is a percentage add-on.
    /// A fixed tip is never taxed.
    #[default]
    SubtotalAndRateTip,
    /// Tax is charged on the subtotal alone.
    SubtotalOnly
}

impl TaxBase {
    pub fn parse(value: &str) -> Option<TaxBase> {
        match value.trim().to_lowercase().as_str() {
            "subtotal_and_tip" | "subtotal_and_rate_tip" => Some(TaxBase::SubtotalAndRateTip),
            "subtotal" | "subtotal_only" => Some(TaxBase::SubtotalOnly),
            _ => None
        }
    }
}

/// Settings shared by the calculator, the negotiation and the checkout engine.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub currency: CurrencyCode,
    pub tax_base: TaxBase,
    pub backpressure: usize
}

impl CheckoutConfig {
    pub fn new() -> Self {
        Self {
            currency: CurrencyCode::usd(),
            tax_base: TaxBase::default(),
            backpressure: 256
        }
    }

    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_tax_base(mut self, tax_base: TaxBase) -> Self {
        self.tax_base = tax_base;
        self
    }

    pub fn with_backpressure(mut self, backpressure: usize) -> Self {
        self.backpressure = backpressure.max(1);
        self
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        CheckoutConfig::new()
    }
}
