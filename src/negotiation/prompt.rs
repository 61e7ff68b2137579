use rust_decimal::RoundingStrategy;

use crate::models::{FlowKind, RateEntry, RateMode, SummaryRow, Transaction};
use crate::pricing::override_surcharge;
use crate::types::{Cents, CurrencyCode};

/// Decision surface for a transaction the processor left pending a surcharge confirmation.
///
/// Lives from the pending response until a decision has been submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct SurchargePrompt {
    pub flow: FlowKind,
    pub transaction: Transaction,
    pub disclosure: String,
    /// Pending total minus the processor's surcharge, never below zero.
    pub base_amount: Cents,
    pub original_surcharge: Cents
}

impl SurchargePrompt {
    pub fn from_transaction(flow: FlowKind, transaction: Transaction) -> Self {
        let original_surcharge = transaction.surcharge_amount.unwrap_or(Cents::ZERO);
        let base_amount = transaction.total_amount.floor_sub(original_surcharge);
        let disclosure = disclosure_for(&transaction);

        Self {
            flow,
            transaction,
            disclosure,
            base_amount,
            original_surcharge
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction.transaction_id
    }

    /// Totals after applying `pending_override`, or `None` while an enabled override is not
    /// submittable.
    pub fn quote(&self, pending_override: Option<&PendingOverride>) -> Option<OverrideQuote> {
        match pending_override.filter(|pending| pending.enabled) {
            Some(pending) => pending.quote(self.base_amount),
            None => Some(OverrideQuote {
                base: self.base_amount,
                surcharge: self.original_surcharge,
                total: self.transaction.total_amount,
                mode: None
            })
        }
    }

    pub fn summary(&self, pending_override: Option<&PendingOverride>, currency: &CurrencyCode) -> Vec<SummaryRow> {
        let Some(quote) = self.quote(pending_override) else {
            return vec![SummaryRow::new("Original Amount", self.base_amount.format(currency))];
        };
        let is_override = quote.is_override();

        vec![
            SummaryRow::new("Original Amount", quote.base.format(currency)),
            SummaryRow::new(if is_override { "Override Surcharge" } else { "Surcharge" }, quote.surcharge.format(currency)),
            SummaryRow::new(if is_override { "Override Total" } else { "Total Amount" }, quote.total.format(currency)),
        ]
    }
}

fn disclosure_for(transaction: &Transaction) -> String {
    if let Some(disclosure) = transaction.surcharge_disclosure.as_deref().filter(|text| !text.trim().is_empty()) {
        return disclosure.to_string();
    }

    match transaction.surcharge_rate {
        Some(rate) => {
            let mut rate = rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            rate.rescale(2);
            format!("A {rate}% surcharge is applied to cover processing fees.")
        }
        None => "A surcharge is applied to cover processing fees.".to_string()
    }
}

/// Merchant-adjusted surcharge for a single prompt.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PendingOverride {
    pub enabled: bool,
    entry: RateEntry
}

impl PendingOverride {
    pub fn new(entry: RateEntry) -> Self {
        Self { enabled: true, entry }
    }

    pub fn fixed(text: &str) -> Self {
        Self::new(RateEntry::fixed(text))
    }

    pub fn percentage(text: &str) -> Self {
        Self::new(RateEntry::percentage(text))
    }

    pub fn entry(&self) -> &RateEntry {
        &self.entry
    }

    pub fn set_entry(&mut self, entry: RateEntry) {
        self.entry = entry;
    }

    pub fn mode(&self) -> RateMode {
        self.entry.resolve()
    }

    /// `{base, surcharge, total}` for the entered override on `base`, or `None` when the entered
    /// value would not produce a positive surcharge.
    pub fn quote(&self, base: Cents) -> Option<OverrideQuote> {
        let mode = self.mode();
        let surcharge = override_surcharge(mode, base)?;
        let mut total = base;
        total += surcharge;

        Some(OverrideQuote {
            base,
            surcharge,
            total,
            mode: Some(mode)
        })
    }

    /// A disabled override never blocks a decision.
    pub fn is_submittable(&self, base: Cents) -> bool {
        !self.enabled || self.quote(base).is_some()
    }
}

/// Amounts a confirmation will carry.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct OverrideQuote {
    pub base: Cents,
    pub surcharge: Cents,
    pub total: Cents,
    /// Set when the amounts come from a merchant override rather than the processor.
    pub mode: Option<RateMode>
}

impl OverrideQuote {
    pub fn is_override(&self) -> bool {
        self.mode.is_some()
    }
}
