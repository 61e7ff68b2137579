use serde::{Deserialize, Serialize, Serializer};

use crate::models::{FlowKind, PricingInput, RateEntry, SurchargeEntry};
use crate::negotiation::PendingOverride;
use crate::types::{Cents, TransactionId};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    Fixed,
    Percentage
}

impl EntryMode {
    fn entry(mode: Option<EntryMode>, text: &str) -> RateEntry {
        match mode {
            Some(EntryMode::Percentage) => RateEntry::percentage(text),
            Some(EntryMode::Fixed) | None => RateEntry::fixed(text)
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurchargeMode {
    Off,
    Bypass,
    Fixed,
    Percentage
}

/// What to do when the processor asks for a surcharge confirmation. An empty column walks away.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Confirm,
    Decline,
    Override
}

/// One checkout as read from the input CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRow {
    pub id: String,
    pub flow: FlowKind,
    #[serde(default)]
    pub subtotal: String,
    #[serde(default)]
    pub breakdown: Option<bool>,
    #[serde(default)]
    pub tax_mode: Option<EntryMode>,
    #[serde(default)]
    pub tax: String,
    #[serde(default)]
    pub tip_mode: Option<EntryMode>,
    #[serde(default)]
    pub tip: String,
    #[serde(default)]
    pub surcharge_mode: Option<SurchargeMode>,
    #[serde(default)]
    pub surcharge: String,
    #[serde(default)]
    pub decision: Option<Decision>,
    #[serde(default)]
    pub override_mode: Option<EntryMode>,
    #[serde(default, rename = "override")]
    pub override_value: String
}

impl CheckoutRow {
    pub fn to_input(&self) -> PricingInput {
        let mut input = PricingInput::new(&self.subtotal)
            .with_breakdown(self.breakdown.unwrap_or(false))
            .with_tax(EntryMode::entry(self.tax_mode, &self.tax))
            .with_tip(EntryMode::entry(self.tip_mode, &self.tip));

        //NOTE: A blank tax column leaves the tax toggle off rather than charging a zero tax
        input.tax_enabled = !self.tax.trim().is_empty();

        let surcharge = match self.surcharge_mode {
            Some(SurchargeMode::Bypass) => SurchargeEntry::Bypass,
            Some(SurchargeMode::Fixed) => SurchargeEntry::Override(RateEntry::fixed(&self.surcharge)),
            Some(SurchargeMode::Percentage) => SurchargeEntry::Override(RateEntry::percentage(&self.surcharge)),
            Some(SurchargeMode::Off) | None => SurchargeEntry::Off
        };

        input.with_surcharge(surcharge)
    }

    pub fn pending_override(&self) -> Option<PendingOverride> {
        match self.decision {
            Some(Decision::Override) => Some(PendingOverride::new(EntryMode::entry(self.override_mode, &self.override_value))),
            _ => None
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStatus {
    Approved,
    Declined,
    Failed,
    /// Left waiting on a surcharge decision.
    Pending,
    /// Rejected before anything was sent.
    Blocked
}

/// One output line per input row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutResult {
    pub id: String,
    pub flow: FlowKind,
    #[serde(serialize_with = "as_display")]
    pub subtotal: Cents,
    #[serde(serialize_with = "as_display")]
    pub tax: Cents,
    #[serde(serialize_with = "as_display")]
    pub tip: Cents,
    #[serde(serialize_with = "as_display")]
    pub surcharge: Cents,
    #[serde(serialize_with = "as_display")]
    pub total: Cents,
    pub outcome: CheckoutStatus,
    pub transaction_id: Option<TransactionId>,
    pub reason: String
}

fn as_display<S: Serializer>(cents: &Cents, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(cents)
}
