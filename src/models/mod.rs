mod breakdown;
mod errors;
mod pricing;
mod rate;
mod summary;
mod transaction;

use serde::{Deserialize, Serialize};

pub use breakdown::{PaymentBreakdown, PricingBreakdown, SurchargeApplied, SurchargePayload};
pub use errors::{AdjustmentError, NegotiationError, ProcessorError};
pub use pricing::{PricingInput, SurchargeEntry};
pub use rate::{RateEntry, RateMode};
pub use summary::{SummaryRow, TransactionSummary};
pub use transaction::{StatusClass, Transaction, TransactionResponse, TransactionStatus};

/// Which charge a checkout performs.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    /// Authorize and capture in one step.
    Sale,
    /// Hold funds only.
    Auth
}

impl FlowKind {
    pub fn title(&self) -> &'static str {
        match self {
            FlowKind::Sale => "Sale",
            FlowKind::Auth => "Preauth"
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipType {
    Fixed,
    Percentage
}
