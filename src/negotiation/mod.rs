mod adjustments;
mod prompt;
mod state;
mod surcharge_negotiation;
#[cfg(test)]
mod tests;

pub use adjustments::{authorized_amount, maximum_action_amount, AmountAdjuster};
pub use prompt::{OverrideQuote, PendingOverride, SurchargePrompt};
pub use state::{Failure, FailureKind, NegotiationState, Outcome};
pub use surcharge_negotiation::SurchargeNegotiation;
