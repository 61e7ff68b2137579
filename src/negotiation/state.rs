use crate::models::Transaction;
use crate::negotiation::SurchargePrompt;

/// Why a negotiation ended in failure.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FailureKind {
    /// The issuer or processor declined the charge.
    Declined,
    /// Canceled, timed out or errored at the processor.
    Failed,
    /// A status that is not a valid terminal state here.
    UnknownStatus,
    /// The response carried no transaction.
    MissingTransaction,
    /// The processor call itself failed.
    Remote
}

/// Terminal failure. `reason` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: FailureKind,
    pub reason: String,
    /// Structured reason supplied by the processor, when there is one.
    pub detail: Option<String>,
    pub transaction: Option<Transaction>
}

impl Failure {
    pub fn new(kind: FailureKind, reason: &str) -> Self {
        Self {
            kind,
            reason: reason.to_string(),
            detail: None,
            transaction: None
        }
    }

    pub(crate) fn for_transaction(kind: FailureKind, transaction: Transaction, fallback: &str) -> Self {
        let reason = transaction.processor_response_message.as_deref()
            .or(transaction.status_reason.as_deref())
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(fallback)
            .to_string();

        Self {
            kind,
            reason,
            detail: transaction.status_reason.clone(),
            transaction: Some(transaction)
        }
    }
}

/// Result of one round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Approved(Transaction),
    Failed(Failure),
    PendingConfirmation(SurchargePrompt)
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::PendingConfirmation(_))
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        match self {
            Outcome::Approved(transaction) => Some(transaction),
            Outcome::Failed(failure) => failure.transaction.as_ref(),
            Outcome::PendingConfirmation(prompt) => Some(&prompt.transaction)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationState {
    Idle,
    Submitting,
    PendingConfirmation(SurchargePrompt),
    ConfirmingDecision,
    Succeeded(Transaction),
    Failed(Failure)
}

impl NegotiationState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, NegotiationState::Submitting | NegotiationState::ConfirmingDecision)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NegotiationState::Succeeded(_) | NegotiationState::Failed(_))
    }
}

impl From<&Outcome> for NegotiationState {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Approved(transaction) => NegotiationState::Succeeded(transaction.clone()),
            Outcome::Failed(failure) => NegotiationState::Failed(failure.clone()),
            Outcome::PendingConfirmation(prompt) => NegotiationState::PendingConfirmation(prompt.clone())
        }
    }
}
