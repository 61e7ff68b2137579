use std::mem;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::CheckoutConfig;
use crate::models::{
    FlowKind, NegotiationError, PaymentBreakdown, PricingBreakdown, ProcessorError, Transaction,
    TransactionResponse, TransactionStatus
};
use crate::negotiation::{Failure, FailureKind, NegotiationState, Outcome, PendingOverride, SurchargePrompt};
use crate::processor::{new_event_id, ChargeRequest, ConfirmRequest, PaymentProcessor};
use crate::types::CurrencyCode;

/// Drives one checkout from submission through an optional surcharge confirmation.
///
/// The processor is injected, never looked up globally. Each call to [`submit`](Self::submit)
/// or [`decide`](Self::decide) makes exactly one round trip and nothing is retried; a failed
/// decision leaves the negotiation terminal and a new submission must be started by the caller.
/// Dropping a negotiation while it holds a prompt simply leaves the remote transaction pending.
pub struct SurchargeNegotiation<P: PaymentProcessor> {
    processor: Arc<P>,
    currency: CurrencyCode,
    state: NegotiationState
}

impl<P: PaymentProcessor> SurchargeNegotiation<P> {
    pub fn new(processor: Arc<P>, config: &CheckoutConfig) -> Self {
        Self {
            processor,
            currency: config.currency.clone(),
            state: NegotiationState::Idle
        }
    }

    pub fn state(&self) -> &NegotiationState {
        &self.state
    }

    pub fn prompt(&self) -> Option<&SurchargePrompt> {
        match &self.state {
            NegotiationState::PendingConfirmation(prompt) => Some(prompt),
            _ => None
        }
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Whether a decision could be submitted right now. Declining is always possible while a
    /// prompt is pending; confirming with an enabled override needs a positive surcharge.
    pub fn can_decide(&self, confirm: bool, pending_override: Option<&PendingOverride>) -> bool {
        let Some(prompt) = self.prompt() else {
            return false;
        };

        !confirm || pending_override.is_none_or(|pending| pending.is_submittable(prompt.base_amount))
    }

    /// Returns to `Idle`, discarding any terminal result or unanswered prompt.
    pub fn reset(&mut self) {
        self.state = NegotiationState::Idle;
    }

    /// Sends the priced amount to the processor and interprets the returned status.
    ///
    /// # Errors
    /// Returns `NegotiationError::PromptOutstanding` while a surcharge prompt still awaits a
    /// decision. Processor failures are not errors: they resolve to `Outcome::Failed`.
    pub async fn submit(&mut self, breakdown: &PricingBreakdown, flow: FlowKind) -> Result<Outcome, NegotiationError> {
        if let Some(prompt) = self.prompt() {
            return Err(NegotiationError::prompt_outstanding(prompt.transaction_id()));
        }

        let request = ChargeRequest::new(
            breakdown.total_amount,
            breakdown.to_payload(),
            breakdown.currency.clone(),
            flow
        );

        debug!(
            "Submitting {:?} for [{}] with breakdown {}",
            flow,
            request.amount.format(&breakdown.currency),
            describe_payload(request.breakdown.as_ref())
        );

        self.state = NegotiationState::Submitting;

        let result = match flow {
            FlowKind::Sale => self.processor.sale(request).await,
            FlowKind::Auth => self.processor.preauthorize(request).await
        };

        let outcome = match result {
            Ok(response) => interpret_response(response, flow),
            Err(error) => remote_failure(error)
        };

        self.finish(outcome)
    }

    /// Answers the pending prompt.
    ///
    /// A decline ignores `pending_override`. A confirmation with an enabled override carries the
    /// recomputed total and a breakdown for the override surcharge; a plain confirmation lets
    /// the processor finalise its own pending amount. The prompt is discarded once the decision
    /// has been sent, whatever the result.
    ///
    /// # Errors
    /// - `NoPendingPrompt` when there is nothing to decide.
    /// - `InvalidOverride` when confirming with an enabled override whose surcharge is not
    ///   positive. Nothing is sent and the prompt stays pending.
    pub async fn decide(&mut self, confirm: bool, pending_override: Option<&PendingOverride>) -> Result<Outcome, NegotiationError> {
        let Some(prompt) = self.prompt() else {
            return Err(NegotiationError::NoPendingPrompt);
        };

        let active_override = pending_override.filter(|pending| confirm && pending.enabled);

        let quote = match active_override {
            Some(pending) => Some(
                pending.quote(prompt.base_amount)
                    .ok_or_else(|| NegotiationError::invalid_override(prompt.transaction_id()))?
            ),
            None => None
        };

        let NegotiationState::PendingConfirmation(prompt) = mem::replace(&mut self.state, NegotiationState::ConfirmingDecision) else {
            return Err(NegotiationError::NoPendingPrompt);
        };

        let request = ConfirmRequest {
            transaction_id: prompt.transaction.transaction_id.clone(),
            confirm,
            amount: quote.map(|quote| quote.total),
            breakdown: quote
                .and_then(|quote| quote.mode)
                .map(|mode| PaymentBreakdown::for_override(prompt.base_amount, mode)),
            event_id: Some(new_event_id())
        };

        match quote {
            Some(quote) => info!(
                "Confirming [{}] with override surcharge [{}], new total [{}]",
                request.transaction_id,
                quote.surcharge.format(&self.currency),
                quote.total.format(&self.currency)
            ),
            None => info!(
                "{} surcharge for [{}]",
                if confirm { "Confirming" } else { "Declining" },
                request.transaction_id
            )
        }

        let outcome = match self.processor.confirm(request).await {
            Ok(transaction) => interpret_decision(transaction),
            Err(error) => remote_failure(error)
        };

        self.finish(outcome)
    }

    fn finish(&mut self, outcome: Outcome) -> Result<Outcome, NegotiationError> {
        match &outcome {
            Outcome::Approved(transaction) => {
                info!(
                    "Transaction [{}] finished as [{:?}] ({:?})",
                    transaction.transaction_id,
                    transaction.status,
                    transaction.status.class()
                )
            }
            Outcome::Failed(failure) => warn!("Transaction failed [{:?}]: {}", failure.kind, failure.reason),
            Outcome::PendingConfirmation(prompt) => {
                info!("Transaction [{}] awaits surcharge confirmation: {}", prompt.transaction_id(), prompt.disclosure)
            }
        }

        self.state = NegotiationState::from(&outcome);

        Ok(outcome)
    }
}

fn interpret_response(response: TransactionResponse, flow: FlowKind) -> Outcome {
    let Some(transaction) = response.transaction else {
        return Outcome::Failed(Failure::new(FailureKind::MissingTransaction, "Transaction details missing"));
    };

    match transaction.status {
        TransactionStatus::Pending | TransactionStatus::SurchargePending => {
            Outcome::PendingConfirmation(SurchargePrompt::from_transaction(flow, transaction))
        }
        _ => interpret_terminal(transaction)
    }
}

fn interpret_decision(transaction: Transaction) -> Outcome {
    match transaction.status {
        TransactionStatus::Pending | TransactionStatus::SurchargePending => Outcome::Failed(
            Failure::for_transaction(FailureKind::UnknownStatus, transaction, "Transaction remained pending after the surcharge decision")
        ),
        _ => interpret_terminal(transaction)
    }
}

fn interpret_terminal(transaction: Transaction) -> Outcome {
    match transaction.status {
        TransactionStatus::Authorized
        | TransactionStatus::Captured
        | TransactionStatus::Approved
        | TransactionStatus::SurchargeApplied => Outcome::Approved(transaction),
        TransactionStatus::Declined | TransactionStatus::PickupCard => {
            Outcome::Failed(Failure::for_transaction(FailureKind::Declined, transaction, "Transaction declined"))
        }
        TransactionStatus::Canceled | TransactionStatus::Error | TransactionStatus::TimedOut => {
            Outcome::Failed(Failure::for_transaction(FailureKind::Failed, transaction, "Transaction failed"))
        }
        _ => Outcome::Failed(Failure::for_transaction(FailureKind::UnknownStatus, transaction, "Unknown transaction status"))
    }
}

fn remote_failure(error: ProcessorError) -> Outcome {
    let reason = if error.message.trim().is_empty() { "Processor request failed".to_string() } else { error.message };

    Outcome::Failed(Failure {
        kind: FailureKind::Remote,
        reason,
        detail: error.reason,
        transaction: None
    })
}

fn describe_payload(payload: Option<&PaymentBreakdown>) -> String {
    match payload {
        Some(payload) => serde_json::to_string(payload).unwrap_or_else(|error| format!("<unserializable: {error}>")),
        None => "<none>".to_string()
    }
}
