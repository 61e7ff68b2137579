use thiserror::Error;

use crate::types::{Cents, TransactionId};

/// Failure reported by the payment processor. The message is shown to the caller verbatim.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("{message}")]
pub struct ProcessorError {
    pub message: String,
    pub reason: Option<String>
}

impl ProcessorError {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            reason: None
        }
    }

    pub fn with_reason(message: &str, reason: &str) -> Self {
        Self {
            message: message.to_string(),
            reason: Some(reason.to_string())
        }
    }

    pub fn transaction_not_found(transaction_id: &str) -> Self {
        Self::with_reason("Transaction not found", &format!("No transaction with id [{transaction_id}]"))
    }
}

/// Misuse of the negotiation protocol, rejected before anything is sent to the processor.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("A surcharge decision for transaction [{transaction_id}] is still outstanding")]
    PromptOutstanding {
        transaction_id: TransactionId
    },
    #[error("No surcharge prompt is awaiting a decision")]
    NoPendingPrompt,
    #[error("Override surcharge must be positive for transaction [{transaction_id}]")]
    InvalidOverride {
        transaction_id: TransactionId
    }
}

impl NegotiationError {
    pub fn prompt_outstanding(transaction_id: &str) -> Self {
        Self::PromptOutstanding { transaction_id: transaction_id.to_string() }
    }

    pub fn invalid_override(transaction_id: &str) -> Self {
        Self::InvalidOverride { transaction_id: transaction_id.to_string() }
    }
}

/// Errors from capture, refund, reverse and incremental authorization calls.
#[derive(Debug, Error)]
pub enum AdjustmentError {
    #[error("Adjustment amount must be positive for transaction [{transaction_id}]")]
    NonPositiveAmount {
        transaction_id: TransactionId
    },
    #[error("Adjustment of [{amount}] exceeds the authorized [{authorized}] for transaction [{transaction_id}]")]
    ExceedsAuthorized {
        transaction_id: TransactionId,
        amount: Cents,
        authorized: Cents
    },
    #[error("Transaction details missing")]
    MissingTransaction,
    #[error(transparent)]
    Processor(#[from] ProcessorError)
}

impl AdjustmentError {
    pub fn non_positive_amount(transaction_id: &str) -> Self {
        Self::NonPositiveAmount { transaction_id: transaction_id.to_string() }
    }

    pub fn exceeds_authorized(transaction_id: &str, amount: Cents, authorized: Cents) -> Self {
        Self::ExceedsAuthorized {
            transaction_id: transaction_id.to_string(),
            amount,
            authorized
        }
    }
}
