use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{AdjustmentError, ProcessorError, Transaction, TransactionResponse};
use crate::processor::{AdjustmentRequest, PaymentProcessor};
use crate::types::Cents;

/// Gateway amount if positive, otherwise the total if positive.
pub fn authorized_amount(transaction: &Transaction) -> Option<Cents> {
    transaction.authorized_amount
        .filter(|amount| amount.is_positive())
        .or(Some(transaction.total_amount).filter(|amount| amount.is_positive()))
}

/// Largest partial amount that still leaves one cent authorized.
pub fn maximum_action_amount(transaction: &Transaction) -> Option<Cents> {
    authorized_amount(transaction)
        .filter(|amount| *amount > Cents::new(1))
        .and_then(|amount| amount.checked_sub(Cents::new(1)))
}

/// Follow-up operations on a transaction that has already been authorized or captured.
///
/// Amounts are checked before anything is sent. `None` means the full amount.
pub struct AmountAdjuster<P: PaymentProcessor> {
    processor: Arc<P>
}

impl<P: PaymentProcessor> AmountAdjuster<P> {
    pub fn new(processor: Arc<P>) -> Self {
        Self { processor }
    }

    pub async fn capture(&self, transaction: &Transaction, amount: Option<Cents>) -> Result<Transaction, AdjustmentError> {
        let limit = authorized_amount(transaction).unwrap_or(Cents::ZERO);
        check_amount(transaction, amount, limit)?;

        info!("Capturing [{}] on [{}]", describe(amount), transaction.transaction_id);

        let response = self.processor.capture(AdjustmentRequest::new(&transaction.transaction_id, amount)).await;
        settle(response)
    }

    pub async fn refund(&self, transaction: &Transaction, amount: Option<Cents>) -> Result<Transaction, AdjustmentError> {
        check_amount(transaction, amount, transaction.total_amount)?;

        info!("Refunding [{}] on [{}]", describe(amount), transaction.transaction_id);

        let response = self.processor.refund(AdjustmentRequest::new(&transaction.transaction_id, amount)).await;
        settle(response)
    }

    /// A partial reverse must leave part of the authorization in place; use `None` to release all of it.
    pub async fn reverse(&self, transaction: &Transaction, amount: Option<Cents>) -> Result<Transaction, AdjustmentError> {
        let limit = maximum_action_amount(transaction).unwrap_or(Cents::ZERO);
        check_amount(transaction, amount, limit)?;

        info!("Reversing [{}] on [{}]", describe(amount), transaction.transaction_id);

        let response = self.processor.reverse(AdjustmentRequest::new(&transaction.transaction_id, amount)).await;
        settle(response)
    }

    pub async fn incremental_auth(&self, transaction: &Transaction, amount: Cents) -> Result<Transaction, AdjustmentError> {
        if !amount.is_positive() {
            return Err(AdjustmentError::non_positive_amount(&transaction.transaction_id));
        }

        info!("Incrementing authorization on [{}] by [{amount}]", transaction.transaction_id);

        let response = self.processor.incremental_auth(AdjustmentRequest::new(&transaction.transaction_id, Some(amount))).await;
        settle(response)
    }
}

fn check_amount(transaction: &Transaction, amount: Option<Cents>, limit: Cents) -> Result<(), AdjustmentError> {
    let Some(amount) = amount else {
        return Ok(());
    };

    if !amount.is_positive() {
        return Err(AdjustmentError::non_positive_amount(&transaction.transaction_id));
    }

    if amount > limit {
        return Err(AdjustmentError::exceeds_authorized(&transaction.transaction_id, amount, limit));
    }

    Ok(())
}

fn settle(response: Result<TransactionResponse, ProcessorError>) -> Result<Transaction, AdjustmentError> {
    match response {
        Ok(response) => response.transaction.ok_or(AdjustmentError::MissingTransaction),
        Err(error) => {
            warn!("Adjustment rejected by processor: {error}");
            Err(error.into())
        }
    }
}

fn describe(amount: Option<Cents>) -> String {
    amount.map_or_else(|| "full amount".to_string(), |amount| amount.to_string())
}
