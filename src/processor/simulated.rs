use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{FlowKind, ProcessorError, Transaction, TransactionResponse, TransactionStatus};
use crate::processor::{AdjustmentRequest, ChargeRequest, ConfirmRequest, PaymentProcessor};
use crate::types::{Cents, TransactionId};

/// Deterministic in-memory processor.
///
/// Charges that carry no surcharge directive come back `surchargePending` while a surcharge rate
/// is configured, amounts above the decline limit are declined, and everything else is captured
/// (sale) or authorized (auth). Every transaction is kept in a shared ledger so later
/// confirmations and adjustments can find it.
pub struct SimulatedProcessor {
    ledger: Arc<DashMap<TransactionId, Transaction>>,
    surcharge_rate: Option<Decimal>,
    disclosure: Option<String>,
    decline_above: Option<Cents>
}

impl SimulatedProcessor {
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(DashMap::new()),
            surcharge_rate: None,
            disclosure: None,
            decline_above: None
        }
    }

    pub fn with_surcharge_rate(mut self, rate: Decimal) -> Self {
        self.surcharge_rate = Some(rate);
        self
    }

    pub fn with_disclosure(mut self, disclosure: &str) -> Self {
        self.disclosure = Some(disclosure.to_string());
        self
    }

    pub fn with_decline_above(mut self, limit: Cents) -> Self {
        self.decline_above = Some(limit);
        self
    }

    pub fn get(&self, transaction_id: &str) -> Option<Transaction> {
        self.ledger.get(transaction_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    fn charge(&self, request: ChargeRequest) -> TransactionResponse {
        let mut transaction = Transaction {
            transaction_id: Uuid::new_v4().to_string(),
            transaction_type: match request.flow {
                FlowKind::Sale => "sale".to_string(),
                FlowKind::Auth => "auth".to_string()
            },
            status: settled_status(request.flow),
            status_reason: None,
            processor_response_message: None,
            total_amount: request.amount,
            subtotal: request.amount,
            tax_amount: Cents::ZERO,
            tip_amount: Cents::ZERO,
            surcharge_amount: None,
            surcharge_rate: None,
            surcharge_applied: false,
            surcharge_disclosure: None,
            authorized_amount: Some(request.amount),
            card_brand: Some("VISA".to_string()),
            card: Some("**** 4242".to_string()),
            currency: request.currency.clone()
        };

        if let Some(breakdown) = &request.breakdown {
            transaction.subtotal = breakdown.subtotal;
            transaction.tax_amount = breakdown.tax_amount;
            transaction.tip_amount = breakdown.tip_amount.unwrap_or_else(|| {
                request.amount
                    .floor_sub(breakdown.subtotal)
                    .floor_sub(breakdown.tax_amount)
                    .floor_sub(breakdown.requested_surcharge().unwrap_or(Cents::ZERO))
            });
        }

        let directive = request.breakdown.as_ref().and_then(|breakdown| breakdown.requested_surcharge());

        if self.decline_above.is_some_and(|limit| request.amount > limit) {
            transaction.status = TransactionStatus::Declined;
            transaction.status_reason = Some("Declined by issuer".to_string());
            transaction.processor_response_message = Some("Insufficient funds".to_string());
            transaction.authorized_amount = None;
        } else if let (Some(rate), None) = (self.surcharge_rate, directive) {
            let surcharge = request.amount.apply_rate(rate);

            transaction.status = TransactionStatus::SurchargePending;
            transaction.surcharge_amount = Some(surcharge);
            transaction.surcharge_rate = Some(rate);
            transaction.surcharge_disclosure = self.disclosure.clone();
            transaction.total_amount += surcharge;
            transaction.authorized_amount = None;
        } else if let Some(surcharge) = directive {
            transaction.surcharge_amount = Some(surcharge);
            transaction.surcharge_applied = surcharge.is_positive();
        }

        debug!("Simulated {:?} [{}] resolved as [{:?}]", request.flow, transaction.transaction_id, transaction.status);

        self.ledger.insert(transaction.transaction_id.clone(), transaction.clone());

        TransactionResponse::from_transaction(transaction)
    }

    fn apply_confirmation(&self, request: ConfirmRequest) -> Result<Transaction, ProcessorError> {
        let mut entry = self.ledger.get_mut(&request.transaction_id)
            .ok_or_else(|| ProcessorError::transaction_not_found(&request.transaction_id))?;
        let transaction = entry.value_mut();

        if !matches!(transaction.status, TransactionStatus::SurchargePending | TransactionStatus::Pending) {
            return Err(ProcessorError::with_reason(
                "Transaction is not awaiting confirmation",
                transaction.status.display_name()
            ));
        }

        if !request.confirm {
            transaction.status = TransactionStatus::Canceled;
            transaction.status_reason = Some("Surcharge declined".to_string());
            transaction.processor_response_message = Some("Surcharge declined by customer".to_string());
            return Ok(transaction.clone());
        }

        if let Some(amount) = request.amount {
            let base = transaction.total_amount.floor_sub(transaction.surcharge_amount.unwrap_or(Cents::ZERO));
            let surcharge = request.breakdown.as_ref()
                .and_then(|breakdown| breakdown.requested_surcharge())
                .unwrap_or_else(|| amount.floor_sub(base));

            transaction.total_amount = amount;
            transaction.surcharge_amount = Some(surcharge);
        }

        transaction.surcharge_applied = transaction.surcharge_amount.is_some_and(|amount| amount.is_positive());
        transaction.status = match transaction.transaction_type.as_str() {
            "auth" => TransactionStatus::Authorized,
            _ => TransactionStatus::Captured
        };
        transaction.authorized_amount = Some(transaction.total_amount);

        Ok(transaction.clone())
    }

    fn apply_adjustment(&self, request: AdjustmentRequest, kind: AdjustmentKind) -> Result<TransactionResponse, ProcessorError> {
        let mut entry = self.ledger.get_mut(&request.transaction_id)
            .ok_or_else(|| ProcessorError::transaction_not_found(&request.transaction_id))?;
        let transaction = entry.value_mut();
        let authorized = transaction.authorized_amount.unwrap_or(Cents::ZERO);

        match kind {
            AdjustmentKind::Capture => {
                require_status(transaction, &[TransactionStatus::Authorized])?;
                let amount = request.amount.unwrap_or(authorized);
                require_within(amount, authorized)?;

                transaction.total_amount = amount;
                transaction.status = TransactionStatus::Captured;
            }
            AdjustmentKind::Refund => {
                require_status(transaction, &[
                    TransactionStatus::Captured,
                    TransactionStatus::Approved,
                    TransactionStatus::SurchargeApplied,
                    TransactionStatus::Settled
                ])?;
                let amount = request.amount.unwrap_or(transaction.total_amount);
                require_within(amount, transaction.total_amount)?;

                transaction.status = TransactionStatus::Refunded;
            }
            AdjustmentKind::Reverse => {
                require_status(transaction, &[TransactionStatus::Authorized])?;
                let amount = request.amount.unwrap_or(authorized);
                require_within(amount, authorized)?;
                let remaining = authorized.floor_sub(amount);

                transaction.authorized_amount = Some(remaining);
                transaction.total_amount = remaining;

                if remaining.is_zero() {
                    transaction.status = TransactionStatus::Reversed;
                }
            }
            AdjustmentKind::IncrementalAuth => {
                require_status(transaction, &[TransactionStatus::Authorized])?;
                let amount = request.amount
                    .ok_or_else(|| ProcessorError::new("Incremental authorization requires an amount"))?;
                let mut increased = authorized;
                increased += amount;

                transaction.authorized_amount = Some(increased);
                transaction.total_amount = increased;
            }
        }

        Ok(TransactionResponse::from_transaction(transaction.clone()))
    }
}

impl Default for SimulatedProcessor {
    fn default() -> Self {
        SimulatedProcessor::new()
    }
}

#[derive(Debug, Clone, Copy)]
enum AdjustmentKind {
    Capture,
    Refund,
    Reverse,
    IncrementalAuth
}

fn settled_status(flow: FlowKind) -> TransactionStatus {
    match flow {
        FlowKind::Sale => TransactionStatus::Captured,
        FlowKind::Auth => TransactionStatus::Authorized
    }
}

fn require_status(transaction: &Transaction, allowed: &[TransactionStatus]) -> Result<(), ProcessorError> {
    if allowed.contains(&transaction.status) {
        Ok(())
    } else {
        Err(ProcessorError::with_reason(
            "Transaction is not in a valid state for this operation",
            transaction.status.display_name()
        ))
    }
}

fn require_within(amount: Cents, limit: Cents) -> Result<(), ProcessorError> {
    if amount > limit {
        Err(ProcessorError::with_reason("Amount exceeds the available amount", &format!("[{amount}] > [{limit}]")))
    } else {
        Ok(())
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedProcessor {
    async fn preauthorize(&self, request: ChargeRequest) -> Result<TransactionResponse, ProcessorError> {
        Ok(self.charge(ChargeRequest { flow: FlowKind::Auth, ..request }))
    }

    async fn sale(&self, request: ChargeRequest) -> Result<TransactionResponse, ProcessorError> {
        Ok(self.charge(ChargeRequest { flow: FlowKind::Sale, ..request }))
    }

    async fn confirm(&self, request: ConfirmRequest) -> Result<Transaction, ProcessorError> {
        self.apply_confirmation(request)
    }

    async fn capture(&self, request: AdjustmentRequest) -> Result<TransactionResponse, ProcessorError> {
        self.apply_adjustment(request, AdjustmentKind::Capture)
    }

    async fn refund(&self, request: AdjustmentRequest) -> Result<TransactionResponse, ProcessorError> {
        self.apply_adjustment(request, AdjustmentKind::Refund)
    }

    async fn reverse(&self, request: AdjustmentRequest) -> Result<TransactionResponse, ProcessorError> {
        self.apply_adjustment(request, AdjustmentKind::Reverse)
    }

    async fn incremental_auth(&self, request: AdjustmentRequest) -> Result<TransactionResponse, ProcessorError> {
        self.apply_adjustment(request, AdjustmentKind::IncrementalAuth)
    }

    async fn fetch(&self, transaction_id: &str) -> Result<Transaction, ProcessorError> {
        self.get(transaction_id).ok_or_else(|| ProcessorError::transaction_not_found(transaction_id))
    }
}
