mod simulated;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{FlowKind, PaymentBreakdown, ProcessorError, Transaction, TransactionResponse};
use crate::types::{Cents, CurrencyCode, TransactionId};

pub use simulated::SimulatedProcessor;

/// Amount-bearing charge sent to the processor.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    pub amount: Cents,
    pub breakdown: Option<PaymentBreakdown>,
    pub currency: CurrencyCode,
    pub flow: FlowKind,
    /// Lets the processor recognise a repeated attempt of the same charge.
    pub event_id: String
}

impl ChargeRequest {
    pub fn new(amount: Cents, breakdown: Option<PaymentBreakdown>, currency: CurrencyCode, flow: FlowKind) -> Self {
        Self {
            amount,
            breakdown,
            currency,
            flow,
            event_id: new_event_id()
        }
    }
}

/// Merchant decision on a transaction the processor left pending.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmRequest {
    pub transaction_id: TransactionId,
    pub confirm: bool,
    /// Replaces the pending amount when present.
    pub amount: Option<Cents>,
    pub breakdown: Option<PaymentBreakdown>,
    pub event_id: Option<String>
}

/// Capture, refund, reverse or incremental authorization on an existing transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentRequest {
    pub transaction_id: TransactionId,
    /// `None` means the full authorized amount.
    pub amount: Option<Cents>,
    pub event_id: String
}

impl AdjustmentRequest {
    pub fn new(transaction_id: &str, amount: Option<Cents>) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            amount,
            event_id: new_event_id()
        }
    }
}

/// The remote payment processor. Every call is exactly one round trip and is never retried
/// here; transport timeouts and retries belong to the implementation.
#[async_trait]
pub trait PaymentProcessor: Send + Sync + 'static {
    async fn preauthorize(&self, request: ChargeRequest) -> Result<TransactionResponse, ProcessorError>;
    async fn sale(&self, request: ChargeRequest) -> Result<TransactionResponse, ProcessorError>;
    async fn confirm(&self, request: ConfirmRequest) -> Result<Transaction, ProcessorError>;
    async fn capture(&self, request: AdjustmentRequest) -> Result<TransactionResponse, ProcessorError>;
    async fn refund(&self, request: AdjustmentRequest) -> Result<TransactionResponse, ProcessorError>;
    async fn reverse(&self, request: AdjustmentRequest) -> Result<TransactionResponse, ProcessorError>;
    async fn incremental_auth(&self, request: AdjustmentRequest) -> Result<TransactionResponse, ProcessorError>;
    async fn fetch(&self, transaction_id: &str) -> Result<Transaction, ProcessorError>;
}

pub fn new_event_id() -> String {
    Uuid::new_v4().to_string()
}
