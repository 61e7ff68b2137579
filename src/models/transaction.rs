use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Cents, CurrencyCode, TransactionId};

/// Status reported by the processor for a transaction.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionStatus {
    Pending,
    Authorized,
    Captured,
    SurchargePending,
    SurchargeApplied,
    Approved,
    Declined,
    Refunded,
    Reversed,
    PickupCard,
    TimedOut,
    #[serde(alias = "cancelled")]
    Canceled,
    Error,
    Settled,
    #[serde(other)]
    Unknown
}

/// Coarse grouping used for colouring and reporting.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StatusClass {
    Approved,
    Failed,
    Other
}

impl TransactionStatus {
    pub fn class(&self) -> StatusClass {
        match self {
            Self::SurchargeApplied | Self::Approved | Self::Captured => StatusClass::Approved,
            Self::Declined | Self::TimedOut | Self::Error | Self::Canceled => StatusClass::Failed,
            Self::SurchargePending | Self::Refunded | Self::Unknown | Self::Reversed
            | Self::PickupCard | Self::Pending | Self::Authorized | Self::Settled => StatusClass::Other
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Authorized => "Authorized",
            Self::Captured => "Captured",
            Self::SurchargePending => "Surcharge Pending",
            Self::SurchargeApplied => "Surcharge Applied",
            Self::Approved => "Approved",
            Self::Declined => "Declined",
            Self::Refunded => "Refunded",
            Self::Reversed => "Reversed",
            Self::PickupCard => "Pickup Card",
            Self::TimedOut => "Timed Out",
            Self::Canceled => "Canceled",
            Self::Error => "Error",
            Self::Settled => "Settled",
            Self::Unknown => "Unknown"
        }
    }
}

/// A processor-issued transaction record. The checkout only ever reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: TransactionId,
    /// Raw processor type code such as `sale` or `incremental_auth`.
    #[serde(default)]
    pub transaction_type: String,
    pub status: TransactionStatus,
    #[serde(default)]
    pub status_reason: Option<String>,
    #[serde(default)]
    pub processor_response_message: Option<String>,
    pub total_amount: Cents,
    #[serde(default)]
    pub subtotal: Cents,
    #[serde(default)]
    pub tax_amount: Cents,
    #[serde(default)]
    pub tip_amount: Cents,
    #[serde(default)]
    pub surcharge_amount: Option<Cents>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub surcharge_rate: Option<Decimal>,
    #[serde(default)]
    pub surcharge_applied: bool,
    #[serde(default)]
    pub surcharge_disclosure: Option<String>,
    /// Amount held by the gateway, when it reports one.
    #[serde(default)]
    pub authorized_amount: Option<Cents>,
    #[serde(default)]
    pub card_brand: Option<String>,
    #[serde(default)]
    pub card: Option<String>,
    #[serde(default)]
    pub currency: CurrencyCode
}

impl Transaction {
    pub fn type_display_name(&self) -> &'static str {
        match self.transaction_type.as_str() {
            "sale" => "Sale",
            "manually_keyed_sale" => "Keyed Sale",
            "auth" => "Auth",
            "capture" => "Capture",
            "refund" => "Refund",
            "reverse" => "Reverse",
            "tip_adjust" => "Tip Adjust",
            "incremental_auth" => "Incremental Auth",
            "verification" => "Verification",
            _ => "Unknown"
        }
    }
}

/// Envelope returned by charge and adjustment calls; the transaction itself may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    #[serde(default)]
    pub transaction: Option<Transaction>
}

impl TransactionResponse {
    pub fn from_transaction(transaction: Transaction) -> Self {
        Self {
            transaction_id: Some(transaction.transaction_id.clone()),
            status: Some(transaction.status),
            transaction: Some(transaction)
        }
    }
}
