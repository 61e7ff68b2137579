use crate::models::Transaction;
use crate::types::CurrencyCode;

/// A single labelled line of a receipt-style summary.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SummaryRow {
    pub label: &'static str,
    pub value: String
}

impl SummaryRow {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into() }
    }
}

/// Fixed, hand-mapped display rows for a processor transaction.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransactionSummary {
    pub title: &'static str,
    pub rows: Vec<SummaryRow>
}

impl TransactionSummary {
    pub fn from_transaction(transaction: &Transaction, currency: &CurrencyCode) -> Self {
        let mut rows = vec![
            SummaryRow::new("Transaction ID", transaction.transaction_id.clone()),
            SummaryRow::new("Type", transaction.type_display_name()),
            SummaryRow::new("Status", transaction.status.display_name()),
        ];

        if let Some(reason) = transaction.status_reason.as_deref().filter(|reason| !reason.is_empty()) {
            rows.push(SummaryRow::new("Status Reason", reason));
        }

        if let Some(brand) = transaction.card_brand.as_deref().filter(|brand| !brand.is_empty()) {
            rows.push(SummaryRow::new("Card Brand", brand));
        }

        if let Some(card) = transaction.card.as_deref().filter(|card| !card.is_empty()) {
            rows.push(SummaryRow::new("Card", card));
        }

        rows.push(SummaryRow::new("Subtotal", transaction.subtotal.format(currency)));
        rows.push(SummaryRow::new("Tax", transaction.tax_amount.format(currency)));
        rows.push(SummaryRow::new("Tip", transaction.tip_amount.format(currency)));

        if let Some(surcharge) = transaction.surcharge_amount.filter(|amount| transaction.surcharge_applied && amount.is_positive()) {
            rows.push(SummaryRow::new("Surcharge", surcharge.format(currency)));
        }

        rows.push(SummaryRow::new("Total", transaction.total_amount.format(currency)));

        Self {
            title: transaction.type_display_name(),
            rows
        }
    }

    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.rows.iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}
