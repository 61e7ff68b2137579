use crate::config::CheckoutConfig;
use crate::engine::{CheckoutResult, CheckoutRow, CheckoutStatus, Decision};
use crate::models::{NegotiationError, PricingBreakdown, TransactionSummary};
use crate::negotiation::{FailureKind, Outcome, SurchargeNegotiation};
use crate::pricing::PricingCalculator;
use crate::processor::PaymentProcessor;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{spawn, spawn_blocking, JoinHandle};
use tracing::{debug, error, info};

/// Prices and negotiates every checkout in a CSV file against one processor.
pub struct CheckoutEngine<P: PaymentProcessor> {
    processor: Arc<P>,
    config: CheckoutConfig
}

impl<P: PaymentProcessor> CheckoutEngine<P> {
    pub fn new(processor: Arc<P>, config: CheckoutConfig) -> Self {
        Self {
            processor,
            config
        }
    }

    /// Orchestrates the end-to-end checkout pipeline for a CSV file. Results keep the input order.
    pub async fn run(&self, path: &str) -> anyhow::Result<Vec<CheckoutResult>> {
        let (sender, receiver) = mpsc::channel::<CheckoutRow>(self.config.backpressure.max(1));
        let csv_handle = self.spawn_csv_reader(path.to_string(), sender);
        let results = self.process_checkouts(receiver).await;

        if let Err(error) = csv_handle.await {
            error!("CSV ingestion failed: {error}");
        }

        Ok(results)
    }

    fn spawn_csv_reader(&self, path: String, sender: mpsc::Sender<CheckoutRow>) -> JoinHandle<()> {
        spawn_blocking(move || {
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(error) => {
                    error!("Error opening CSV at path: {path} | {error}");
                    return;
                }
            };

            let mut reader = ReaderBuilder::new()
                .trim(Trim::All)
                .flexible(true)
                .from_reader(BufReader::new(file));

            for result in reader.deserialize::<CheckoutRow>() {
                match result {
                    Ok(row) => {
                        if sender.blocking_send(row).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        error!("CSV deserialization error: {error}");
                    }
                }
            }
        })
    }

    async fn process_checkouts(&self, mut receiver: mpsc::Receiver<CheckoutRow>) -> Vec<CheckoutResult> {
        let mut checkouts = Vec::new();
        let in_flight = Arc::new(Semaphore::new(self.config.backpressure.max(1)));

        //NOTE: Every checkout owns its own negotiation, so rows run concurrently against the shared processor,
        //      at most `backpressure` at a time; a full limiter stalls the reader through the channel
        while let Some(row) = receiver.recv().await {
            let permit = match in_flight.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(error) => {
                    error!("Checkout limiter closed: {error}");
                    break;
                }
            };

            let processor = self.processor.clone();
            let config = self.config.clone();
            let id = row.id.clone();

            checkouts.push((id, spawn(async move {
                let result = checkout(row, processor, config).await;
                drop(permit);
                result
            })));
        }

        let mut results = Vec::with_capacity(checkouts.len());

        for (id, handle) in checkouts {
            match handle.await {
                Ok(result) => results.push(result),
                Err(error) => error!("Checkout [{id}] did not complete: {error:?}")
            }
        }

        info!("Completed [{}] checkouts", results.len());

        results
    }
}

/// Runs one row through pricing, submission and, when asked for, the surcharge decision.
pub async fn checkout<P: PaymentProcessor>(row: CheckoutRow, processor: Arc<P>, config: CheckoutConfig) -> CheckoutResult {
    let breakdown = PricingCalculator::new(&config).compute_breakdown(&row.to_input());
    let mut negotiation = SurchargeNegotiation::new(processor, &config);

    debug!("Checkout [{}] priced at [{}]", row.id, breakdown.formatted_total());

    let outcome = match negotiation.submit(&breakdown, row.flow).await {
        Ok(Outcome::PendingConfirmation(prompt)) => match row.decision {
            None => {
                for line in prompt.summary(None, &config.currency) {
                    debug!("Checkout [{}] pending | {}: {}", row.id, line.label, line.value);
                }

                info!("Checkout [{}] left awaiting a surcharge decision", row.id);
                return summarize(&row, &breakdown, Outcome::PendingConfirmation(prompt));
            }
            Some(decision) => {
                let confirm = !matches!(decision, Decision::Decline);
                negotiation.decide(confirm, row.pending_override().as_ref()).await
            }
        },
        other => other
    };

    match outcome {
        Ok(outcome) => {
            if let Outcome::Approved(transaction) = &outcome {
                let summary = TransactionSummary::from_transaction(transaction, &config.currency);

                for line in &summary.rows {
                    debug!("Checkout [{}] {} | {}: {}", row.id, summary.title, line.label, line.value);
                }
            }

            summarize(&row, &breakdown, outcome)
        }
        Err(error) => {
            //NOTE: A rejected decision leaves the prompt in place, so the remote transaction is still known
            let transaction_id = negotiation.prompt().map(|prompt| prompt.transaction_id().to_string());
            blocked(&row, &breakdown, transaction_id, &error)
        }
    }
}

fn summarize(row: &CheckoutRow, breakdown: &PricingBreakdown, outcome: Outcome) -> CheckoutResult {
    let mut result = CheckoutResult {
        id: row.id.clone(),
        flow: row.flow,
        subtotal: breakdown.subtotal,
        tax: breakdown.tax_amount,
        tip: breakdown.tip_amount,
        surcharge: breakdown.surcharge_amount,
        total: breakdown.total_amount,
        outcome: CheckoutStatus::Approved,
        transaction_id: outcome.transaction().map(|transaction| transaction.transaction_id.clone()),
        reason: String::new()
    };

    if let Some(transaction) = outcome.transaction() {
        result.surcharge = transaction.surcharge_amount.unwrap_or(result.surcharge);
        result.total = transaction.total_amount;
    }

    match outcome {
        Outcome::Approved(_) => {}
        Outcome::PendingConfirmation(prompt) => {
            result.outcome = CheckoutStatus::Pending;
            result.reason = prompt.disclosure;
        }
        Outcome::Failed(failure) => {
            result.outcome = match failure.kind {
                FailureKind::Declined => CheckoutStatus::Declined,
                _ => CheckoutStatus::Failed
            };
            result.reason = failure.reason;
        }
    }

    result
}

fn blocked(row: &CheckoutRow, breakdown: &PricingBreakdown, transaction_id: Option<String>, error: &NegotiationError) -> CheckoutResult {
    let reason = match error {
        NegotiationError::InvalidOverride { .. } => "Override surcharge must be positive".to_string(),
        other => other.to_string()
    };

    error!("Checkout [{}] blocked: {reason}", row.id);

    CheckoutResult {
        id: row.id.clone(),
        flow: row.flow,
        subtotal: breakdown.subtotal,
        tax: breakdown.tax_amount,
        tip: breakdown.tip_amount,
        surcharge: breakdown.surcharge_amount,
        total: breakdown.total_amount,
        outcome: CheckoutStatus::Blocked,
        transaction_id,
        reason
    }
}
