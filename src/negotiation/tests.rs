use super::{
    authorized_amount, maximum_action_amount, AmountAdjuster, FailureKind, NegotiationState, Outcome,
    PendingOverride, SurchargeNegotiation, SurchargePrompt
};

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::config::CheckoutConfig;
use crate::models::{
    AdjustmentError, FlowKind, NegotiationError, PricingBreakdown, PricingInput, ProcessorError, RateEntry, RateMode,
    SurchargeEntry, Transaction, TransactionResponse, TransactionStatus
};
use crate::pricing::PricingCalculator;
use crate::processor::{AdjustmentRequest, ChargeRequest, ConfirmRequest, PaymentProcessor, SimulatedProcessor};
use crate::types::{Cents, CurrencyCode};

fn create_transaction(status: TransactionStatus, total: i64, surcharge: Option<i64>) -> Transaction {
    Transaction {
        transaction_id: "tx-1".to_string(),
        transaction_type: "sale".to_string(),
        status,
        status_reason: None,
        processor_response_message: None,
        total_amount: Cents::new(total),
        subtotal: Cents::new(total),
        tax_amount: Cents::ZERO,
        tip_amount: Cents::ZERO,
        surcharge_amount: surcharge.map(Cents::new),
        surcharge_rate: None,
        surcharge_applied: false,
        surcharge_disclosure: None,
        authorized_amount: None,
        card_brand: None,
        card: None,
        currency: CurrencyCode::usd()
    }
}

type Reply<T> = Result<T, ProcessorError>;

/// Replays queued replies and records every request it receives.
#[derive(Default)]
struct ScriptedProcessor {
    charge_replies: Mutex<VecDeque<Reply<TransactionResponse>>>,
    confirm_replies: Mutex<VecDeque<Reply<Transaction>>>,
    charges: Mutex<Vec<ChargeRequest>>,
    confirmations: Mutex<Vec<ConfirmRequest>>
}

impl ScriptedProcessor {
    async fn reply_to_charge(self: Arc<Self>, reply: Reply<TransactionResponse>) -> Arc<Self> {
        self.charge_replies.lock().await.push_back(reply);
        self
    }

    async fn reply_to_confirm(self: Arc<Self>, reply: Reply<Transaction>) -> Arc<Self> {
        self.confirm_replies.lock().await.push_back(reply);
        self
    }

    async fn next_charge_reply(&self, request: ChargeRequest) -> Reply<TransactionResponse> {
        self.charges.lock().await.push(request);
        self.charge_replies.lock().await.pop_front()
            .unwrap_or_else(|| Err(ProcessorError::new("No scripted reply")))
    }
}

#[async_trait]
impl PaymentProcessor for ScriptedProcessor {
    async fn preauthorize(&self, request: ChargeRequest) -> Result<TransactionResponse, ProcessorError> {
        self.next_charge_reply(request).await
    }

    async fn sale(&self, request: ChargeRequest) -> Result<TransactionResponse, ProcessorError> {
        self.next_charge_reply(request).await
    }

    async fn confirm(&self, request: ConfirmRequest) -> Result<Transaction, ProcessorError> {
        self.confirmations.lock().await.push(request);
        self.confirm_replies.lock().await.pop_front()
            .unwrap_or_else(|| Err(ProcessorError::new("No scripted reply")))
    }

    async fn capture(&self, _: AdjustmentRequest) -> Result<TransactionResponse, ProcessorError> {
        Ok(TransactionResponse::default())
    }

    async fn refund(&self, _: AdjustmentRequest) -> Result<TransactionResponse, ProcessorError> {
        Ok(TransactionResponse::default())
    }

    async fn reverse(&self, _: AdjustmentRequest) -> Result<TransactionResponse, ProcessorError> {
        Ok(TransactionResponse::default())
    }

    async fn incremental_auth(&self, _: AdjustmentRequest) -> Result<TransactionResponse, ProcessorError> {
        Ok(TransactionResponse::default())
    }

    async fn fetch(&self, transaction_id: &str) -> Result<Transaction, ProcessorError> {
        Err(ProcessorError::transaction_not_found(transaction_id))
    }
}

fn price(input: &PricingInput) -> PricingBreakdown {
    PricingCalculator::default().compute_breakdown(input)
}

async fn pending_negotiation(processor: Arc<ScriptedProcessor>) -> Result<SurchargeNegotiation<ScriptedProcessor>> {
    let mut negotiation = SurchargeNegotiation::new(processor, &CheckoutConfig::default());
    let outcome = negotiation.submit(&price(&PricingInput::new("12.50")), FlowKind::Sale).await?;

    if !matches!(outcome, Outcome::PendingConfirmation(_)) {
        return Err(anyhow!("expected a pending prompt, got {outcome:?}"));
    }

    Ok(negotiation)
}

#[test]
fn test_prompt_base_excludes_the_processor_surcharge() {
    let prompt = SurchargePrompt::from_transaction(
        FlowKind::Sale,
        create_transaction(TransactionStatus::SurchargePending, 1300, Some(50))
    );

    assert_eq!(prompt.base_amount, Cents::new(1250));
    assert_eq!(prompt.original_surcharge, Cents::new(50));
    assert_eq!(prompt.disclosure, "A surcharge is applied to cover processing fees.");
}

#[test]
fn test_prompt_base_never_goes_negative() {
    let prompt = SurchargePrompt::from_transaction(
        FlowKind::Auth,
        create_transaction(TransactionStatus::Pending, 40, Some(50))
    );

    assert_eq!(prompt.base_amount, Cents::ZERO);
}

#[test]
fn test_prompt_disclosure_prefers_processor_text_then_rate() {
    let mut transaction = create_transaction(TransactionStatus::SurchargePending, 1300, Some(50));
    transaction.surcharge_rate = Some(Decimal::from(4));

    let derived = SurchargePrompt::from_transaction(FlowKind::Sale, transaction.clone());

    assert_eq!(derived.disclosure, "A 4.00% surcharge is applied to cover processing fees.");

    transaction.surcharge_disclosure = Some("Card payments carry a fee.".to_string());
    let explicit = SurchargePrompt::from_transaction(FlowKind::Sale, transaction);

    assert_eq!(explicit.disclosure, "Card payments carry a fee.");
}

#[test]
fn test_percentage_override_quote_on_pending_base() -> Result<()> {
    let prompt = SurchargePrompt::from_transaction(
        FlowKind::Sale,
        create_transaction(TransactionStatus::SurchargePending, 1300, Some(50))
    );
    let quote = prompt.quote(Some(&PendingOverride::percentage("5"))).ok_or_else(|| anyhow!("quote missing"))?;

    assert_eq!(quote.surcharge, Cents::new(63));
    assert_eq!(quote.total, Cents::new(1313));
    assert!(quote.is_override());

    let rows = prompt.summary(Some(&PendingOverride::percentage("5")), &CurrencyCode::usd());

    assert_eq!(rows[1].label, "Override Surcharge");
    assert_eq!(rows[2].value, "$13.13");

    Ok(())
}

#[test]
fn test_zero_fixed_override_is_not_submittable() {
    let pending = PendingOverride::fixed("0.00");

    assert!(pending.quote(Cents::new(1250)).is_none());
    assert!(!pending.is_submittable(Cents::new(1250)));

    let mut disabled = pending;
    disabled.enabled = false;

    assert!(disabled.is_submittable(Cents::new(1250)));
}

#[test]
fn test_switching_override_mode_replaces_the_entered_value() -> Result<()> {
    let mut pending = PendingOverride::fixed("0.75");

    pending.set_entry(RateEntry::percentage("5"));

    assert_eq!(pending.entry(), &RateEntry::percentage("5"));
    assert_eq!(pending.mode(), RateMode::Percentage(Decimal::from(5)));

    let quote = pending.quote(Cents::new(1250)).ok_or_else(|| anyhow!("quote missing"))?;

    assert_eq!(quote.surcharge, Cents::new(63));

    Ok(())
}

#[tokio::test]
async fn test_submit_pending_status_builds_prompt() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::from_transaction(
            create_transaction(TransactionStatus::SurchargePending, 1300, Some(50))
        ))).await;

    let negotiation = pending_negotiation(processor).await?;
    let prompt = negotiation.prompt().ok_or_else(|| anyhow!("prompt missing"))?;

    assert_eq!(prompt.base_amount, Cents::new(1250));
    assert!(!negotiation.state().is_terminal());

    Ok(())
}

#[tokio::test]
async fn test_submit_omits_all_zero_breakdown() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::from_transaction(
            create_transaction(TransactionStatus::Captured, 1000, None)
        ))).await;
    let mut negotiation = SurchargeNegotiation::new(processor.clone(), &CheckoutConfig::default());

    let input = PricingInput::new("10.00").with_breakdown(true);
    let outcome = negotiation.submit(&price(&input), FlowKind::Sale).await?;

    assert!(matches!(outcome, Outcome::Approved(_)));
    assert!(matches!(negotiation.state(), NegotiationState::Succeeded(_)));

    let charges = processor.charges.lock().await;

    assert_eq!(charges.len(), 1);
    assert_eq!(charges[0].amount, Cents::new(1000));
    assert!(charges[0].breakdown.is_none());

    Ok(())
}

#[tokio::test]
async fn test_submit_sends_breakdown_when_tax_is_present() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::from_transaction(
            create_transaction(TransactionStatus::Authorized, 1288, None)
        ))).await;
    let mut negotiation = SurchargeNegotiation::new(processor.clone(), &CheckoutConfig::default());

    let input = PricingInput::new("10.00")
        .with_breakdown(true)
        .with_tax(RateEntry::percentage("8.75"))
        .with_tip(RateEntry::fixed("2.00"));
    negotiation.submit(&price(&input), FlowKind::Auth).await?;

    let charges = processor.charges.lock().await;
    let breakdown = charges[0].breakdown.as_ref().ok_or_else(|| anyhow!("breakdown missing"))?;

    assert_eq!(charges[0].amount, Cents::new(1288));
    assert_eq!(charges[0].flow, FlowKind::Auth);
    assert_eq!(breakdown.tax_amount, Cents::new(88));
    assert_eq!(breakdown.tip_amount, Some(Cents::new(200)));

    Ok(())
}

#[tokio::test]
async fn test_submit_bypass_sends_breakdown_with_zero_amounts() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::from_transaction(
            create_transaction(TransactionStatus::Captured, 1000, None)
        ))).await;
    let mut negotiation = SurchargeNegotiation::new(processor.clone(), &CheckoutConfig::default());

    let input = PricingInput::new("10.00").with_surcharge(SurchargeEntry::Bypass);
    negotiation.submit(&price(&input), FlowKind::Sale).await?;

    let charges = processor.charges.lock().await;
    let surcharge = charges[0].breakdown.as_ref()
        .and_then(|breakdown| breakdown.surcharge.as_ref())
        .ok_or_else(|| anyhow!("surcharge directive missing"))?;

    assert!(surcharge.bypass);

    Ok(())
}

#[tokio::test]
async fn test_submit_declined_is_terminal_with_reason() -> Result<()> {
    let mut declined = create_transaction(TransactionStatus::Declined, 1000, None);
    declined.processor_response_message = Some("Do not honor".to_string());

    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::from_transaction(declined))).await;
    let mut negotiation = SurchargeNegotiation::new(processor, &CheckoutConfig::default());

    let outcome = negotiation.submit(&price(&PricingInput::new("10.00")), FlowKind::Sale).await?;

    match outcome {
        Outcome::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::Declined);
            assert_eq!(failure.reason, "Do not honor");
        }
        other => return Err(anyhow!("expected a decline, got {other:?}"))
    }

    assert!(negotiation.prompt().is_none());
    assert!(negotiation.state().is_terminal());

    Ok(())
}

#[tokio::test]
async fn test_submit_status_mapping_always_carries_a_reason() -> Result<()> {
    let cases = [
        (TransactionStatus::Declined, FailureKind::Declined, "Transaction declined"),
        (TransactionStatus::TimedOut, FailureKind::Failed, "Transaction failed"),
        (TransactionStatus::Canceled, FailureKind::Failed, "Transaction failed"),
        (TransactionStatus::Refunded, FailureKind::UnknownStatus, "Unknown transaction status"),
        (TransactionStatus::Unknown, FailureKind::UnknownStatus, "Unknown transaction status")
    ];

    for (status, kind, reason) in cases {
        let processor = Arc::new(ScriptedProcessor::default())
            .reply_to_charge(Ok(TransactionResponse::from_transaction(create_transaction(status, 1000, None)))).await;
        let mut negotiation = SurchargeNegotiation::new(processor, &CheckoutConfig::default());

        match negotiation.submit(&price(&PricingInput::new("10.00")), FlowKind::Sale).await? {
            Outcome::Failed(failure) => {
                assert_eq!(failure.kind, kind);
                assert_eq!(failure.reason, reason);
            }
            other => return Err(anyhow!("expected failure for {status:?}, got {other:?}"))
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_submit_missing_transaction_is_a_failure() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::default())).await;
    let mut negotiation = SurchargeNegotiation::new(processor, &CheckoutConfig::default());

    let outcome = negotiation.submit(&price(&PricingInput::new("10.00")), FlowKind::Sale).await?;

    assert!(matches!(
        outcome,
        Outcome::Failed(failure) if failure.kind == FailureKind::MissingTransaction && failure.reason == "Transaction details missing"
    ));

    Ok(())
}

#[tokio::test]
async fn test_submit_remote_error_is_surfaced_verbatim() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Err(ProcessorError::with_reason("Reader disconnected", "bluetooth"))).await;
    let mut negotiation = SurchargeNegotiation::new(processor, &CheckoutConfig::default());

    match negotiation.submit(&price(&PricingInput::new("10.00")), FlowKind::Sale).await? {
        Outcome::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::Remote);
            assert_eq!(failure.reason, "Reader disconnected");
            assert_eq!(failure.detail.as_deref(), Some("bluetooth"));
        }
        other => return Err(anyhow!("expected remote failure, got {other:?}"))
    }

    Ok(())
}

#[tokio::test]
async fn test_submit_while_prompt_outstanding_is_rejected() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::from_transaction(
            create_transaction(TransactionStatus::SurchargePending, 1300, Some(50))
        ))).await;
    let mut negotiation = pending_negotiation(processor.clone()).await?;

    let result = negotiation.submit(&price(&PricingInput::new("10.00")), FlowKind::Sale).await;

    assert!(matches!(result, Err(NegotiationError::PromptOutstanding { .. })));
    assert_eq!(processor.charges.lock().await.len(), 1);
    assert!(negotiation.prompt().is_some());

    Ok(())
}

#[tokio::test]
async fn test_decide_without_prompt_is_rejected() {
    let processor = Arc::new(ScriptedProcessor::default());
    let mut negotiation = SurchargeNegotiation::new(processor, &CheckoutConfig::default());

    assert!(!negotiation.can_decide(false, None));
    assert!(matches!(negotiation.decide(true, None).await, Err(NegotiationError::NoPendingPrompt)));
}

#[tokio::test]
async fn test_decide_with_percentage_override_submits_new_total() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::from_transaction(
            create_transaction(TransactionStatus::SurchargePending, 1300, Some(50))
        ))).await
        .reply_to_confirm(Ok(create_transaction(TransactionStatus::Captured, 1313, Some(63)))).await;
    let mut negotiation = pending_negotiation(processor.clone()).await?;

    let pending = PendingOverride::percentage("5");

    assert!(negotiation.can_decide(true, Some(&pending)));

    let outcome = negotiation.decide(true, Some(&pending)).await?;

    assert!(matches!(outcome, Outcome::Approved(_)));
    assert!(negotiation.prompt().is_none());

    let confirmations = processor.confirmations.lock().await;
    let request = &confirmations[0];
    let breakdown = request.breakdown.as_ref().ok_or_else(|| anyhow!("override breakdown missing"))?;

    assert!(request.confirm);
    assert_eq!(request.amount, Some(Cents::new(1313)));
    assert_eq!(breakdown.subtotal, Cents::new(1250));
    assert_eq!(breakdown.requested_surcharge(), Some(Cents::new(63)));
    assert!(request.event_id.is_some());

    Ok(())
}

#[tokio::test]
async fn test_decide_with_zero_override_is_blocked_and_prompt_survives() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::from_transaction(
            create_transaction(TransactionStatus::SurchargePending, 1300, Some(50))
        ))).await;
    let mut negotiation = pending_negotiation(processor.clone()).await?;

    let pending = PendingOverride::fixed("0.00");

    assert!(!negotiation.can_decide(true, Some(&pending)));
    assert!(negotiation.can_decide(false, Some(&pending)));

    let result = negotiation.decide(true, Some(&pending)).await;

    assert!(matches!(result, Err(NegotiationError::InvalidOverride { .. })));
    assert!(processor.confirmations.lock().await.is_empty());
    assert!(negotiation.prompt().is_some());

    Ok(())
}

#[tokio::test]
async fn test_decline_ignores_override_and_sends_no_amount() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::from_transaction(
            create_transaction(TransactionStatus::SurchargePending, 1300, Some(50))
        ))).await
        .reply_to_confirm(Ok(create_transaction(TransactionStatus::Canceled, 1300, Some(50)))).await;
    let mut negotiation = pending_negotiation(processor.clone()).await?;

    let outcome = negotiation.decide(false, Some(&PendingOverride::fixed("1.00"))).await?;

    assert!(matches!(outcome, Outcome::Failed(ref failure) if failure.kind == FailureKind::Failed));

    let confirmations = processor.confirmations.lock().await;

    assert!(!confirmations[0].confirm);
    assert!(confirmations[0].amount.is_none());
    assert!(confirmations[0].breakdown.is_none());

    Ok(())
}

#[tokio::test]
async fn test_plain_confirm_lets_processor_keep_its_amount() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::from_transaction(
            create_transaction(TransactionStatus::SurchargePending, 1300, Some(50))
        ))).await
        .reply_to_confirm(Ok(create_transaction(TransactionStatus::Captured, 1300, Some(50)))).await;
    let mut negotiation = pending_negotiation(processor.clone()).await?;

    let mut disabled = PendingOverride::fixed("0");
    disabled.enabled = false;
    negotiation.decide(true, Some(&disabled)).await?;

    let confirmations = processor.confirmations.lock().await;

    assert!(confirmations[0].amount.is_none());
    assert!(confirmations[0].breakdown.is_none());

    Ok(())
}

#[tokio::test]
async fn test_failed_decision_discards_prompt_and_requires_restart() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::from_transaction(
            create_transaction(TransactionStatus::SurchargePending, 1300, Some(50))
        ))).await
        .reply_to_confirm(Err(ProcessorError::new("Gateway timeout"))).await;
    let mut negotiation = pending_negotiation(processor).await?;

    let outcome = negotiation.decide(true, None).await?;

    assert!(matches!(outcome, Outcome::Failed(ref failure) if failure.reason == "Gateway timeout"));
    assert!(matches!(negotiation.decide(true, None).await, Err(NegotiationError::NoPendingPrompt)));

    negotiation.reset();

    assert_eq!(negotiation.state(), &NegotiationState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_decision_that_stays_pending_is_a_failure() -> Result<()> {
    let processor = Arc::new(ScriptedProcessor::default())
        .reply_to_charge(Ok(TransactionResponse::from_transaction(
            create_transaction(TransactionStatus::SurchargePending, 1300, Some(50))
        ))).await
        .reply_to_confirm(Ok(create_transaction(TransactionStatus::Pending, 1300, Some(50)))).await;
    let mut negotiation = pending_negotiation(processor).await?;

    let outcome = negotiation.decide(true, None).await?;

    assert!(matches!(outcome, Outcome::Failed(ref failure) if failure.kind == FailureKind::UnknownStatus));
    assert!(negotiation.state().is_terminal());

    Ok(())
}

#[tokio::test]
async fn test_full_override_flow_against_simulated_processor() -> Result<()> {
    let processor = Arc::new(
        SimulatedProcessor::new()
            .with_surcharge_rate(Decimal::from(4))
            .with_disclosure("A 4% fee applies to credit cards.")
    );
    let mut negotiation = SurchargeNegotiation::new(processor.clone(), &CheckoutConfig::default());

    let outcome = negotiation.submit(&price(&PricingInput::new("12.50")), FlowKind::Sale).await?;
    let prompt = match outcome {
        Outcome::PendingConfirmation(prompt) => prompt,
        other => return Err(anyhow!("expected prompt, got {other:?}"))
    };

    assert_eq!(prompt.base_amount, Cents::new(1250));
    assert_eq!(prompt.disclosure, "A 4% fee applies to credit cards.");
    assert!(!negotiation.state().is_in_flight());

    let outcome = negotiation.decide(true, Some(&PendingOverride::percentage("5"))).await?;
    let transaction = match outcome {
        Outcome::Approved(transaction) => transaction,
        other => return Err(anyhow!("expected approval, got {other:?}"))
    };

    assert_eq!(transaction.total_amount, Cents::new(1313));
    assert_eq!(transaction.surcharge_amount, Some(Cents::new(63)));
    assert_eq!(processor.get(&transaction.transaction_id).map(|tx| tx.status), Some(TransactionStatus::Captured));

    Ok(())
}

#[test]
fn test_authorized_and_maximum_action_amounts() {
    let mut transaction = create_transaction(TransactionStatus::Authorized, 5000, None);

    assert_eq!(authorized_amount(&transaction), Some(Cents::new(5000)));
    assert_eq!(maximum_action_amount(&transaction), Some(Cents::new(4999)));

    transaction.authorized_amount = Some(Cents::new(4000));

    assert_eq!(authorized_amount(&transaction), Some(Cents::new(4000)));

    transaction.authorized_amount = Some(Cents::ZERO);
    transaction.total_amount = Cents::new(1);

    assert_eq!(authorized_amount(&transaction), Some(Cents::new(1)));
    assert_eq!(maximum_action_amount(&transaction), None);

    transaction.total_amount = Cents::ZERO;

    assert_eq!(authorized_amount(&transaction), None);
}

#[tokio::test]
async fn test_adjuster_rejects_amounts_client_side() -> Result<()> {
    let processor = Arc::new(SimulatedProcessor::new());
    let adjuster = AmountAdjuster::new(processor.clone());
    let transaction = processor.preauthorize(ChargeRequest::new(Cents::new(5000), None, CurrencyCode::usd(), FlowKind::Auth)).await?
        .transaction.ok_or_else(|| anyhow!("transaction missing"))?;

    assert!(matches!(
        adjuster.capture(&transaction, Some(Cents::ZERO)).await,
        Err(AdjustmentError::NonPositiveAmount { .. })
    ));
    assert!(matches!(
        adjuster.capture(&transaction, Some(Cents::new(5001))).await,
        Err(AdjustmentError::ExceedsAuthorized { .. })
    ));
    assert!(matches!(
        adjuster.reverse(&transaction, Some(Cents::new(5000))).await,
        Err(AdjustmentError::ExceedsAuthorized { .. })
    ));
    assert!(matches!(
        adjuster.incremental_auth(&transaction, Cents::ZERO).await,
        Err(AdjustmentError::NonPositiveAmount { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_adjuster_round_trips_through_processor() -> Result<()> {
    let processor = Arc::new(SimulatedProcessor::new());
    let adjuster = AmountAdjuster::new(processor.clone());
    let transaction = processor.preauthorize(ChargeRequest::new(Cents::new(5000), None, CurrencyCode::usd(), FlowKind::Auth)).await?
        .transaction.ok_or_else(|| anyhow!("transaction missing"))?;

    let increased = adjuster.incremental_auth(&transaction, Cents::new(1000)).await?;

    assert_eq!(authorized_amount(&increased), Some(Cents::new(6000)));

    let reduced = adjuster.reverse(&increased, Some(Cents::new(500))).await?;

    assert_eq!(reduced.total_amount, Cents::new(5500));

    let captured = adjuster.capture(&reduced, None).await?;

    assert_eq!(captured.status, TransactionStatus::Captured);

    let refunded = adjuster.refund(&captured, Some(Cents::new(5500))).await?;

    assert_eq!(refunded.status, TransactionStatus::Refunded);

    Ok(())
}

#[tokio::test]
async fn test_adjuster_reports_missing_transaction_and_processor_errors() -> Result<()> {
    let scripted = AmountAdjuster::new(Arc::new(ScriptedProcessor::default()));
    let transaction = create_transaction(TransactionStatus::Authorized, 5000, None);

    assert!(matches!(scripted.capture(&transaction, None).await, Err(AdjustmentError::MissingTransaction)));

    let simulated = AmountAdjuster::new(Arc::new(SimulatedProcessor::new()));

    assert!(matches!(
        simulated.refund(&transaction, None).await,
        Err(AdjustmentError::Processor(error)) if error.message == "Transaction not found"
    ));

    Ok(())
}

#[test]
fn test_override_mode_is_resolved_from_entry() {
    let pending = PendingOverride::percentage("5%");

    assert_eq!(pending.mode(), RateMode::Percentage(Decimal::from(5)));
}
