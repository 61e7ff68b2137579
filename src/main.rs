use std::io::{stderr, stdout, BufWriter};
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use rust_decimal::Decimal;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use surcharge_checkout::config::{CheckoutConfig, TaxBase};
use surcharge_checkout::engine::{CheckoutEngine, CheckoutResult};
use surcharge_checkout::processor::SimulatedProcessor;
use surcharge_checkout::types::Cents;

//NOTE: The simulated processor stands in for a card reader SDK; these mirror a typical merchant setup
const SIMULATED_SURCHARGE_RATE: u32 = 3;
const SIMULATED_DECLINE_ABOVE: Cents = Cents::new(500_000);
const SIMULATED_DISCLOSURE: &str = "A 3% surcharge applies to credit card payments. It does not exceed our cost of acceptance.";

#[tokio::main]
async fn main() -> Result<()> {
    //NOTE: If I was making a much more sophisticated CLI application, I would have used the clap crate
    //      to handle the CLI parsing and execution.
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: surcharge-checkout [input].csv [log_level:optional] [tax_base:optional] > [output].csv");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        eprintln!("Available tax bases: subtotal_and_tip, subtotal (default: subtotal_and_tip)");
        exit(1);
    }

    let path = &args[1];
    let log_level = args.get(2)
        .map(|s| parse_log_level(s)).unwrap_or_else(|| LevelFilter::ERROR);

    setup_logging(log_level);

    let tax_base = args.get(3)
        .map(|s| parse_tax_base(s)).unwrap_or_default();
    let config = CheckoutConfig::new().with_tax_base(tax_base);

    let processor = Arc::new(
        SimulatedProcessor::new()
            .with_surcharge_rate(Decimal::from(SIMULATED_SURCHARGE_RATE))
            .with_disclosure(SIMULATED_DISCLOSURE)
            .with_decline_above(SIMULATED_DECLINE_ABOVE)
    );
    let engine = CheckoutEngine::new(processor, config);

    let timer = Instant::now();
    let results = engine.run(path).await?;
    let duration = timer.elapsed();

    info!("Processed checkouts in: {duration:?}");

    write_results_to_stdout(&results)?;

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn parse_tax_base(value: &str) -> TaxBase {
    TaxBase::parse(value).unwrap_or_else(|| {
        eprintln!("Invalid tax base '{}', defaulting to 'subtotal_and_tip'", value);
        TaxBase::default()
    })
}

fn setup_logging(level: LevelFilter) {
    //NOTE: Because we are doing stdout redirection, we will need to utilize stderr to display logging
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn write_results_to_stdout(results: &[CheckoutResult]) -> Result<()> {
    let mut output = csv::Writer::from_writer(BufWriter::new(stdout().lock()));

    for result in results {
        output.serialize(result)?;
    }

    //NOTE: The header is written alongside the first record, so an empty run still needs one
    if results.is_empty() {
        output.write_record(["id", "flow", "subtotal", "tax", "tip", "surcharge", "total", "outcome", "transaction_id", "reason"])?;
    }

    output.flush()?;

    Ok(())
}
