//! Card-present checkout pricing and processor surcharge negotiation.
//!
//! The binary in `main.rs` replays checkout rows from a CSV file through [`engine::CheckoutEngine`];
//! the pricing, negotiation and adjustment types are usable on their own against any
//! [`processor::PaymentProcessor`].

pub mod config;
pub mod engine;
pub mod models;
pub mod negotiation;
pub mod pricing;
pub mod processor;
pub mod types;
