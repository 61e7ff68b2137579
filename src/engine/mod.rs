mod checkout_engine;
mod checkout_row;

pub use checkout_engine::{checkout, CheckoutEngine};
pub use checkout_row::{CheckoutResult, CheckoutRow, CheckoutStatus, Decision, EntryMode, SurchargeMode};
