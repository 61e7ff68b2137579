mod currency;
mod errors;
mod monetary;

pub use currency::CurrencyCode;
pub use errors::MonetaryError;
pub use monetary::{parse_percent, Cents, MAX_CENTS};

pub type TransactionId = String;
