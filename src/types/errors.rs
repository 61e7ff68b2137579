use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonetaryError {
    #[error("Monetary error: {0}")]
    InvalidFormat(String),
    #[error("Monetary error: Negative amount [{0}]")]
    Negative(String),
    #[error("Monetary error: Overflow")]
    Overflow
}
