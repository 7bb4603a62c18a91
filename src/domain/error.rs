use rust_decimal::Decimal;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error("Ingestion failed with: {0}")]
    Ingestion(String),

    #[error("Invalid amount: {0} (must be greater than zero and at most {max})", max = crate::domain::Money::MAX_AMOUNT)]
    InvalidAmount(Decimal),

    #[error("Invalid split: custom shares total {total}, expense amount is {amount}")]
    InvalidSplit { amount: Decimal, total: Decimal },

    #[error("Invalid participants: {0}")]
    InvalidParticipants(String),

    #[error("Engine failed with: {0}")]
    Engine(String),
}
