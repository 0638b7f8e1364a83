use cosmwasm_std::{CheckedMultiplyRatioError, OverflowError, Uint128};
use thiserror::Error;

/// Errors surfaced by the crowdsale engine and its collaborators.
///
/// Every ledger operation is all-or-nothing: when one of these is returned the
/// ledger state is exactly what it was before the call.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid stage: {0}")]
    InvalidStage(String),

    #[error("Cap exceeded: requested {requested}, available {available}")]
    CapExceeded {
        requested: Uint128,
        available: Uint128,
    },

    #[error("Nothing to release for {0}")]
    NothingToRelease(String),

    #[error("Nothing to refund: {0}")]
    NothingToRefund(String),

    #[error("Time gate not reached: {0}")]
    TimeGateNotReached(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Token ledger error: {0}")]
    Token(String),

    #[error("Treasury error: {0}")]
    Treasury(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Arithmetic overflow: {0}")]
    Overflow(#[from] OverflowError),

    #[error("Price calculation error: {0}")]
    MultiplyRatio(#[from] CheckedMultiplyRatioError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Short machine-readable kind, used in CLI output and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Unauthorized(_) => "unauthorized",
            Error::InvalidStage(_) => "invalid_stage",
            Error::CapExceeded { .. } => "cap_exceeded",
            Error::NothingToRelease(_) => "nothing_to_release",
            Error::NothingToRefund(_) => "nothing_to_refund",
            Error::TimeGateNotReached(_) => "time_gate_not_reached",
            Error::InvalidAmount(_) => "invalid_amount",
            Error::Token(_) => "token",
            Error::Treasury(_) => "treasury",
            Error::Config(_) => "config",
            Error::Logging(_) => "logging",
            Error::Overflow(_) => "overflow",
            Error::MultiplyRatio(_) => "multiply_ratio",
            Error::Io(_) => "io",
            Error::Serialization(_) => "serialization",
        }
    }
}
