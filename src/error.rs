use serde::Serialize;
use thiserror::Error;

use crate::chain::state::ContestState;
use crate::ledger::models::{ChainId, ContestStatus, TournamentStatus};

/// Top-level error type for the engine
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("State drift on contest {contest_id}: expected on-chain {expected}, found {actual}")]
    StateDrift {
        contest_id: String,
        expected: String,
        actual: ContestState,
    },

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A transition that is not allowed right now. Never a fault.
#[derive(Error, Debug)]
pub enum PreconditionError {
    #[error("contest status is {current}, expected one of {expected}")]
    StatusMismatch {
        current: ContestStatus,
        expected: String,
    },

    #[error("tournament status is {current}, expected {expected}")]
    TournamentNotEligible {
        current: TournamentStatus,
        expected: String,
    },

    #[error("chain {0} is not a supported network")]
    UnsupportedNetwork(ChainId),

    #[error("contract {contest} on chain {chain_id} does not recognise the configured oracle")]
    OracleMismatch { contest: String, chain_id: ChainId },

    #[error("payout basis points sum to {sum}, expected 10000")]
    PayoutSkew { sum: u64 },

    #[error("no accumulated oracle fee to claim")]
    ZeroOracleFee,
}

/// RPC and transaction failures
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("RPC call failed on chain {chain_id}: {message}")]
    Rpc { chain_id: ChainId, message: String },

    #[error("Transaction {tx_hash} reverted on chain {chain_id}")]
    Reverted { chain_id: ChainId, tx_hash: String },

    #[error("Contract returned unknown state value {0}")]
    UnknownState(u8),

    #[error("No chain client registered for chain {0}")]
    UnsupportedChain(ChainId),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Machine-readable failure kind carried on an operation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Precondition,
    StateDrift,
    Chain,
    Database,
    Configuration,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AppError::Database(_) => FailureKind::Database,
            AppError::Config(_) => FailureKind::Configuration,
            AppError::NotFound(_) => FailureKind::NotFound,
            AppError::Precondition(_) => FailureKind::Precondition,
            AppError::StateDrift { .. } => FailureKind::StateDrift,
            AppError::Chain(_) => FailureKind::Chain,
            AppError::InvalidInput(_) | AppError::Internal(_) => FailureKind::Internal,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {:?}", error))
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        AppError::Internal(format!("Migration error: {:?}", error))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(error: config::ConfigError) -> Self {
        AppError::Config(error.to_string())
    }
}

/// Result type alias for the engine
pub type AppResult<T> = Result<T, AppError>;
