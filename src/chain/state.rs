use serde::Serialize;
use std::fmt;

use crate::error::ChainError;
use crate::ledger::models::ContestStatus;

/// Lifecycle enum as stored by the contest contract.
///
/// OPEN -> ACTIVE -> LOCKED -> SETTLED on the happy path; OPEN -> CANCELLED and
/// any non-terminal state -> CLOSED are the exceptional exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestState {
    Open = 0,
    Active = 1,
    Locked = 2,
    Settled = 3,
    Cancelled = 4,
    Closed = 5,
}

impl ContestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContestState::Open => "OPEN",
            ContestState::Active => "ACTIVE",
            ContestState::Locked => "LOCKED",
            ContestState::Settled => "SETTLED",
            ContestState::Cancelled => "CANCELLED",
            ContestState::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for ContestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.as_str(), *self as u8)
    }
}

impl TryFrom<u8> for ContestState {
    type Error = ChainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ContestState::Open),
            1 => Ok(ContestState::Active),
            2 => Ok(ContestState::Locked),
            3 => Ok(ContestState::Settled),
            4 => Ok(ContestState::Cancelled),
            5 => Ok(ContestState::Closed),
            other => Err(ChainError::UnknownState(other)),
        }
    }
}

/// Ledger status written after the contract has confirmed `state`
pub fn contract_state_to_status(state: ContestState) -> ContestStatus {
    match state {
        ContestState::Open => ContestStatus::Open,
        ContestState::Active => ContestStatus::Active,
        ContestState::Locked => ContestStatus::Locked,
        ContestState::Settled => ContestStatus::Settled,
        ContestState::Cancelled => ContestStatus::Cancelled,
        ContestState::Closed => ContestStatus::Closed,
    }
}
