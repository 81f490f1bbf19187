use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use std::fmt;

/// EVM chain id as stored on the contest row
pub type ChainId = u64;

/// Off-chain contest status, a confirmation record of the contract's state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "contest_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestStatus {
    Open,
    Active,
    Locked,
    Settled,
    Cancelled,
    Closed,
}

impl ContestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContestStatus::Open => "OPEN",
            ContestStatus::Active => "ACTIVE",
            ContestStatus::Locked => "LOCKED",
            ContestStatus::Settled => "SETTLED",
            ContestStatus::Cancelled => "CANCELLED",
            ContestStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tournament status, owned by the ingestion pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "tournament_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    Upcoming,
    InProgress,
    Completed,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "UPCOMING",
            TournamentStatus::InProgress => "IN_PROGRESS",
            TournamentStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tournament entity (read-only here)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: String,
    pub status: TournamentStatus,
    pub current_round: Option<i32>,
}

/// Contract parameters fixed at deployment.
///
/// Only `payout_structure` is interpreted by the engine, everything else is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestSettings {
    #[serde(default)]
    pub oracle_fee_bps: u32,
    #[serde(default)]
    pub payment_token: Option<String>,
    #[serde(default)]
    pub expiry_timestamp: Option<i64>,
    /// Basis points paid to each finishing position, winner first
    #[serde(default = "ContestSettings::winner_takes_all")]
    pub payout_structure: Vec<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContestSettings {
    fn winner_takes_all() -> Vec<u32> {
        vec![BASIS_POINTS_TOTAL]
    }
}

impl Default for ContestSettings {
    fn default() -> Self {
        Self {
            oracle_fee_bps: 0,
            payment_token: None,
            expiry_timestamp: None,
            payout_structure: Self::winner_takes_all(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Payouts are expressed in basis points and must add up to exactly this
pub const BASIS_POINTS_TOTAL: u32 = 10_000;

/// A ranked entry as submitted on settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResult {
    pub entry_id: u64,
    pub entrant: String,
    pub score: i32,
    pub position: u32,
    pub payout_bps: u32,
}

/// Write-once settlement payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestResults {
    pub winning_entries: Vec<u64>,
    pub payout_bps: Vec<u32>,
    pub entries: Vec<EntryResult>,
    pub settled_at: DateTime<Utc>,
}

/// Entry score as recorded by the scoring pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStanding {
    pub entry_id: u64,
    pub entrant: String,
    pub score: i32,
}

/// Contest entity joined with its tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: String,
    pub address: String,
    pub chain_id: ChainId,
    pub status: ContestStatus,
    pub settings: ContestSettings,
    pub results: Option<ContestResults>,
    pub tournament: Tournament,
}

/// Fields written back after a confirmed transition
#[derive(Debug, Clone, PartialEq)]
pub struct ContestUpdate {
    pub status: ContestStatus,
    pub results: Option<ContestResults>,
}

/// Candidate query for one batch kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityFilter {
    pub statuses: Vec<ContestStatus>,
    pub chain_ids: Vec<ChainId>,
    pub tournament_statuses: Vec<TournamentStatus>,
    pub min_round: Option<i32>,
}

impl EligibilityFilter {
    pub fn matches(&self, contest: &Contest) -> bool {
        self.statuses.contains(&contest.status)
            && self.chain_ids.contains(&contest.chain_id)
            && self.tournament_statuses.contains(&contest.tournament.status)
            && match self.min_round {
                Some(min) => contest.tournament.current_round.is_some_and(|r| r >= min),
                None => true,
            }
    }
}
