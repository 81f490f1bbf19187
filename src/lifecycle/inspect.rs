use serde::Serialize;
use tracing::{info, warn};

use crate::{
    chain::{contract_state_to_status, ContestState},
    error::{AppError, AppResult},
    ledger::models::{ChainId, ContestStatus},
    lifecycle::{engine::LifecycleEngine, transition::parse_contract_address},
};

/// Read-only comparison of a contest's ledger record against its contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftReport {
    pub contest_id: String,
    pub chain_id: ChainId,
    pub address: String,
    pub ledger_status: ContestStatus,
    pub chain_state: ContestState,
    pub chain_status: ContestStatus,
    pub in_sync: bool,
    pub contract_oracle: String,
    /// `None` when no oracle is configured for the network
    pub oracle_matches: Option<bool>,
    pub accumulated_oracle_fee: String,
}

impl LifecycleEngine {
    /// Compare ledger and chain for one contest. Never writes either side.
    pub async fn inspect_contest(&self, contest_id: &str) -> AppResult<DriftReport> {
        let contest = self
            .ledger
            .find_contest(contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contest {}", contest_id)))?;

        let address = parse_contract_address(&contest.address)?;
        let client = self.chains.client(contest.chain_id)?;

        let chain_state = client.state(address).await?;
        let contract_oracle = client.oracle(address).await?;
        let fee = client.accumulated_oracle_fee(address).await?;

        let chain_status = contract_state_to_status(chain_state);
        let oracle_matches = self
            .verifier
            .expected_oracle(contest.chain_id)
            .map(|expected| expected == contract_oracle);

        let report = DriftReport {
            contest_id: contest.id.clone(),
            chain_id: contest.chain_id,
            address: contest.address.clone(),
            ledger_status: contest.status,
            chain_state,
            chain_status,
            in_sync: chain_status == contest.status,
            contract_oracle: contract_oracle.to_string(),
            oracle_matches,
            accumulated_oracle_fee: fee.to_string(),
        };

        if report.in_sync {
            info!("✓ Contest {} in sync at {}", contest_id, report.ledger_status);
        } else {
            warn!(
                "⚠️  Contest {} drifted: ledger={}, chain={}",
                contest_id, report.ledger_status, chain_state
            );
        }

        Ok(report)
    }
}
