use alloy::primitives::Address;
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument, warn};

use crate::{
    chain::{contract_state_to_status, ContestState, ContractCall},
    error::{AppError, AppResult, ChainError, PreconditionError},
    ledger::models::{
        ChainId, Contest, ContestResults, ContestStatus, ContestUpdate, TournamentStatus,
    },
    lifecycle::{engine::LifecycleEngine, payout, result::OperationResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Activate,
    Lock,
    Settle,
    ClaimFee,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Activate => "activate",
            TransitionKind::Lock => "lock",
            TransitionKind::Settle => "settle",
            TransitionKind::ClaimFee => "claim_fee",
        }
    }

    /// Parameters of the shared transition procedure. Empty slices accept anything.
    pub fn spec(&self) -> TransitionSpec {
        match self {
            TransitionKind::Activate => TransitionSpec {
                statuses: &[ContestStatus::Open],
                tournament: &[TournamentStatus::InProgress, TournamentStatus::Completed],
                pre_states: &[ContestState::Open],
                post_state: Some(ContestState::Active),
            },
            TransitionKind::Lock => TransitionSpec {
                statuses: &[ContestStatus::Active],
                tournament: &[],
                pre_states: &[ContestState::Active],
                post_state: Some(ContestState::Locked),
            },
            TransitionKind::Settle => TransitionSpec {
                statuses: &[ContestStatus::Active, ContestStatus::Locked],
                tournament: &[TournamentStatus::Completed],
                pre_states: &[ContestState::Active, ContestState::Locked],
                post_state: Some(ContestState::Settled),
            },
            TransitionKind::ClaimFee => TransitionSpec {
                statuses: &[],
                tournament: &[],
                pre_states: &[],
                post_state: None,
            },
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What one transition kind requires and produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionSpec {
    pub statuses: &'static [ContestStatus],
    pub tournament: &'static [TournamentStatus],
    pub pre_states: &'static [ContestState],
    /// Confirmed contract state to persist; `None` leaves the ledger untouched
    pub post_state: Option<ContestState>,
}

impl TransitionSpec {
    /// Off-chain preconditions, checked before anything touches the chain
    pub fn check_ledger(&self, contest: &Contest, supported: &[ChainId]) -> AppResult<()> {
        if !supported.contains(&contest.chain_id) {
            return Err(PreconditionError::UnsupportedNetwork(contest.chain_id).into());
        }

        if !self.statuses.is_empty() && !self.statuses.contains(&contest.status) {
            return Err(PreconditionError::StatusMismatch {
                current: contest.status,
                expected: join(self.statuses.iter().map(|s| s.as_str())),
            }
            .into());
        }

        if !self.tournament.is_empty() && !self.tournament.contains(&contest.tournament.status) {
            return Err(PreconditionError::TournamentNotEligible {
                current: contest.tournament.status,
                expected: join(self.tournament.iter().map(|s| s.as_str())),
            }
            .into());
        }

        Ok(())
    }

    pub fn accepts_chain_state(&self, state: ContestState) -> bool {
        self.pre_states.is_empty() || self.pre_states.contains(&state)
    }

    fn expected_chain_states(&self) -> String {
        join(self.pre_states.iter().map(|s| s.as_str()))
    }
}

fn join<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(" | ")
}

/// Contract call plus the ledger payload that goes with it
struct PreparedCall {
    call: ContractCall,
    results: Option<ContestResults>,
}

pub fn parse_contract_address(raw: &str) -> AppResult<Address> {
    Address::from_str(raw.trim())
        .map_err(|_| ChainError::InvalidAddress(raw.to_string()).into())
}

impl LifecycleEngine {
    /// Run one transition for one contest. Never fails: every error ends up on
    /// the returned result, along with the transaction hash if one was sent.
    #[instrument(skip(self, kind), fields(kind = %kind))]
    pub async fn run_transition(&self, kind: TransitionKind, contest_id: &str) -> OperationResult {
        let mut tx_hash = None;

        match self.attempt_transition(kind, contest_id, &mut tx_hash).await {
            Ok(hash) => {
                info!("✅ {} succeeded for contest {} (tx: {})", kind, contest_id, hash);
                OperationResult::succeeded(contest_id, hash)
            }
            Err(e) => {
                if matches!(e, AppError::StateDrift { .. }) {
                    warn!("⚠️  Contest {} has drifted from chain: {}", contest_id, e);
                } else {
                    warn!("❌ {} failed for contest {}: {}", kind, contest_id, e);
                }
                OperationResult::failed(contest_id, &e, tx_hash)
            }
        }
    }

    // DB check -> oracle check -> chain-state check -> write -> DB persist.
    // The order is fixed; nothing here runs concurrently.
    async fn attempt_transition(
        &self,
        kind: TransitionKind,
        contest_id: &str,
        tx_hash: &mut Option<String>,
    ) -> AppResult<String> {
        let spec = kind.spec();

        // 1. Load
        let contest = self
            .ledger
            .find_contest(contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contest {}", contest_id)))?;

        // 2. Off-chain preconditions
        spec.check_ledger(&contest, &self.supported_chains)?;
        let prepared = self.prepare_call(kind, &contest).await?;
        let address = parse_contract_address(&contest.address)?;

        // 3. Oracle
        if !self.verifier.verify(contest.chain_id, address).await? {
            return Err(PreconditionError::OracleMismatch {
                contest: contest.address.clone(),
                chain_id: contest.chain_id,
            }
            .into());
        }

        let client = self.chains.client(contest.chain_id)?;

        // 4. On-chain state, re-read right before writing
        let on_chain = client.state(address).await?;
        if !spec.accepts_chain_state(on_chain) {
            return Err(AppError::StateDrift {
                contest_id: contest.id.clone(),
                expected: spec.expected_chain_states(),
                actual: on_chain,
            });
        }

        if kind == TransitionKind::ClaimFee {
            let fee = client.accumulated_oracle_fee(address).await?;
            if fee.is_zero() {
                return Err(PreconditionError::ZeroOracleFee.into());
            }
            info!("💰 Contest {} has {} wei of oracle fees", contest_id, fee);
        }

        // 5. Write
        let submitted = client.submit(address, &prepared.call).await?;
        *tx_hash = Some(submitted.tx_hash.clone());

        if !submitted.confirmed {
            return Err(ChainError::Reverted {
                chain_id: contest.chain_id,
                tx_hash: submitted.tx_hash,
            }
            .into());
        }

        // 6. Persist what the chain confirms, not what we expect
        if let Some(expected) = spec.post_state {
            let confirmed = client.state(address).await?;
            if confirmed != expected {
                return Err(AppError::StateDrift {
                    contest_id: contest.id.clone(),
                    expected: expected.as_str().to_string(),
                    actual: confirmed,
                });
            }

            let update = ContestUpdate {
                status: contract_state_to_status(confirmed),
                results: prepared.results,
            };
            self.ledger.record_transition(&contest.id, &update).await?;
        }

        Ok(submitted.tx_hash)
    }

    async fn prepare_call(&self, kind: TransitionKind, contest: &Contest) -> AppResult<PreparedCall> {
        let prepared = match kind {
            TransitionKind::Activate => PreparedCall {
                call: ContractCall::Activate,
                results: None,
            },
            TransitionKind::Lock => PreparedCall {
                call: ContractCall::Lock,
                results: None,
            },
            TransitionKind::Settle => {
                let standings = self.ledger.contest_standings(&contest.id).await?;
                let results = payout::compute_results(
                    &standings,
                    &contest.settings.payout_structure,
                    Utc::now(),
                )?;

                PreparedCall {
                    call: ContractCall::Settle {
                        winning_entries: results.winning_entries.clone(),
                        payout_bps: results.payout_bps.clone(),
                    },
                    results: Some(results),
                }
            }
            TransitionKind::ClaimFee => PreparedCall {
                call: ContractCall::ClaimOracleFee,
                results: None,
            },
        };

        Ok(prepared)
    }
}
