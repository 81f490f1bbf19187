use std::sync::Arc;
use std::time::Duration;

use crate::{
    chain::{ChainRegistry, OracleVerifier},
    config::BatchConfig,
    ledger::{models::ChainId, ContestLedger},
    lifecycle::{result::OperationResult, transition::TransitionKind},
};

/// How a batch drives its candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// All candidates at once. Each contest is its own contract instance.
    Concurrent,
    /// One at a time, pausing after every successful transaction so a single
    /// signer never races its own nonce.
    Sequential { delay: Duration },
}

/// Per-kind batch policies. Lock stays serialized and throttled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicies {
    pub activate: BatchPolicy,
    pub lock: BatchPolicy,
    pub settle: BatchPolicy,
}

impl BatchPolicies {
    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            activate: BatchPolicy::Concurrent,
            lock: BatchPolicy::Sequential {
                delay: config.lock_delay(),
            },
            settle: BatchPolicy::Concurrent,
        }
    }
}

/// Contest lifecycle engine - owns the transition procedure and the batch
/// entry points. Every collaborator is injected.
pub struct LifecycleEngine {
    pub(crate) ledger: Arc<dyn ContestLedger>,
    pub(crate) chains: Arc<ChainRegistry>,
    pub(crate) verifier: OracleVerifier,
    pub(crate) supported_chains: Vec<ChainId>,
    pub(crate) policies: BatchPolicies,
    pub(crate) lock_round: i32,
}

impl LifecycleEngine {
    pub fn new(
        ledger: Arc<dyn ContestLedger>,
        chains: Arc<ChainRegistry>,
        verifier: OracleVerifier,
        supported_chains: Vec<ChainId>,
        batch: &BatchConfig,
    ) -> Self {
        Self {
            ledger,
            chains,
            verifier,
            supported_chains,
            policies: BatchPolicies::from_config(batch),
            lock_round: batch.lock_round,
        }
    }

    // ========== SINGLE-CONTEST OPERATIONS ==========

    /// OPEN -> ACTIVE once the tournament has started
    pub async fn activate_contest(&self, contest_id: &str) -> OperationResult {
        self.run_transition(TransitionKind::Activate, contest_id).await
    }

    /// ACTIVE -> LOCKED
    pub async fn lock_contest(&self, contest_id: &str) -> OperationResult {
        self.run_transition(TransitionKind::Lock, contest_id).await
    }

    /// ACTIVE | LOCKED -> SETTLED once the tournament is complete
    pub async fn settle_contest(&self, contest_id: &str) -> OperationResult {
        self.run_transition(TransitionKind::Settle, contest_id).await
    }

    /// Collect the oracle's accumulated fee. On demand only, never batched.
    pub async fn claim_oracle_fee(&self, contest_id: &str) -> OperationResult {
        self.run_transition(TransitionKind::ClaimFee, contest_id).await
    }
}
