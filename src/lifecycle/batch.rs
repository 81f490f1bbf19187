use futures::future::join_all;
use tracing::{info, instrument, warn};

use crate::{
    error::{AppError, AppResult},
    ledger::models::{ContestStatus, EligibilityFilter, TournamentStatus},
    lifecycle::{
        engine::{BatchPolicy, LifecycleEngine},
        result::{BatchOperationResult, OperationResult},
        transition::TransitionKind,
    },
};

impl LifecycleEngine {
    // ========== SCHEDULER ENTRY POINTS ==========

    /// Activate every OPEN contest whose tournament is in progress
    pub async fn batch_activate_contests(&self) -> AppResult<BatchOperationResult> {
        self.run_batch(TransitionKind::Activate).await
    }

    /// Lock every ACTIVE contest whose tournament reached the lock round
    pub async fn batch_lock_contests(&self) -> AppResult<BatchOperationResult> {
        self.run_batch(TransitionKind::Lock).await
    }

    /// Settle every ACTIVE or LOCKED contest whose tournament is complete
    pub async fn batch_settle_contests(&self) -> AppResult<BatchOperationResult> {
        self.run_batch(TransitionKind::Settle).await
    }

    /// Candidate query for a batch kind
    pub fn eligibility(&self, kind: TransitionKind) -> AppResult<EligibilityFilter> {
        let chain_ids = self.supported_chains.clone();

        let filter = match kind {
            TransitionKind::Activate => EligibilityFilter {
                statuses: vec![ContestStatus::Open],
                chain_ids,
                tournament_statuses: vec![TournamentStatus::InProgress],
                min_round: None,
            },
            TransitionKind::Lock => EligibilityFilter {
                statuses: vec![ContestStatus::Active],
                chain_ids,
                tournament_statuses: vec![TournamentStatus::InProgress],
                min_round: Some(self.lock_round),
            },
            TransitionKind::Settle => EligibilityFilter {
                statuses: vec![ContestStatus::Active, ContestStatus::Locked],
                chain_ids,
                tournament_statuses: vec![TournamentStatus::Completed],
                min_round: None,
            },
            TransitionKind::ClaimFee => {
                return Err(AppError::InvalidInput(
                    "Oracle fee claims are not batched".to_string(),
                ))
            }
        };

        Ok(filter)
    }

    fn policy(&self, kind: TransitionKind) -> BatchPolicy {
        match kind {
            TransitionKind::Lock => self.policies.lock,
            TransitionKind::Settle => self.policies.settle,
            _ => self.policies.activate,
        }
    }

    /// Discover eligible contests and drive one transition across them.
    ///
    /// Only configuration problems (and a failed candidate query) abort the
    /// batch. Per-contest failures land in the summary.
    #[instrument(skip_all, fields(kind = %kind))]
    async fn run_batch(&self, kind: TransitionKind) -> AppResult<BatchOperationResult> {
        self.verifier.check_networks(&self.supported_chains)?;

        let filter = self.eligibility(kind)?;
        let candidates = self.ledger.find_eligible_contests(&filter).await?;

        if candidates.is_empty() {
            info!("✓ No contests eligible for {}", kind);
            return Ok(BatchOperationResult::empty());
        }

        info!("📊 Found {} contests eligible for {}", candidates.len(), kind);

        let results = match self.policy(kind) {
            BatchPolicy::Concurrent => {
                join_all(
                    candidates
                        .iter()
                        .map(|contest| self.run_transition(kind, &contest.id)),
                )
                .await
            }
            BatchPolicy::Sequential { delay } => {
                let mut results: Vec<OperationResult> = Vec::with_capacity(candidates.len());
                for contest in &candidates {
                    let result = self.run_transition(kind, &contest.id).await;
                    let pause = result.success;
                    results.push(result);

                    if pause {
                        tokio::time::sleep(delay).await;
                    }
                }
                results
            }
        };

        let summary = BatchOperationResult::from_results(results);

        if summary.failed > 0 {
            warn!(
                "⚠️  {} batch finished: {}/{} succeeded, {} failed",
                kind, summary.succeeded, summary.total, summary.failed
            );
        } else {
            info!(
                "✓ {} batch finished: {}/{} succeeded",
                kind, summary.succeeded, summary.total
            );
        }

        Ok(summary)
    }
}
