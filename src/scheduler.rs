// Contest Scheduler - periodic trigger for the batch entry points
//
// Every tick runs activate -> lock -> settle, one batch after another, so two
// invocations of the same batch never overlap. Each batch re-discovers its
// candidates from the ledger, which makes a tick safe to repeat. Shutdown is
// only observed between cycles, so a confirmed transaction is always persisted.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

use crate::error::AppResult;
use crate::lifecycle::{BatchOperationResult, LifecycleEngine, TransitionKind};

pub struct ContestScheduler {
    engine: Arc<LifecycleEngine>,
    period: Duration,
}

impl ContestScheduler {
    pub fn new(engine: Arc<LifecycleEngine>, period: Duration) -> Self {
        Self { engine, period }
    }

    /// Start the scheduler (runs in background) until `shutdown` flips or its
    /// sender is dropped
    pub fn start(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let period = self.period;

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!("⏰ Contest scheduler running every {}s", period.as_secs());

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.changed() => break,
                    _ = ticker.tick() => {
                        Self::run_cycle(&engine).await;
                    }
                }
            }

            info!("🛑 Contest scheduler stopped");
        })
    }

    /// One pass over all three batch kinds
    pub async fn run_cycle(
        engine: &LifecycleEngine,
    ) -> Vec<(TransitionKind, AppResult<BatchOperationResult>)> {
        info!("🔄 Starting contest lifecycle cycle");

        let mut outcomes = Vec::with_capacity(3);

        for kind in [
            TransitionKind::Activate,
            TransitionKind::Lock,
            TransitionKind::Settle,
        ] {
            let outcome = match kind {
                TransitionKind::Activate => engine.batch_activate_contests().await,
                TransitionKind::Lock => engine.batch_lock_contests().await,
                _ => engine.batch_settle_contests().await,
            };

            if let Err(e) = &outcome {
                error!("❌ {} batch aborted: {}", kind, e);
            }
            outcomes.push((kind, outcome));
        }

        info!("✓ Contest lifecycle cycle completed");
        outcomes
    }
}
