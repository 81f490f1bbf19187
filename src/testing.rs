// Test doubles: a scripted contest contract and an in-memory ledger
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::{
    chain::{ChainRegistry, ContestChain, ContestState, ContractCall, OracleVerifier, SubmittedTx},
    config::BatchConfig,
    error::{AppError, AppResult, ChainError},
    ledger::{
        models::*,
        repository::ContestLedger,
    },
    lifecycle::LifecycleEngine,
};

pub const BASE: ChainId = 8453;
pub const ORACLE: Address = Address::new([0xaa; 20]);

pub fn address(n: u8) -> Address {
    Address::with_last_byte(n)
}

pub fn standing(entry_id: u64, score: i32) -> EntryStanding {
    EntryStanding {
        entry_id,
        entrant: format!("0x{:040x}", entry_id),
        score,
    }
}

// ========== FAKE CHAIN ==========

#[derive(Default)]
struct FakeContracts {
    states: HashMap<Address, ContestState>,
    oracles: HashMap<Address, Address>,
    fees: HashMap<Address, U256>,
    stuck: HashMap<Address, ContestState>,
    failing: HashSet<Address>,
    reverting: HashSet<Address>,
    writes: Vec<(Address, ContractCall, Instant)>,
    reads: usize,
    latency: Option<Duration>,
}

pub struct FakeChain {
    chain_id: ChainId,
    signer: Option<Address>,
    contracts: Mutex<FakeContracts>,
}

impl FakeChain {
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            signer: Some(ORACLE),
            contracts: Mutex::new(FakeContracts::default()),
        }
    }

    pub fn without_signer(mut self) -> Self {
        self.signer = None;
        self
    }

    pub fn with_contest(self, contest: Address, state: ContestState) -> Self {
        self.set_state(contest, state);
        self
    }

    pub fn with_contract_oracle(self, contest: Address, oracle: Address) -> Self {
        self.set_contract_oracle(contest, oracle);
        self
    }

    pub fn set_state(&self, contest: Address, state: ContestState) {
        self.contracts.lock().states.insert(contest, state);
    }

    pub fn set_contract_oracle(&self, contest: Address, oracle: Address) {
        self.contracts.lock().oracles.insert(contest, oracle);
    }

    pub fn set_fee(&self, contest: Address, wei: u64) {
        self.contracts.lock().fees.insert(contest, U256::from(wei));
    }

    /// Transactions to `contest` are mined but leave it in `state`
    pub fn stick_after_submit(&self, contest: Address, state: ContestState) {
        self.contracts.lock().stuck.insert(contest, state);
    }

    /// Submissions to `contest` fail at the RPC layer
    pub fn fail_submits(&self, contest: Address) {
        self.contracts.lock().failing.insert(contest);
    }

    /// Submissions to `contest` are mined with a failed receipt
    pub fn revert_writes(&self, contest: Address) {
        self.contracts.lock().reverting.insert(contest);
    }

    /// Every submission waits this long for its receipt
    pub fn set_submit_latency(&self, latency: Duration) {
        self.contracts.lock().latency = Some(latency);
    }

    pub fn clear_failures(&self) {
        let mut contracts = self.contracts.lock();
        contracts.failing.clear();
        contracts.reverting.clear();
    }

    pub fn writes(&self) -> Vec<(Address, ContractCall)> {
        self.contracts
            .lock()
            .writes
            .iter()
            .map(|(address, call, _)| (*address, call.clone()))
            .collect()
    }

    pub fn write_times(&self) -> Vec<Instant> {
        self.contracts.lock().writes.iter().map(|(_, _, at)| *at).collect()
    }

    pub fn read_count(&self) -> usize {
        self.contracts.lock().reads
    }
}

#[async_trait]
impl ContestChain for FakeChain {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn signer(&self) -> Option<Address> {
        self.signer
    }

    async fn oracle(&self, contest: Address) -> AppResult<Address> {
        let mut contracts = self.contracts.lock();
        contracts.reads += 1;
        Ok(contracts.oracles.get(&contest).copied().unwrap_or(ORACLE))
    }

    async fn state(&self, contest: Address) -> AppResult<ContestState> {
        let mut contracts = self.contracts.lock();
        contracts.reads += 1;
        contracts.states.get(&contest).copied().ok_or_else(|| {
            ChainError::Rpc {
                chain_id: self.chain_id,
                message: format!("execution reverted: no contract at {}", contest),
            }
            .into()
        })
    }

    async fn accumulated_oracle_fee(&self, contest: Address) -> AppResult<U256> {
        let mut contracts = self.contracts.lock();
        contracts.reads += 1;
        Ok(contracts.fees.get(&contest).copied().unwrap_or(U256::ZERO))
    }

    async fn submit(&self, contest: Address, call: &ContractCall) -> AppResult<SubmittedTx> {
        if self.signer.is_none() {
            return Err(AppError::Config("no signer".to_string()));
        }

        let sent_at = Instant::now();
        let latency = self.contracts.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut contracts = self.contracts.lock();
        if contracts.failing.contains(&contest) {
            return Err(ChainError::Rpc {
                chain_id: self.chain_id,
                message: "nonce too low".to_string(),
            }
            .into());
        }

        contracts.writes.push((contest, call.clone(), sent_at));
        let tx_hash = format!("0x{:064x}", contracts.writes.len());

        if contracts.reverting.contains(&contest) {
            return Ok(SubmittedTx {
                tx_hash,
                confirmed: false,
            });
        }

        let next = match call {
            ContractCall::Activate => Some(ContestState::Active),
            ContractCall::Lock => Some(ContestState::Locked),
            ContractCall::Settle { .. } => Some(ContestState::Settled),
            ContractCall::ClaimOracleFee => {
                contracts.fees.insert(contest, U256::ZERO);
                None
            }
        };

        let next = contracts.stuck.get(&contest).copied().or(next);
        if let Some(state) = next {
            contracts.states.insert(contest, state);
        }

        Ok(SubmittedTx {
            tx_hash,
            confirmed: true,
        })
    }
}

// ========== IN-MEMORY LEDGER ==========

#[derive(Default)]
pub struct InMemoryLedger {
    contests: RwLock<BTreeMap<String, Contest>>,
    standings: RwLock<HashMap<String, Vec<EntryStanding>>>,
    writes: Mutex<usize>,
    fail_writes: Mutex<bool>,
}

impl InMemoryLedger {
    pub fn insert(&self, contest: Contest) {
        self.contests.write().insert(contest.id.clone(), contest);
    }

    pub fn contest(&self, id: &str) -> Option<Contest> {
        self.contests.read().get(id).cloned()
    }

    pub fn status_of(&self, id: &str) -> Option<ContestStatus> {
        self.contest(id).map(|c| c.status)
    }

    pub fn set_chain_id(&self, id: &str, chain_id: ChainId) {
        if let Some(contest) = self.contests.write().get_mut(id) {
            contest.chain_id = chain_id;
        }
    }

    pub fn set_standings(&self, id: &str, standings: Vec<EntryStanding>) {
        self.standings.write().insert(id.to_string(), standings);
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock() = true;
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }
}

#[async_trait]
impl ContestLedger for InMemoryLedger {
    async fn find_contest(&self, contest_id: &str) -> AppResult<Option<Contest>> {
        Ok(self.contest(contest_id))
    }

    async fn find_eligible_contests(&self, filter: &EligibilityFilter) -> AppResult<Vec<Contest>> {
        Ok(self
            .contests
            .read()
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn record_transition(&self, contest_id: &str, update: &ContestUpdate) -> AppResult<()> {
        if *self.fail_writes.lock() {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut contests = self.contests.write();
        let contest = contests
            .get_mut(contest_id)
            .ok_or_else(|| AppError::NotFound(format!("Contest {}", contest_id)))?;

        if update.results.is_some() && contest.results.is_some() {
            return Err(AppError::Internal(format!(
                "Contest {} results already recorded",
                contest_id
            )));
        }

        contest.status = update.status;
        if let Some(results) = &update.results {
            contest.results = Some(results.clone());
        }
        *self.writes.lock() += 1;
        Ok(())
    }

    async fn contest_standings(&self, contest_id: &str) -> AppResult<Vec<EntryStanding>> {
        Ok(self
            .standings
            .read()
            .get(contest_id)
            .cloned()
            .unwrap_or_default())
    }
}

// ========== HARNESS ==========

/// Engine wired to a fake Base chain and an in-memory ledger
pub struct Harness {
    pub engine: Arc<LifecycleEngine>,
    pub ledger: Arc<InMemoryLedger>,
    pub chain: Arc<FakeChain>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_chain(FakeChain::new(BASE))
    }

    pub fn with_chain(chain: FakeChain) -> Self {
        Self::build(chain, BatchConfig::default(), Some(ORACLE))
    }

    pub fn with_batch(batch: BatchConfig) -> Self {
        Self::build(FakeChain::new(BASE), batch, Some(ORACLE))
    }

    pub fn build(chain: FakeChain, batch: BatchConfig, oracle: Option<Address>) -> Self {
        let chain = Arc::new(chain);
        let ledger = Arc::new(InMemoryLedger::default());

        let mut registry = ChainRegistry::new();
        registry.register(chain.clone());
        let registry = Arc::new(registry);

        let expected = oracle.into_iter().map(|a| (chain.chain_id(), a)).collect();
        let verifier = OracleVerifier::new(registry.clone(), expected);

        let engine = LifecycleEngine::new(
            ledger.clone(),
            registry,
            verifier,
            vec![chain.chain_id()],
            &batch,
        );

        Self {
            engine: Arc::new(engine),
            ledger,
            chain,
        }
    }

    /// Ledger row plus a contract already in the matching state
    pub fn add_contest(
        &self,
        id: &str,
        address_byte: u8,
        status: ContestStatus,
        tournament: TournamentStatus,
        current_round: Option<i32>,
    ) {
        self.insert(id, address_byte, status, tournament, current_round, ContestSettings::default());
    }

    pub fn add_contest_with_payouts(
        &self,
        id: &str,
        address_byte: u8,
        status: ContestStatus,
        tournament: TournamentStatus,
        payout_structure: Vec<u32>,
    ) {
        let settings = ContestSettings {
            payout_structure,
            ..ContestSettings::default()
        };
        self.insert(id, address_byte, status, tournament, Some(4), settings);
    }

    fn insert(
        &self,
        id: &str,
        address_byte: u8,
        status: ContestStatus,
        tournament: TournamentStatus,
        current_round: Option<i32>,
        settings: ContestSettings,
    ) {
        let contract = address(address_byte);
        self.ledger.insert(Contest {
            id: id.to_string(),
            address: contract.to_string(),
            chain_id: self.chain.chain_id(),
            status,
            settings,
            results: None,
            tournament: Tournament {
                id: format!("t-{}", id),
                status: tournament,
                current_round,
            },
        });
        self.chain.set_state(contract, chain_state_for(status));
    }
}

fn chain_state_for(status: ContestStatus) -> ContestState {
    match status {
        ContestStatus::Open => ContestState::Open,
        ContestStatus::Active => ContestState::Active,
        ContestStatus::Locked => ContestState::Locked,
        ContestStatus::Settled => ContestState::Settled,
        ContestStatus::Cancelled => ContestState::Cancelled,
        ContestStatus::Closed => ContestState::Closed,
    }
}
