use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::chain::state::ContestState;
use crate::error::AppResult;
use crate::ledger::models::ChainId;

/// State-mutating calls the oracle may submit to a contest contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    Activate,
    Lock,
    Settle {
        winning_entries: Vec<u64>,
        payout_bps: Vec<u32>,
    },
    ClaimOracleFee,
}

impl ContractCall {
    pub fn method(&self) -> &'static str {
        match self {
            ContractCall::Activate => "activateContest",
            ContractCall::Lock => "lockContest",
            ContractCall::Settle { .. } => "settleContest",
            ContractCall::ClaimOracleFee => "claimOracleFee",
        }
    }
}

/// A mined transaction. `confirmed` is the receipt status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTx {
    pub tx_hash: String,
    pub confirmed: bool,
}

/// Chain client trait - one per network, wrapping one signing identity
///
/// INVARIANTS:
/// - `submit` returns only once the transaction is mined
/// - a client built without a signing key reports `signer() == None`
///   and must refuse to submit
#[async_trait]
pub trait ContestChain: Send + Sync {
    /// Chain id this client is connected to
    fn chain_id(&self) -> ChainId;

    /// Address of the configured signing identity
    fn signer(&self) -> Option<Address>;

    async fn oracle(&self, contest: Address) -> AppResult<Address>;

    async fn state(&self, contest: Address) -> AppResult<ContestState>;

    async fn accumulated_oracle_fee(&self, contest: Address) -> AppResult<U256>;

    async fn submit(&self, contest: Address, call: &ContractCall) -> AppResult<SubmittedTx>;
}
