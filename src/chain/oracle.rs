use alloy::primitives::Address;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::chain::client::ContestChain;
use crate::chain::registry::ChainRegistry;
use crate::error::{AppError, AppResult};
use crate::ledger::models::ChainId;

/// Confirms the engine's signer is the oracle a contest contract trusts.
///
/// A mismatch is an expected outcome and comes back as `Ok(false)`. Only a
/// missing oracle address or signing key is an error.
pub struct OracleVerifier {
    chains: Arc<ChainRegistry>,
    expected: HashMap<ChainId, Address>,
}

impl OracleVerifier {
    pub fn new(chains: Arc<ChainRegistry>, expected: HashMap<ChainId, Address>) -> Self {
        Self { chains, expected }
    }

    /// Oracle address configured for a network, independent of any signer
    pub fn expected_oracle(&self, chain_id: ChainId) -> Option<Address> {
        self.expected.get(&chain_id).copied()
    }

    /// Expected oracle and signing client for a network
    pub fn configured(&self, chain_id: ChainId) -> AppResult<(Address, &Arc<dyn ContestChain>)> {
        let expected = self.expected_oracle(chain_id).ok_or_else(|| {
            AppError::Config(format!("No oracle address configured for chain {}", chain_id))
        })?;

        let client = self.chains.client(chain_id).map_err(|_| {
            AppError::Config(format!("No RPC client configured for chain {}", chain_id))
        })?;

        if client.signer().is_none() {
            return Err(AppError::Config(format!(
                "No oracle signing key configured for chain {}",
                chain_id
            )));
        }

        Ok((expected, client))
    }

    /// Fail fast when any of `chain_ids` lacks oracle configuration
    pub fn check_networks(&self, chain_ids: &[ChainId]) -> AppResult<()> {
        for chain_id in chain_ids {
            self.configured(*chain_id)?;
        }
        Ok(())
    }

    /// Compare the contract's recorded oracle against the configured identity
    pub async fn verify(&self, chain_id: ChainId, contest: Address) -> AppResult<bool> {
        let (expected, client) = self.configured(chain_id)?;
        let contract_oracle = client.oracle(contest).await?;

        // Address equality is byte-wise, so checksum casing never matters here
        if contract_oracle != expected {
            warn!(
                "🔒 Oracle mismatch on {} (chain {}): contract={}, configured={}",
                contest, chain_id, contract_oracle, expected
            );
            return Ok(false);
        }

        if client.signer() != Some(expected) {
            warn!(
                "🔒 Signer for chain {} is not the configured oracle {}",
                chain_id, expected
            );
            return Ok(false);
        }

        Ok(true)
    }
}
