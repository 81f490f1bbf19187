use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    chain::{
        client::{ContestChain, ContractCall, SubmittedTx},
        state::ContestState,
    },
    config::NetworkConfig,
    error::{AppError, AppResult, ChainError},
    ledger::models::ChainId,
};

sol! {
    #[sol(rpc)]
    interface IContest {
        function oracle() external view returns (address);
        function state() external view returns (uint8);
        function accumulatedOracleFee() external view returns (uint256);
        function activateContest() external;
        function lockContest() external;
        function settleContest(uint256[] calldata winningEntries, uint256[] calldata payoutBps) external;
        function claimOracleFee() external;
    }
}

/// Contest contract client over an alloy provider.
///
/// With a signer the provider is wallet-filled, so nonce, gas and chain id are
/// filled per transaction.
pub struct EvmContestClient<P> {
    network: NetworkConfig,
    provider: P,
    signer: Option<Address>,
}

/// Connect to `network`, signing with `signer_key` when one is configured
pub fn connect(network: &NetworkConfig, signer_key: Option<&str>) -> AppResult<Arc<dyn ContestChain>> {
    let url = network.rpc_url.parse().map_err(|e| {
        AppError::Config(format!(
            "Invalid RPC URL for chain {}: {:?}",
            network.chain_id, e
        ))
    })?;

    match signer_key {
        Some(key) => {
            let signer = PrivateKeySigner::from_str(key.trim()).map_err(|e| {
                AppError::Config(format!("Invalid oracle signing key: {}", e))
            })?;
            let address = signer.address();
            let provider = ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(url);

            info!(
                "✅ {} client connected (chain {}) signing as {}",
                network.name, network.chain_id, address
            );

            Ok(Arc::new(EvmContestClient {
                network: network.clone(),
                provider,
                signer: Some(address),
            }))
        }
        None => {
            let provider = ProviderBuilder::new().connect_http(url);

            info!(
                "⚠️  {} client connected (chain {}) without a signer - read only",
                network.name, network.chain_id
            );

            Ok(Arc::new(EvmContestClient {
                network: network.clone(),
                provider,
                signer: None,
            }))
        }
    }
}

impl<P> EvmContestClient<P> {
    fn rpc_error(&self, error: impl std::fmt::Display) -> AppError {
        ChainError::Rpc {
            chain_id: self.network.chain_id,
            message: error.to_string(),
        }
        .into()
    }
}

#[async_trait]
impl<P> ContestChain for EvmContestClient<P>
where
    P: Provider + Clone + 'static,
{
    fn chain_id(&self) -> ChainId {
        self.network.chain_id
    }

    fn signer(&self) -> Option<Address> {
        self.signer
    }

    async fn oracle(&self, contest: Address) -> AppResult<Address> {
        let instance = IContest::new(contest, self.provider.clone());
        let oracle = instance
            .oracle()
            .call()
            .await
            .map_err(|e| self.rpc_error(e))?;

        Ok(oracle)
    }

    async fn state(&self, contest: Address) -> AppResult<ContestState> {
        let instance = IContest::new(contest, self.provider.clone());
        let raw = instance
            .state()
            .call()
            .await
            .map_err(|e| self.rpc_error(e))?;

        Ok(ContestState::try_from(raw)?)
    }

    async fn accumulated_oracle_fee(&self, contest: Address) -> AppResult<U256> {
        let instance = IContest::new(contest, self.provider.clone());
        let fee = instance
            .accumulatedOracleFee()
            .call()
            .await
            .map_err(|e| self.rpc_error(e))?;

        Ok(fee)
    }

    #[instrument(skip(self, call), fields(chain_id = self.network.chain_id, method = call.method()))]
    async fn submit(&self, contest: Address, call: &ContractCall) -> AppResult<SubmittedTx> {
        if self.signer.is_none() {
            return Err(AppError::Config(format!(
                "No signing key configured for chain {}",
                self.network.chain_id
            )));
        }

        let instance = IContest::new(contest, self.provider.clone());

        let pending = match call {
            ContractCall::Activate => instance.activateContest().send().await,
            ContractCall::Lock => instance.lockContest().send().await,
            ContractCall::Settle {
                winning_entries,
                payout_bps,
            } => {
                let entries = winning_entries.iter().map(|id| U256::from(*id)).collect();
                let bps = payout_bps.iter().map(|bps| U256::from(*bps)).collect();
                instance.settleContest(entries, bps).send().await
            }
            ContractCall::ClaimOracleFee => instance.claimOracleFee().send().await,
        }
        .map_err(|e| self.rpc_error(e))?;

        let tx_hash = pending.tx_hash().to_string();
        info!("📤 {} submitted to {} (tx: {})", call.method(), contest, tx_hash);

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| self.rpc_error(format!("{} (tx: {})", e, tx_hash)))?;

        Ok(SubmittedTx {
            tx_hash,
            confirmed: receipt.status(),
        })
    }
}

/// Check that the RPC endpoint serves the chain the network is configured for
pub async fn verify_endpoint(network: &NetworkConfig) -> AppResult<()> {
    let url = network.rpc_url.parse().map_err(|e| {
        AppError::Config(format!(
            "Invalid RPC URL for chain {}: {:?}",
            network.chain_id, e
        ))
    })?;
    let provider = ProviderBuilder::new().connect_http(url);

    let reported = provider.get_chain_id().await.map_err(|e| ChainError::Rpc {
        chain_id: network.chain_id,
        message: e.to_string(),
    })?;

    if reported != network.chain_id {
        return Err(AppError::Config(format!(
            "RPC endpoint for {} reports chain {}, expected {}",
            network.name, reported, network.chain_id
        )));
    }

    Ok(())
}
