use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::chain::client::ContestChain;
use crate::error::{AppResult, ChainError};
use crate::ledger::models::ChainId;

/// ChainRegistry - routes contract calls to the client for a contest's network
///
/// Built once at startup and injected into the engine; there is no global client.
pub struct ChainRegistry {
    clients: HashMap<ChainId, Arc<dyn ContestChain>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Register the client for a chain. Only call during initialization.
    pub fn register(&mut self, client: Arc<dyn ContestChain>) {
        info!("Registering contest client for chain: {}", client.chain_id());
        self.clients.insert(client.chain_id(), client);
    }

    pub fn client(&self, chain_id: ChainId) -> AppResult<&Arc<dyn ContestChain>> {
        self.clients
            .get(&chain_id)
            .ok_or_else(|| ChainError::UnsupportedChain(chain_id).into())
    }

    /// Get all registered chains, sorted
    pub fn registered_chains(&self) -> Vec<ChainId> {
        let mut chains: Vec<ChainId> = self.clients.keys().copied().collect();
        chains.sort_unstable();
        chains
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::testing::FakeChain;

    #[test]
    fn test_registry_routes_by_chain_id() {
        let mut registry = ChainRegistry::new();
        registry.register(Arc::new(FakeChain::new(84532)));
        registry.register(Arc::new(FakeChain::new(8453)));

        assert_eq!(registry.registered_chains(), vec![8453, 84532]);
        assert_eq!(registry.client(84532).unwrap().chain_id(), 84532);
        assert!(matches!(
            registry.client(1),
            Err(AppError::Chain(ChainError::UnsupportedChain(1)))
        ));
    }
}
