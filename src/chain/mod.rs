// Contest contract access: per-network clients, state decoding and oracle checks
pub mod client;
pub mod evm;
pub mod oracle;
pub mod registry;
pub mod state;

pub use client::{ContestChain, ContractCall, SubmittedTx};
pub use oracle::OracleVerifier;
pub use registry::ChainRegistry;
pub use state::{contract_state_to_status, ContestState};
