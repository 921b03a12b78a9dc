// All service modules
pub mod error_classifier;
pub mod gateway;
pub mod normalizer;
pub mod onchain;
pub mod ranking;

#[cfg(test)]
pub(crate) mod mock_chain;

// Re-export for convenience
pub use error_classifier::BossFault;
pub use gateway::ChainGateway;
pub use onchain::{BossChain, EthersChain, LocalKeyConnector, WalletConnector};
pub use ranking::RankingAggregator;
