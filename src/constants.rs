/// Application constants

// Networks
pub const PRODUCTION_NETWORK_NAME: &str = "Monad Testnet";
pub const PRODUCTION_RPC_URL: &str = "https://testnet-rpc.monad.xyz";
pub const LOCAL_RPC_URL: &str = "http://localhost:8545";

// Deployment files, searched in this order
pub const PRODUCTION_DEPLOYMENT_FILE: &str = "monad-contract-addresses.json";
pub const LOCAL_DEPLOYMENT_FILE: &str = "local-contract-addresses.json";

// Leaderboard
pub const LEADERBOARD_SIZE: usize = 3;
pub const DEFAULT_RANKING_FETCH_CONCURRENCY: usize = 1;

// Fight records
pub const DEFAULT_LATEST_RECORDS_LIMIT: u64 = 10;

// Rarity thresholds (boss level)
pub const EPIC_MIN_LEVEL: u64 = 3;
pub const RARE_MIN_LEVEL: u64 = 2;

// Theme keywords, matched against boss names
pub const FIRE_KEYWORDS: &[&str] = &["烈焰", "火", "flame", "fire"];
pub const ICE_KEYWORDS: &[&str] = &["冰霜", "冰", "frost", "glacier"];
pub const SHADOW_KEYWORDS: &[&str] = &["暗影", "暗", "shadow"];

// Session storage keys
pub const SESSION_WALLET_ADDRESS_KEY: &str = "walletAddress";
pub const SESSION_NETWORK_KEY: &str = "currentNetwork";
