use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_LATEST_RECORDS_LIMIT, DEFAULT_RANKING_FETCH_CONCURRENCY, LOCAL_DEPLOYMENT_FILE,
    LOCAL_RPC_URL, PRODUCTION_DEPLOYMENT_FILE, PRODUCTION_NETWORK_NAME, PRODUCTION_RPC_URL,
};
use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Deployments
    pub deployment_dir: PathBuf,

    // Blockchain
    pub production_rpc_url: String,
    pub local_rpc_url: String,

    // Wallet transport
    pub wallet_private_key: Option<String>,

    // Queries
    pub ranking_fetch_concurrency: usize,
    pub latest_records_limit: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            deployment_dir: env::var("DEPLOYMENT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),

            production_rpc_url: env::var("PRODUCTION_RPC_URL")
                .unwrap_or_else(|_| PRODUCTION_RPC_URL.to_string()),
            local_rpc_url: env::var("LOCAL_RPC_URL").unwrap_or_else(|_| LOCAL_RPC_URL.to_string()),

            wallet_private_key: env::var("WALLET_PRIVATE_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),

            ranking_fetch_concurrency: env::var("RANKING_FETCH_CONCURRENCY")
                .unwrap_or_else(|_| DEFAULT_RANKING_FETCH_CONCURRENCY.to_string())
                .parse()?,
            latest_records_limit: env::var("LATEST_RECORDS_LIMIT")
                .unwrap_or_else(|_| DEFAULT_LATEST_RECORDS_LIMIT.to_string())
                .parse()?,
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.production_rpc_url)
            .map_err(|e| anyhow::anyhow!("PRODUCTION_RPC_URL is invalid: {e}"))?;
        url::Url::parse(&self.local_rpc_url)
            .map_err(|e| anyhow::anyhow!("LOCAL_RPC_URL is invalid: {e}"))?;
        if self.ranking_fetch_concurrency == 0 {
            anyhow::bail!("RANKING_FETCH_CONCURRENCY must be at least 1");
        }
        if self.latest_records_limit == 0 {
            anyhow::bail!("LATEST_RECORDS_LIMIT must be at least 1");
        }
        if self.wallet_private_key.is_none() {
            tracing::warn!("WALLET_PRIVATE_KEY not set, attacks will be unavailable");
        }

        Ok(())
    }

    /// RPC endpoint for a deployment, chosen by its network name.
    pub fn rpc_url_for(&self, network: &str) -> &str {
        if network == PRODUCTION_NETWORK_NAME {
            &self.production_rpc_url
        } else {
            &self.local_rpc_url
        }
    }

    /// Load the first deployment file found and attach its RPC endpoint.
    pub fn load_deployment(&self) -> Result<Deployment> {
        let addresses = ContractAddresses::discover(&self.deployment_dir)?;
        let rpc_url = self.rpc_url_for(&addresses.network).to_string();
        tracing::info!(network = %addresses.network, %rpc_url, "Loaded contract addresses");
        Ok(Deployment { addresses, rpc_url })
    }
}

/// Addresses of the deployed world boss contracts.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContractAddresses {
    pub network: String,
    pub boss_core: String,
    pub fight_records: String,
    pub user_stats: String,
    pub world_boss_system: String,
    #[serde(default)]
    pub nft_awards: Option<String>,
}

impl ContractAddresses {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::ConfigurationMissing(format!("{}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::ConfigurationMissing(format!("{} is not valid: {}", path.display(), e))
        })
    }

    /// Production addresses win over local ones when both files exist.
    pub fn discover(dir: &Path) -> Result<Self> {
        for file in [PRODUCTION_DEPLOYMENT_FILE, LOCAL_DEPLOYMENT_FILE] {
            let path = dir.join(file);
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Err(AppError::ConfigurationMissing(format!(
            "No contract addresses file found in {}",
            dir.display()
        )))
    }

    pub fn is_production(&self) -> bool {
        self.network == PRODUCTION_NETWORK_NAME
    }
}

#[derive(Debug, Clone)]
pub struct Deployment {
    pub addresses: ContractAddresses,
    pub rpc_url: String,
}

impl Deployment {
    pub fn network(&self) -> &str {
        &self.addresses.network
    }
}
