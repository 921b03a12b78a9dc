use async_trait::async_trait;
use ethers::{
    contract::ContractError,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, TransactionReceipt, U256},
};
use std::str::FromStr;
use std::sync::Arc;

use crate::{
    config::{Config, ContractAddresses, Deployment},
    error::{AppError, Result},
};

// ==================== BINDINGS ====================

mod system_bindings {
    ethers::contract::abigen!(
        WorldBossSystem,
        r#"[
            function attackBoss(uint256 bossId)
            function getActiveBossStatus() view returns (uint256 id, string name, string description, uint256 maxHp, uint256 currentHp, uint256 level, string imageUrl, string goldNftUrl, string silverNftUrl, string bronzeNftUrl, uint256 attackCount, bool isActive, bool isDefeated, string skill)
            function getBossHpPercentage() view returns (uint256)
            function getUserStats(address user) view returns (uint256 attackCount, uint256 totalDamage, uint256 rank)
        ]"#
    );
}

mod core_bindings {
    ethers::contract::abigen!(
        BossCore,
        r#"[
            function getBossInfo(uint256 bossId) view returns (uint256 id, string name, string description, uint256 maxHp, uint256 currentHp, uint256 level, string imageUrl, string goldNftUrl, string silverNftUrl, string bronzeNftUrl, uint256 attackCount, bool isActive, bool isDefeated, string skillName)
            function getActiveBosses() view returns (uint256[])
            function getBossSkill(uint256 bossId, uint256 skillIndex) view returns (string name, uint256 duration, uint256 triggerInterval, uint256 triggerAttackCount, bool isActive, uint256 activatedTime)
        ]"#
    );
}

mod records_bindings {
    ethers::contract::abigen!(
        FightRecords,
        r#"[
            struct AttackRecord { address attacker; uint256 timestamp; uint256 damage; uint256 bossHpAfter; uint8 recordType; string skillName; }
            function getLatestAttackRecords(uint256 bossId, uint256 count) view returns (AttackRecord[])
            function getBossAttackRecords(uint256 bossId) view returns (address[] attackers, uint256[] damages, uint256[] timestamps)
        ]"#
    );
}

mod stats_bindings {
    ethers::contract::abigen!(
        UserStatsContract,
        r#"[
            function getParticipantCount(uint256 bossId) view returns (uint256)
            function getAllParticipants(uint256 bossId) view returns (address[])
            function getUserStats(uint256 bossId, address user) view returns (uint256 attackCount, uint256 totalDamage, uint256 rank)
        ]"#
    );
}

use core_bindings::BossCore;
use records_bindings::FightRecords;
use stats_bindings::UserStatsContract;
use system_bindings::WorldBossSystem;

// ==================== RAW VALUES ====================

/// Boss tuple exactly as the registry and façade contracts return it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBoss {
    pub id: U256,
    pub name: String,
    pub description: String,
    pub max_hp: U256,
    pub current_hp: U256,
    pub level: U256,
    pub image_url: String,
    pub gold_nft_url: String,
    pub silver_nft_url: String,
    pub bronze_nft_url: String,
    pub attack_count: U256,
    pub is_active: bool,
    pub is_defeated: bool,
    pub skill: String,
}

type BossTuple = (
    U256,
    String,
    String,
    U256,
    U256,
    U256,
    String,
    String,
    String,
    String,
    U256,
    bool,
    bool,
    String,
);

impl From<BossTuple> for RawBoss {
    fn from(value: BossTuple) -> Self {
        let (
            id,
            name,
            description,
            max_hp,
            current_hp,
            level,
            image_url,
            gold_nft_url,
            silver_nft_url,
            bronze_nft_url,
            attack_count,
            is_active,
            is_defeated,
            skill,
        ) = value;
        Self {
            id,
            name,
            description,
            max_hp,
            current_hp,
            level,
            image_url,
            gold_nft_url,
            silver_nft_url,
            bronze_nft_url,
            attack_count,
            is_active,
            is_defeated,
            skill,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSkill {
    pub name: String,
    pub duration: U256,
    pub trigger_interval: U256,
    pub trigger_attack_count: U256,
    pub is_active: bool,
    pub activated_time: U256,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawUserStats {
    pub attack_count: U256,
    pub total_damage: U256,
    pub rank: U256,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAttackRecord {
    pub attacker: Address,
    pub timestamp: U256,
    pub damage: U256,
    pub boss_hp_after: U256,
    pub record_type: u8,
    pub skill_name: String,
}

impl From<records_bindings::AttackRecord> for RawAttackRecord {
    fn from(record: records_bindings::AttackRecord) -> Self {
        Self {
            attacker: record.attacker,
            timestamp: record.timestamp,
            damage: record.damage,
            boss_hp_after: record.boss_hp_after,
            record_type: record.record_type,
            skill_name: record.skill_name,
        }
    }
}

/// Parallel arrays from `getBossAttackRecords`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAttackHistory {
    pub attackers: Vec<Address>,
    pub damages: Vec<U256>,
    pub timestamps: Vec<U256>,
}

// ==================== CHAIN TRAIT ====================

/// Typed access to the four world boss contracts.
#[async_trait]
pub trait BossChain: Send + Sync {
    /// Address transactions are signed with, if a signer is attached.
    fn signer_address(&self) -> Option<Address>;

    async fn attack_boss(&self, boss_id: U256) -> Result<TransactionReceipt>;

    async fn active_boss_status(&self) -> Result<RawBoss>;

    async fn boss_hp_percentage(&self) -> Result<U256>;

    async fn system_user_stats(&self, user: Address) -> Result<RawUserStats>;

    async fn latest_attack_records(&self, boss_id: U256, count: U256)
        -> Result<Vec<RawAttackRecord>>;

    async fn boss_attack_records(&self, boss_id: U256) -> Result<RawAttackHistory>;

    async fn boss_info(&self, boss_id: U256) -> Result<RawBoss>;

    async fn active_bosses(&self) -> Result<Vec<U256>>;

    async fn boss_skill(&self, boss_id: U256, skill_index: U256) -> Result<RawSkill>;

    async fn participant_count(&self, boss_id: U256) -> Result<U256>;

    async fn all_participants(&self, boss_id: U256) -> Result<Vec<Address>>;

    async fn boss_user_stats(&self, boss_id: U256, user: Address) -> Result<RawUserStats>;
}

// ==================== ETHERS IMPLEMENTATION ====================

pub struct EthersChain<M> {
    client: Arc<M>,
    world_boss_system: WorldBossSystem<M>,
    boss_core: BossCore<M>,
    fight_records: FightRecords<M>,
    user_stats: UserStatsContract<M>,
}

impl<M: Middleware + 'static> EthersChain<M> {
    pub fn new(client: Arc<M>, addresses: &ContractAddresses) -> Result<Self> {
        Ok(Self {
            world_boss_system: WorldBossSystem::new(
                parse_contract_address("worldBossSystem", &addresses.world_boss_system)?,
                client.clone(),
            ),
            boss_core: BossCore::new(
                parse_contract_address("bossCore", &addresses.boss_core)?,
                client.clone(),
            ),
            fight_records: FightRecords::new(
                parse_contract_address("fightRecords", &addresses.fight_records)?,
                client.clone(),
            ),
            user_stats: UserStatsContract::new(
                parse_contract_address("userStats", &addresses.user_stats)?,
                client.clone(),
            ),
            client,
        })
    }
}

impl EthersChain<Provider<Http>> {
    /// Provider-only bindings; enough for every view call but not for attacks.
    pub fn read_only(deployment: &Deployment) -> Result<Self> {
        let provider = Provider::<Http>::try_from(deployment.rpc_url.as_str())
            .map_err(|e| AppError::Internal(format!("Invalid RPC URL: {}", e)))?;
        Self::new(Arc::new(provider), &deployment.addresses)
    }
}

#[async_trait]
impl<M: Middleware + 'static> BossChain for EthersChain<M> {
    fn signer_address(&self) -> Option<Address> {
        self.client.default_sender()
    }

    async fn attack_boss(&self, boss_id: U256) -> Result<TransactionReceipt> {
        let call = self.world_boss_system.attack_boss(boss_id);
        let pending = call.send().await.map_err(contract_fault::<M>)?;
        let tx_hash = pending.tx_hash();
        tracing::info!(%boss_id, ?tx_hash, "Attack transaction submitted");

        let receipt = pending
            .await
            .map_err(|e| AppError::NetworkError(e.to_string()))?
            .ok_or_else(|| {
                AppError::NetworkError(format!("Transaction {tx_hash:?} dropped before mining"))
            })?;

        if receipt.status.map(|s| s.as_u64()) == Some(0) {
            return Err(AppError::reverted(format!(
                "Transaction {tx_hash:?} reverted on chain"
            )));
        }
        Ok(receipt)
    }

    async fn active_boss_status(&self) -> Result<RawBoss> {
        let boss = self
            .world_boss_system
            .get_active_boss_status()
            .call()
            .await
            .map_err(contract_fault::<M>)?;
        Ok(boss.into())
    }

    async fn boss_hp_percentage(&self) -> Result<U256> {
        self.world_boss_system
            .get_boss_hp_percentage()
            .call()
            .await
            .map_err(contract_fault::<M>)
    }

    async fn system_user_stats(&self, user: Address) -> Result<RawUserStats> {
        let (attack_count, total_damage, rank) = self
            .world_boss_system
            .get_user_stats(user)
            .call()
            .await
            .map_err(contract_fault::<M>)?;
        Ok(RawUserStats {
            attack_count,
            total_damage,
            rank,
        })
    }

    async fn latest_attack_records(
        &self,
        boss_id: U256,
        count: U256,
    ) -> Result<Vec<RawAttackRecord>> {
        let records = self
            .fight_records
            .get_latest_attack_records(boss_id, count)
            .call()
            .await
            .map_err(contract_fault::<M>)?;
        Ok(records
            .into_iter()
            .map(
                |(attacker, timestamp, damage, boss_hp_after, record_type, skill_name)| {
                    RawAttackRecord::from(records_bindings::AttackRecord {
                        attacker,
                        timestamp,
                        damage,
                        boss_hp_after,
                        record_type,
                        skill_name,
                    })
                },
            )
            .collect())
    }

    async fn boss_attack_records(&self, boss_id: U256) -> Result<RawAttackHistory> {
        let (attackers, damages, timestamps) = self
            .fight_records
            .get_boss_attack_records(boss_id)
            .call()
            .await
            .map_err(contract_fault::<M>)?;
        Ok(RawAttackHistory {
            attackers,
            damages,
            timestamps,
        })
    }

    async fn boss_info(&self, boss_id: U256) -> Result<RawBoss> {
        let boss = self
            .boss_core
            .get_boss_info(boss_id)
            .call()
            .await
            .map_err(contract_fault::<M>)?;
        Ok(boss.into())
    }

    async fn active_bosses(&self) -> Result<Vec<U256>> {
        self.boss_core
            .get_active_bosses()
            .call()
            .await
            .map_err(contract_fault::<M>)
    }

    async fn boss_skill(&self, boss_id: U256, skill_index: U256) -> Result<RawSkill> {
        let (name, duration, trigger_interval, trigger_attack_count, is_active, activated_time) =
            self.boss_core
                .get_boss_skill(boss_id, skill_index)
                .call()
                .await
                .map_err(contract_fault::<M>)?;
        Ok(RawSkill {
            name,
            duration,
            trigger_interval,
            trigger_attack_count,
            is_active,
            activated_time,
        })
    }

    async fn participant_count(&self, boss_id: U256) -> Result<U256> {
        self.user_stats
            .get_participant_count(boss_id)
            .call()
            .await
            .map_err(contract_fault::<M>)
    }

    async fn all_participants(&self, boss_id: U256) -> Result<Vec<Address>> {
        self.user_stats
            .get_all_participants(boss_id)
            .call()
            .await
            .map_err(contract_fault::<M>)
    }

    async fn boss_user_stats(&self, boss_id: U256, user: Address) -> Result<RawUserStats> {
        let (attack_count, total_damage, rank) = self
            .user_stats
            .get_user_stats(boss_id, user)
            .call()
            .await
            .map_err(contract_fault::<M>)?;
        Ok(RawUserStats {
            attack_count,
            total_damage,
            rank,
        })
    }
}

// ==================== WALLET TRANSPORT ====================

/// Source of a signing connection to the chain.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    async fn connect(&self, deployment: &Deployment) -> Result<Arc<dyn BossChain>>;
}

/// Signs with a locally held private key over the deployment's HTTP RPC.
pub struct LocalKeyConnector {
    private_key: Option<String>,
}

impl LocalKeyConnector {
    pub fn new(private_key: Option<String>) -> Self {
        Self { private_key }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.wallet_private_key.clone())
    }
}

#[async_trait]
impl WalletConnector for LocalKeyConnector {
    async fn connect(&self, deployment: &Deployment) -> Result<Arc<dyn BossChain>> {
        let key = self
            .private_key
            .as_deref()
            .ok_or(AppError::WalletUnavailable)?;

        let provider = Provider::<Http>::try_from(deployment.rpc_url.as_str())
            .map_err(|e| AppError::Internal(format!("Invalid RPC URL: {}", e)))?;
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| AppError::NetworkError(e.to_string()))?;
        let wallet = LocalWallet::from_str(key.trim())
            .map_err(|e| AppError::Internal(format!("Invalid wallet key: {}", e)))?
            .with_chain_id(chain_id.as_u64());

        tracing::info!(
            network = deployment.network(),
            chain_id = chain_id.as_u64(),
            signer = ?wallet.address(),
            "Wallet connected"
        );

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        Ok(Arc::new(EthersChain::new(client, &deployment.addresses)?))
    }
}

// ==================== HELPERS ====================

pub fn parse_contract_address(name: &str, value: &str) -> Result<Address> {
    Address::from_str(value.trim())
        .map_err(|_| AppError::ConfigurationMissing(format!("Invalid {name} address: {value}")))
}

pub fn parse_address(value: &str) -> Result<Address> {
    Address::from_str(value.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid address: {value}")))
}

pub fn parse_boss_id(value: &str) -> Result<U256> {
    U256::from_dec_str(value.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid boss id: {value}")))
}

fn contract_fault<M: Middleware>(err: ContractError<M>) -> AppError {
    if let Some(reason) = err.decode_revert::<String>() {
        return AppError::reverted(reason);
    }
    let message = err.to_string();
    if err.is_revert() || message.contains("execution reverted") {
        return AppError::reverted(message);
    }
    if is_user_rejection(&message) {
        return AppError::TransactionRejected(message);
    }
    AppError::NetworkError(message)
}

fn is_user_rejection(message: &str) -> bool {
    let lowered = message.to_ascii_lowercase();
    lowered.contains("user rejected")
        || lowered.contains("user denied")
        || lowered.contains("rejected by user")
}
