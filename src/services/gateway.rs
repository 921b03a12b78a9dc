use ethers::types::U256;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    config::{Config, Deployment},
    constants::{DEFAULT_LATEST_RECORDS_LIMIT, DEFAULT_RANKING_FETCH_CONCURRENCY},
    error::{AppError, Result},
    models::{
        AttackReceipt, AttackRecord, BossInfo, BossSnapshot, HistoricalAttack, Leaderboard,
        SkillInfo, UserStats,
    },
    services::{
        error_classifier, normalizer,
        onchain::{parse_address, BossChain, WalletConnector},
        ranking::RankingAggregator,
    },
    session::SessionContext,
};

#[derive(Clone)]
struct Connection {
    chain: Arc<dyn BossChain>,
    network: String,
}

/// Chain Gateway - every call to the world boss contracts goes through here
pub struct ChainGateway {
    deployment: Deployment,
    connector: Arc<dyn WalletConnector>,
    connection: Mutex<Option<Connection>>,
    ranking_fetch_concurrency: usize,
    latest_records_limit: u64,
}

impl ChainGateway {
    pub fn new(deployment: Deployment, connector: Arc<dyn WalletConnector>) -> Self {
        Self {
            deployment,
            connector,
            connection: Mutex::new(None),
            ranking_fetch_concurrency: DEFAULT_RANKING_FETCH_CONCURRENCY,
            latest_records_limit: DEFAULT_LATEST_RECORDS_LIMIT,
        }
    }

    pub fn from_config(
        config: &Config,
        deployment: Deployment,
        connector: Arc<dyn WalletConnector>,
    ) -> Self {
        let mut gateway = Self::new(deployment, connector);
        gateway.ranking_fetch_concurrency = config.ranking_fetch_concurrency.max(1);
        gateway.latest_records_limit = config.latest_records_limit;
        gateway
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub async fn is_ready(&self) -> bool {
        self.connection.lock().await.is_some()
    }

    /// Connect once; concurrent callers wait on the same lock and share the result.
    pub async fn ensure_ready(&self) -> Result<Arc<dyn BossChain>> {
        let mut guard = self.connection.lock().await;
        if let Some(connection) = guard.as_ref() {
            return Ok(connection.chain.clone());
        }

        tracing::info!(network = self.deployment.network(), "Connecting to chain");
        let chain = self.connector.connect(&self.deployment).await?;
        *guard = Some(Connection {
            chain: chain.clone(),
            network: self.deployment.network().to_string(),
        });
        Ok(chain)
    }

    pub async fn disconnect(&self) {
        if self.connection.lock().await.take().is_some() {
            tracing::info!("Chain connection dropped");
        }
    }

    /// Drop the connection when the session no longer matches it.
    pub async fn sync_with_session(&self, session: &SessionContext) -> bool {
        let mut guard = self.connection.lock().await;
        let Some(connection) = guard.as_ref() else {
            return false;
        };

        let network = session.current_network();
        let stale = !session.is_connected() || (!network.is_empty() && network != connection.network);
        if stale {
            tracing::info!(
                connected = session.is_connected(),
                session_network = %network,
                "Session changed, dropping chain connection"
            );
            *guard = None;
        }
        stale
    }

    /// Connect and record the signer and network in the session.
    pub async fn connect_wallet(&self, session: &SessionContext) -> Result<String> {
        let address = self.get_current_account().await?;
        session.set_current_address(&address);
        session.set_current_network(self.deployment.network());
        Ok(address)
    }

    pub async fn get_current_account(&self) -> Result<String> {
        let chain = self.ensure_ready().await?;
        chain
            .signer_address()
            .map(normalizer::checksum_address)
            .ok_or(AppError::WalletUnavailable)
    }

    pub async fn attack(&self, boss_id: U256) -> Result<AttackReceipt> {
        let result = async {
            let chain = self.ensure_ready().await?;
            chain.attack_boss(boss_id).await
        }
        .await;

        match result {
            Ok(receipt) => {
                let receipt = normalizer::attack_receipt(&receipt);
                tracing::info!(%boss_id, tx = %receipt.transaction_hash, "Attack mined");
                Ok(receipt)
            }
            Err(err) => {
                error_classifier::report("attack", &err);
                Err(err)
            }
        }
    }

    pub async fn get_active_boss_status(&self) -> Result<BossSnapshot> {
        self.query("get_active_boss_status", |chain| async move {
            normalizer::boss_snapshot(chain.active_boss_status().await?)
        })
        .await
    }

    pub async fn get_boss_hp_percentage(&self) -> Result<u64> {
        self.query("get_boss_hp_percentage", |chain| async move {
            normalizer::to_u64("hp percentage", chain.boss_hp_percentage().await?)
        })
        .await
    }

    pub async fn get_user_stats(&self, address: &str) -> Result<UserStats> {
        let user = parse_address(address)?;
        self.query("get_user_stats", |chain| async move {
            normalizer::user_stats(chain.system_user_stats(user).await?)
        })
        .await
    }

    pub async fn get_latest_attack_records(
        &self,
        boss_id: U256,
        limit: u64,
    ) -> Result<Vec<AttackRecord>> {
        self.query("get_latest_attack_records", |chain| async move {
            chain
                .latest_attack_records(boss_id, U256::from(limit))
                .await?
                .into_iter()
                .map(normalizer::attack_record)
                .collect()
        })
        .await
    }

    /// Latest records using the configured page size.
    pub async fn get_recent_attack_records(&self, boss_id: U256) -> Result<Vec<AttackRecord>> {
        self.get_latest_attack_records(boss_id, self.latest_records_limit)
            .await
    }

    pub async fn get_boss_attack_history(&self, boss_id: U256) -> Result<Vec<HistoricalAttack>> {
        self.query("get_boss_attack_history", |chain| async move {
            normalizer::attack_history(chain.boss_attack_records(boss_id).await?)
        })
        .await
    }

    pub async fn get_boss_info(&self, boss_id: U256) -> Result<BossInfo> {
        self.query("get_boss_info", |chain| async move {
            normalizer::boss_info(chain.boss_info(boss_id).await?)
        })
        .await
    }

    /// Every active boss with its details, in registry order.
    pub async fn get_active_bosses(&self) -> Result<Vec<BossInfo>> {
        self.query("get_active_bosses", |chain| async move {
            let ids = chain.active_bosses().await?;
            let lookups = ids.into_iter().map(|id| {
                let chain = chain.clone();
                async move { normalizer::boss_info(chain.boss_info(id).await?) }
            });
            futures_util::future::try_join_all(lookups).await
        })
        .await
    }

    pub async fn get_boss_skill(&self, boss_id: U256, skill_index: U256) -> Result<SkillInfo> {
        self.query("get_boss_skill", |chain| async move {
            normalizer::skill_info(chain.boss_skill(boss_id, skill_index).await?)
        })
        .await
    }

    pub async fn get_participant_count(&self, boss_id: U256) -> Result<String> {
        self.query("get_participant_count", |chain| async move {
            Ok(normalizer::to_decimal_string(
                chain.participant_count(boss_id).await?,
            ))
        })
        .await
    }

    pub async fn get_all_participants(&self, boss_id: U256) -> Result<Vec<String>> {
        self.query("get_all_participants", |chain| async move {
            Ok(chain
                .all_participants(boss_id)
                .await?
                .into_iter()
                .map(normalizer::checksum_address)
                .collect())
        })
        .await
    }

    pub async fn get_boss_top_damage(&self, boss_id: U256, limit: usize) -> Result<Leaderboard> {
        let concurrency = self.ranking_fetch_concurrency;
        self.query("get_boss_top_damage", |chain| async move {
            RankingAggregator::new(chain)
                .with_fetch_concurrency(concurrency)
                .leaderboard(boss_id, limit)
                .await
        })
        .await
    }

    // Read-only path: connect if needed, run, and surface failures as QueryFailed.
    async fn query<T, F, Fut>(&self, operation: &str, run: F) -> Result<T>
    where
        F: FnOnce(Arc<dyn BossChain>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let result = match self.ensure_ready().await {
            Ok(chain) => run(chain).await.map_err(AppError::query_failed),
            Err(AppError::WalletUnavailable) => Err(AppError::WalletUnavailable),
            Err(err) => Err(AppError::query_failed(err)),
        };

        if let Err(err) = &result {
            error_classifier::report(operation, err);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContractAddresses;
    use crate::services::mock_chain::MockChain;
    use crate::services::onchain::{RawAttackRecord, RawBoss, RawSkill};
    use crate::session::MemorySessionStorage;
    use async_trait::async_trait;
    use ethers::types::Address;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockConnector {
        chain: Option<Arc<MockChain>>,
        connects: AtomicUsize,
    }

    impl MockConnector {
        fn new(chain: Arc<MockChain>) -> Self {
            Self {
                chain: Some(chain),
                connects: AtomicUsize::new(0),
            }
        }

        fn without_wallet() -> Self {
            Self {
                chain: None,
                connects: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WalletConnector for MockConnector {
        async fn connect(&self, _deployment: &Deployment) -> Result<Arc<dyn BossChain>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            match &self.chain {
                Some(chain) => Ok(chain.clone()),
                None => Err(AppError::WalletUnavailable),
            }
        }
    }

    struct UnreachableConnector;

    #[async_trait]
    impl WalletConnector for UnreachableConnector {
        async fn connect(&self, _deployment: &Deployment) -> Result<Arc<dyn BossChain>> {
            Err(AppError::NetworkError("connection refused".to_string()))
        }
    }

    fn deployment() -> Deployment {
        Deployment {
            addresses: ContractAddresses {
                network: "localhost".to_string(),
                boss_core: "0x1FC341669CB5cd42cC7Cf72437D469b69444b98B".to_string(),
                fight_records: "0x9138ABEfb93114235A34A6023503730479F7758b".to_string(),
                user_stats: "0x82Bc97d68b938c3f092AD9DBa816a453937320e3".to_string(),
                world_boss_system: "0x19d542bD3854Db5606e3E87F896f811FE44d70C4".to_string(),
                nft_awards: None,
            },
            rpc_url: "http://localhost:8545".to_string(),
        }
    }

    fn gateway_with(chain: Arc<MockChain>) -> (ChainGateway, Arc<MockConnector>) {
        let connector = Arc::new(MockConnector::new(chain));
        (ChainGateway::new(deployment(), connector.clone()), connector)
    }

    fn boss(id: u64, name: &str, level: u64, active: bool) -> RawBoss {
        RawBoss {
            id: U256::from(id),
            name: name.to_string(),
            max_hp: U256::from(1000),
            current_hp: U256::from(250),
            level: U256::from(level),
            attack_count: U256::from(3),
            is_active: active,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn ensure_ready_connects_once_under_concurrency() {
        let (gateway, connector) = gateway_with(Arc::new(MockChain::default()));

        let (a, b, c) = tokio::join!(
            gateway.ensure_ready(),
            gateway.ensure_ready(),
            gateway.ensure_ready()
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(connector.connects.load(Ordering::SeqCst), 1);
        assert!(gateway.is_ready().await);
    }

    #[tokio::test]
    async fn missing_wallet_is_reported_as_wallet_unavailable() {
        let gateway = ChainGateway::new(deployment(), Arc::new(MockConnector::without_wallet()));

        let err = gateway.get_boss_hp_percentage().await.unwrap_err();
        assert!(matches!(err, AppError::WalletUnavailable));
        assert!(!gateway.is_ready().await);
    }

    #[tokio::test]
    async fn unreachable_rpc_at_connect_is_query_failed() {
        let gateway = ChainGateway::new(deployment(), Arc::new(UnreachableConnector));

        let err = gateway.get_boss_info(U256::one()).await.unwrap_err();
        assert_eq!(err.code(), "QUERY_FAILED");
        assert!(err.to_string().contains("connection refused"));
        assert!(!gateway.is_ready().await);
    }

    #[tokio::test]
    async fn boss_info_carries_theme_and_rarity() {
        let chain = Arc::new(MockChain::default());
        chain.insert_boss(boss(1, "火焰魔王", 3, true));
        chain.insert_boss(boss(2, "冰霜巨龙", 2, true));
        chain.insert_boss(boss(3, "Stone Golem", 1, true));
        let (gateway, _) = gateway_with(chain);

        let fire = gateway.get_boss_info(U256::from(1)).await.unwrap();
        let ice = gateway.get_boss_info(U256::from(2)).await.unwrap();
        let plain = gateway.get_boss_info(U256::from(3)).await.unwrap();

        assert_eq!(fire.theme.as_str(), "fire");
        assert_eq!(fire.rarity.label(), "Epic");
        assert_eq!(ice.theme.as_str(), "ice");
        assert_eq!(plain.theme.as_str(), "fire");
        assert_eq!(plain.boss.current_hp, "250");
    }

    #[tokio::test]
    async fn active_bosses_keep_registry_order() {
        let chain = Arc::new(MockChain::default());
        chain.insert_boss(boss(5, "暗影领主", 1, true));
        chain.insert_boss(boss(2, "冰霜巨龙", 2, true));
        chain.insert_boss(boss(7, "Retired", 1, false));
        let (gateway, _) = gateway_with(chain);

        let bosses = gateway.get_active_bosses().await.unwrap();
        let ids: Vec<u64> = bosses.iter().map(|b| b.boss.id).collect();
        assert_eq!(ids, vec![2, 5]);
    }

    #[tokio::test]
    async fn read_failures_become_query_failed() {
        let (gateway, _) = gateway_with(Arc::new(MockChain::default()));

        let err = gateway.get_boss_info(U256::from(99)).await.unwrap_err();
        assert_eq!(err.code(), "QUERY_FAILED");

        let err = gateway.get_active_boss_status().await.unwrap_err();
        assert_eq!(err.code(), "QUERY_FAILED");
        assert!(err.to_string().contains("Boss not active"));
    }

    #[tokio::test]
    async fn hp_percentage_and_skill_are_normalized() {
        let chain = Arc::new(MockChain::default());
        *chain.active_boss.lock().unwrap() = Some(boss(1, "火", 1, true));
        chain.skills.lock().unwrap().insert(
            (U256::from(1), U256::zero()),
            RawSkill {
                name: "Inferno".to_string(),
                duration: U256::from(30),
                trigger_interval: U256::from(60),
                trigger_attack_count: U256::from(10),
                is_active: true,
                activated_time: U256::from(1_700_000_000u64),
            },
        );
        let (gateway, _) = gateway_with(chain);

        assert_eq!(gateway.get_boss_hp_percentage().await.unwrap(), 25);
        let skill = gateway
            .get_boss_skill(U256::from(1), U256::zero())
            .await
            .unwrap();
        assert_eq!(skill.trigger_attack_count, 10);
        assert_eq!(skill.activated_time.timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn latest_records_respect_limit() {
        let chain = Arc::new(MockChain::default());
        for i in 0..5u64 {
            chain.records.lock().unwrap().push(RawAttackRecord {
                attacker: Address::repeat_byte(i as u8 + 1),
                timestamp: U256::from(100 + i),
                damage: U256::from(10 * i),
                boss_hp_after: U256::from(1000 - 10 * i),
                record_type: 0,
                skill_name: String::new(),
            });
        }
        let (gateway, _) = gateway_with(chain);

        let records = gateway
            .get_latest_attack_records(U256::one(), 3)
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].damage, "20");

        let recent = gateway.get_recent_attack_records(U256::one()).await.unwrap();
        assert_eq!(recent.len(), 5);
    }

    #[tokio::test]
    async fn attack_history_is_zipped() {
        let chain = Arc::new(MockChain::default());
        *chain.history.lock().unwrap() = crate::services::onchain::RawAttackHistory {
            attackers: vec![Address::repeat_byte(1), Address::repeat_byte(2)],
            damages: vec![U256::from(10), U256::from(20)],
            timestamps: vec![U256::from(100), U256::from(200)],
        };
        let config = Config {
            deployment_dir: std::path::PathBuf::from("."),
            production_rpc_url: "https://testnet-rpc.monad.xyz".to_string(),
            local_rpc_url: "http://localhost:8545".to_string(),
            wallet_private_key: None,
            ranking_fetch_concurrency: 2,
            latest_records_limit: 2,
        };
        let gateway = ChainGateway::from_config(
            &config,
            deployment(),
            Arc::new(MockConnector::new(chain)),
        );

        let history = gateway.get_boss_attack_history(U256::one()).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].damage, "20");
        assert_eq!(history[1].timestamp.timestamp(), 200);
    }

    #[tokio::test]
    async fn attack_returns_receipt() {
        let chain = Arc::new(MockChain::default());
        let (gateway, _) = gateway_with(chain.clone());

        let receipt = gateway.attack(U256::from(1)).await.unwrap();
        assert_eq!(receipt.status, Some(1));
        assert_eq!(receipt.block_number, Some(42));
        assert_eq!(chain.attacks(), 1);
    }

    #[tokio::test]
    async fn attack_revert_is_classified_and_returned() {
        let chain = Arc::new(MockChain::default());
        *chain.attack_error.lock().unwrap() = Some("Boss already defeated".to_string());
        let (gateway, _) = gateway_with(chain);

        match gateway.attack(U256::from(1)).await {
            Err(AppError::ContractReverted { fault, reason }) => {
                assert_eq!(fault, error_classifier::BossFault::BossAlreadyDefeated);
                assert_eq!(reason, "Boss already defeated");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn top_damage_runs_over_connected_chain() {
        let chain = Arc::new(MockChain::with_damages(&[
            (Address::repeat_byte(0xa), 100),
            (Address::repeat_byte(0xb), 300),
            (Address::repeat_byte(0xc), 300),
            (Address::repeat_byte(0xd), 50),
        ]));
        let (gateway, _) = gateway_with(chain);

        let board = gateway.get_boss_top_damage(U256::one(), 3).await.unwrap();
        assert_eq!(board.total_participants, 4);
        assert_eq!(
            board.entries[0].address,
            normalizer::checksum_address(Address::repeat_byte(0xb))
        );
        assert_eq!(gateway.get_participant_count(U256::one()).await.unwrap(), "4");
    }

    #[tokio::test]
    async fn connect_wallet_fills_session_and_sync_drops_stale_connection() {
        let signer = Address::repeat_byte(0x42);
        let (gateway, connector) = gateway_with(Arc::new(MockChain::with_signer(signer)));
        let session = SessionContext::new(Arc::new(MemorySessionStorage::default()));

        let address = gateway.connect_wallet(&session).await.unwrap();
        assert_eq!(address, normalizer::checksum_address(signer));
        assert_eq!(session.current_address(), address);
        assert_eq!(session.current_network(), "localhost");
        assert!(!gateway.sync_with_session(&session).await);

        session.set_current_network("Monad Testnet");
        assert!(gateway.sync_with_session(&session).await);
        assert!(!gateway.is_ready().await);

        gateway.ensure_ready().await.unwrap();
        session.disconnect();
        assert!(gateway.sync_with_session(&session).await);
        assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn current_account_requires_signer() {
        let (gateway, _) = gateway_with(Arc::new(MockChain::default()));
        let err = gateway.get_current_account().await.unwrap_err();
        assert!(matches!(err, AppError::WalletUnavailable));
    }
}
