//! In-memory `BossChain` used by unit tests.

use async_trait::async_trait;
use ethers::types::{Address, TransactionReceipt, H256, U256, U64};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{AppError, Result};
use crate::services::onchain::{
    BossChain, RawAttackHistory, RawAttackRecord, RawBoss, RawSkill, RawUserStats,
};

#[derive(Default)]
pub struct MockChain {
    pub signer: Option<Address>,
    pub bosses: Mutex<HashMap<U256, RawBoss>>,
    pub active_boss: Mutex<Option<RawBoss>>,
    pub skills: Mutex<HashMap<(U256, U256), RawSkill>>,
    pub records: Mutex<Vec<RawAttackRecord>>,
    pub history: Mutex<RawAttackHistory>,
    pub attack_error: Mutex<Option<String>>,
    participants: Mutex<Vec<(Address, U256)>>,
    failing_stats: Mutex<HashSet<Address>>,
    stat_queries: AtomicUsize,
    attacks: AtomicUsize,
}

impl MockChain {
    pub fn with_damages(damages: &[(Address, u64)]) -> Self {
        let chain = Self::default();
        for (address, damage) in damages {
            chain.push_participant(*address, U256::from(*damage));
        }
        chain
    }

    pub fn with_signer(signer: Address) -> Self {
        Self {
            signer: Some(signer),
            ..Default::default()
        }
    }

    pub fn push_participant(&self, address: Address, damage: U256) {
        self.participants.lock().unwrap().push((address, damage));
    }

    pub fn insert_boss(&self, boss: RawBoss) {
        self.bosses.lock().unwrap().insert(boss.id, boss);
    }

    pub fn fail_stats_for(&self, address: Address) {
        self.failing_stats.lock().unwrap().insert(address);
    }

    pub fn stat_queries(&self) -> usize {
        self.stat_queries.load(Ordering::SeqCst)
    }

    pub fn attacks(&self) -> usize {
        self.attacks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BossChain for MockChain {
    fn signer_address(&self) -> Option<Address> {
        self.signer
    }

    async fn attack_boss(&self, boss_id: U256) -> Result<TransactionReceipt> {
        self.attacks.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.attack_error.lock().unwrap().clone() {
            return Err(AppError::reverted(reason));
        }
        Ok(TransactionReceipt {
            transaction_hash: H256::from_low_u64_be(boss_id.low_u64() + 1),
            block_number: Some(U64::from(42)),
            gas_used: Some(U256::from(21_000)),
            status: Some(U64::from(1)),
            ..Default::default()
        })
    }

    async fn active_boss_status(&self) -> Result<RawBoss> {
        self.active_boss
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::reverted("Boss not active"))
    }

    async fn boss_hp_percentage(&self) -> Result<U256> {
        let boss = self.active_boss_status().await?;
        if boss.max_hp.is_zero() {
            return Ok(U256::zero());
        }
        Ok(boss.current_hp * U256::from(100) / boss.max_hp)
    }

    async fn system_user_stats(&self, user: Address) -> Result<RawUserStats> {
        let participants = self.participants.lock().unwrap();
        let damage = participants
            .iter()
            .find(|(address, _)| *address == user)
            .map(|(_, damage)| *damage)
            .unwrap_or_default();
        Ok(RawUserStats {
            attack_count: U256::from(u8::from(!damage.is_zero())),
            total_damage: damage,
            rank: U256::zero(),
        })
    }

    async fn latest_attack_records(
        &self,
        _boss_id: U256,
        count: U256,
    ) -> Result<Vec<RawAttackRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().take(count.as_usize()).cloned().collect())
    }

    async fn boss_attack_records(&self, _boss_id: U256) -> Result<RawAttackHistory> {
        Ok(self.history.lock().unwrap().clone())
    }

    async fn boss_info(&self, boss_id: U256) -> Result<RawBoss> {
        self.bosses
            .lock()
            .unwrap()
            .get(&boss_id)
            .cloned()
            .ok_or_else(|| AppError::NetworkError(format!("call reverted for boss {boss_id}")))
    }

    async fn active_bosses(&self) -> Result<Vec<U256>> {
        let mut ids: Vec<U256> = self
            .bosses
            .lock()
            .unwrap()
            .values()
            .filter(|boss| boss.is_active)
            .map(|boss| boss.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn boss_skill(&self, boss_id: U256, skill_index: U256) -> Result<RawSkill> {
        self.skills
            .lock()
            .unwrap()
            .get(&(boss_id, skill_index))
            .cloned()
            .ok_or_else(|| AppError::NetworkError("skill index out of bounds".to_string()))
    }

    async fn participant_count(&self, _boss_id: U256) -> Result<U256> {
        Ok(U256::from(self.participants.lock().unwrap().len()))
    }

    async fn all_participants(&self, _boss_id: U256) -> Result<Vec<Address>> {
        Ok(self
            .participants
            .lock()
            .unwrap()
            .iter()
            .map(|(address, _)| *address)
            .collect())
    }

    async fn boss_user_stats(&self, _boss_id: U256, user: Address) -> Result<RawUserStats> {
        self.stat_queries.fetch_add(1, Ordering::SeqCst);
        if self.failing_stats.lock().unwrap().contains(&user) {
            return Err(AppError::NetworkError("rpc timeout".to_string()));
        }
        self.system_user_stats(user).await
    }
}
