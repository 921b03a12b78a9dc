use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==================== BOSS ====================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossSnapshot {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub max_hp: String,
    pub current_hp: String,
    pub level: u64,
    pub image_url: String,
    pub gold_nft_url: String,
    pub silver_nft_url: String,
    pub bronze_nft_url: String,
    pub attack_count: String,
    pub is_active: bool,
    pub is_defeated: bool,
    pub skill: String,
}

/// Boss details plus display-only classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossInfo {
    #[serde(flatten)]
    pub boss: BossSnapshot,
    pub rarity: Rarity,
    pub theme: BossTheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

impl Rarity {
    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BossTheme {
    Fire,
    Ice,
    Shadow,
}

impl BossTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            BossTheme::Fire => "fire",
            BossTheme::Ice => "ice",
            BossTheme::Shadow => "shadow",
        }
    }
}

// ==================== SKILL ====================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInfo {
    pub name: String,
    pub duration: u64,
    pub trigger_interval: u64,
    pub trigger_attack_count: u64,
    pub is_active: bool,
    pub activated_time: DateTime<Utc>,
}

// ==================== STATS ====================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub attack_count: String,
    pub total_damage: String,
    pub rank: u64, // assigned by the contract
}

// ==================== FIGHT RECORDS ====================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackRecord {
    pub attacker: String,
    pub timestamp: DateTime<Utc>,
    pub damage: String,
    pub boss_hp_after: String,
    pub record_type: u8,
    pub skill_name: Option<String>,
}

impl AttackRecord {
    /// Tag 0 is a plain hit; anything else is a skill event.
    pub fn is_skill_event(&self) -> bool {
        self.record_type != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalAttack {
    pub attacker: String,
    pub damage: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackReceipt {
    pub transaction_hash: String,
    pub block_number: Option<u64>,
    pub gas_used: Option<String>,
    pub status: Option<u64>,
}

// ==================== LEADERBOARD ====================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub rank: usize,
    pub address: String,
    pub total_damage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub boss_id: String,
    pub total_participants: usize,
    pub entries: Vec<RankEntry>,
}
