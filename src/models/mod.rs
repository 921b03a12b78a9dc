// src/models/mod.rs
pub mod boss;

pub use boss::{
    AttackReceipt,
    AttackRecord,
    BossInfo,
    BossSnapshot,
    BossTheme,
    HistoricalAttack,
    Leaderboard,
    RankEntry,
    Rarity,
    SkillInfo,
    UserStats,
};
