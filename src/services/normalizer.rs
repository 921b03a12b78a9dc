//! Pure conversions from raw contract values to display-ready models.
//!
//! Integers that can exceed native range (HP, damage, counts) are rendered
//! as decimal strings straight from `U256`; nothing passes through `f64`.

use chrono::{DateTime, TimeZone, Utc};
use ethers::types::{Address, TransactionReceipt, U256};
use ethers::utils::to_checksum;

use crate::{
    constants::{EPIC_MIN_LEVEL, FIRE_KEYWORDS, ICE_KEYWORDS, RARE_MIN_LEVEL, SHADOW_KEYWORDS},
    error::{AppError, Result},
    models::{
        AttackReceipt, AttackRecord, BossInfo, BossSnapshot, BossTheme, HistoricalAttack,
        Rarity, SkillInfo, UserStats,
    },
    services::onchain::{RawAttackHistory, RawAttackRecord, RawBoss, RawSkill, RawUserStats},
};

pub fn to_decimal_string(value: U256) -> String {
    value.to_string()
}

/// Narrow a counter-like value; values past `u64` are rejected rather than truncated.
pub fn to_u64(field: &str, value: U256) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| AppError::Internal(format!("{field} out of range: {value}")))
}

/// Chain seconds to a wall-clock instant (seconds * 1000 as milliseconds).
pub fn to_datetime(seconds: U256) -> Result<DateTime<Utc>> {
    let seconds = i64::try_from(to_u64("timestamp", seconds)?)
        .map_err(|_| AppError::Internal(format!("timestamp out of range: {seconds}")))?;
    let millis = seconds
        .checked_mul(1000)
        .ok_or_else(|| AppError::Internal(format!("timestamp out of range: {seconds}")))?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| AppError::Internal(format!("timestamp out of range: {seconds}")))
}

pub fn checksum_address(address: Address) -> String {
    to_checksum(&address, None)
}

/// Short display form, e.g. `0x1FC3...b98B`.
pub fn format_wallet_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

pub fn rarity_for_level(level: u64) -> Rarity {
    if level >= EPIC_MIN_LEVEL {
        Rarity::Epic
    } else if level >= RARE_MIN_LEVEL {
        Rarity::Rare
    } else {
        Rarity::Common
    }
}

/// Best-effort theme guess from the boss name; fire wins ties and is the default.
pub fn theme_for_name(name: &str) -> BossTheme {
    let lowered = name.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    if matches(FIRE_KEYWORDS) {
        BossTheme::Fire
    } else if matches(ICE_KEYWORDS) {
        BossTheme::Ice
    } else if matches(SHADOW_KEYWORDS) {
        BossTheme::Shadow
    } else {
        BossTheme::Fire
    }
}

pub fn boss_snapshot(raw: RawBoss) -> Result<BossSnapshot> {
    Ok(BossSnapshot {
        id: to_u64("boss id", raw.id)?,
        name: raw.name,
        description: raw.description,
        max_hp: to_decimal_string(raw.max_hp),
        current_hp: to_decimal_string(raw.current_hp),
        level: to_u64("level", raw.level)?,
        image_url: raw.image_url,
        gold_nft_url: raw.gold_nft_url,
        silver_nft_url: raw.silver_nft_url,
        bronze_nft_url: raw.bronze_nft_url,
        attack_count: to_decimal_string(raw.attack_count),
        is_active: raw.is_active,
        is_defeated: raw.is_defeated,
        skill: raw.skill,
    })
}

pub fn boss_info(raw: RawBoss) -> Result<BossInfo> {
    let boss = boss_snapshot(raw)?;
    Ok(BossInfo {
        rarity: rarity_for_level(boss.level),
        theme: theme_for_name(&boss.name),
        boss,
    })
}

pub fn skill_info(raw: RawSkill) -> Result<SkillInfo> {
    Ok(SkillInfo {
        duration: to_u64("skill duration", raw.duration)?,
        trigger_interval: to_u64("skill trigger interval", raw.trigger_interval)?,
        trigger_attack_count: to_u64("skill trigger attack count", raw.trigger_attack_count)?,
        is_active: raw.is_active,
        activated_time: to_datetime(raw.activated_time)?,
        name: raw.name,
    })
}

pub fn user_stats(raw: RawUserStats) -> Result<UserStats> {
    Ok(UserStats {
        attack_count: to_decimal_string(raw.attack_count),
        total_damage: to_decimal_string(raw.total_damage),
        rank: to_u64("rank", raw.rank)?,
    })
}

pub fn attack_record(raw: RawAttackRecord) -> Result<AttackRecord> {
    Ok(AttackRecord {
        attacker: checksum_address(raw.attacker),
        timestamp: to_datetime(raw.timestamp)?,
        damage: to_decimal_string(raw.damage),
        boss_hp_after: to_decimal_string(raw.boss_hp_after),
        record_type: raw.record_type,
        skill_name: Some(raw.skill_name).filter(|name| !name.is_empty()),
    })
}

pub fn attack_history(raw: RawAttackHistory) -> Result<Vec<HistoricalAttack>> {
    let RawAttackHistory {
        attackers,
        damages,
        timestamps,
    } = raw;
    if attackers.len() != damages.len() || attackers.len() != timestamps.len() {
        return Err(AppError::Internal(format!(
            "attack history arrays disagree: {} attackers, {} damages, {} timestamps",
            attackers.len(),
            damages.len(),
            timestamps.len()
        )));
    }

    attackers
        .into_iter()
        .zip(damages)
        .zip(timestamps)
        .map(|((attacker, damage), timestamp)| {
            Ok(HistoricalAttack {
                attacker: checksum_address(attacker),
                damage: to_decimal_string(damage),
                timestamp: to_datetime(timestamp)?,
            })
        })
        .collect()
}

pub fn attack_receipt(receipt: &TransactionReceipt) -> AttackReceipt {
    AttackReceipt {
        transaction_hash: format!("{:?}", receipt.transaction_hash),
        block_number: receipt.block_number.map(|n| n.as_u64()),
        gas_used: receipt.gas_used.map(to_decimal_string),
        status: receipt.status.map(|s| s.as_u64()),
    }
}
