use ethers::types::{Address, U256};
use futures_util::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;

use crate::{
    constants::DEFAULT_RANKING_FETCH_CONCURRENCY,
    error::{AppError, Result},
    models::{Leaderboard, RankEntry},
    services::{normalizer, onchain::BossChain},
};

/// Ranking Aggregator - per-boss damage leaderboard built from participant stats
pub struct RankingAggregator {
    chain: Arc<dyn BossChain>,
    fetch_concurrency: usize,
}

struct ParticipantDamage {
    address: Address,
    total_damage: U256,
}

impl RankingAggregator {
    pub fn new(chain: Arc<dyn BossChain>) -> Self {
        Self {
            chain,
            fetch_concurrency: DEFAULT_RANKING_FETCH_CONCURRENCY,
        }
    }

    /// Number of stat lookups allowed in flight; 1 keeps them sequential.
    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency.max(1);
        self
    }

    /// Top `limit` participants by cumulative damage, highest first.
    pub async fn top_damage(&self, boss_id: U256, limit: usize) -> Result<Vec<RankEntry>> {
        Ok(self.leaderboard(boss_id, limit).await?.entries)
    }

    pub async fn leaderboard(&self, boss_id: U256, limit: usize) -> Result<Leaderboard> {
        let participants = self
            .chain
            .all_participants(boss_id)
            .await
            .map_err(AppError::query_failed)?;

        let total_participants = participants.len();
        if participants.is_empty() {
            tracing::debug!(%boss_id, "No participants for boss");
            return Ok(Leaderboard {
                boss_id: boss_id.to_string(),
                total_participants,
                entries: Vec::new(),
            });
        }

        let damages = self.fetch_damages(boss_id, participants).await?;
        let entries = rank_by_damage(damages, limit);

        tracing::info!(
            %boss_id,
            participants = total_participants,
            ranked = entries.len(),
            "Leaderboard computed"
        );

        Ok(Leaderboard {
            boss_id: boss_id.to_string(),
            total_participants,
            entries,
        })
    }

    // `buffered` yields in input order, so the result matches enumeration order
    // whatever the concurrency.
    async fn fetch_damages(
        &self,
        boss_id: U256,
        participants: Vec<Address>,
    ) -> Result<Vec<ParticipantDamage>> {
        stream::iter(participants)
            .map(|address| {
                let chain = self.chain.clone();
                async move {
                    let stats = chain
                        .boss_user_stats(boss_id, address)
                        .await
                        .map_err(AppError::query_failed)?;
                    Ok::<_, AppError>(ParticipantDamage {
                        address,
                        total_damage: stats.total_damage,
                    })
                }
            })
            .buffered(self.fetch_concurrency)
            .try_collect()
            .await
    }
}

// Stable sort: ties keep participant enumeration order.
fn rank_by_damage(mut damages: Vec<ParticipantDamage>, limit: usize) -> Vec<RankEntry> {
    damages.sort_by(|a, b| b.total_damage.cmp(&a.total_damage));
    damages
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, entry)| RankEntry {
            rank: index + 1,
            address: normalizer::checksum_address(entry.address),
            total_damage: normalizer::to_decimal_string(entry.total_damage),
        })
        .collect()
}
