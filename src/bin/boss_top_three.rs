use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use world_boss_client::{
    constants::LEADERBOARD_SIZE,
    models::Leaderboard,
    services::{onchain::parse_boss_id, EthersChain, RankingAggregator},
    Config,
};

fn place(rank: usize) -> (&'static str, String) {
    match rank {
        1 => ("🥇", "1st Place".to_string()),
        2 => ("🥈", "2nd Place".to_string()),
        3 => ("🥉", "3rd Place".to_string()),
        n => ("🏅", format!("{n}th Place")),
    }
}

fn render_leaderboard(board: &Leaderboard) -> String {
    let mut out = format!("🏆 Top {LEADERBOARD_SIZE} Damage Dealers:\n\n");
    for entry in &board.entries {
        let (medal, label) = place(entry.rank);
        out.push_str(&format!(
            "{medal} {label}:\n   Address: {}\n   Damage: {}\n\n",
            entry.address, entry.total_damage
        ));
    }
    out.push_str("📋 Summary:\n");
    out.push_str(&format!("   Boss ID: {}\n", board.boss_id));
    out.push_str(&format!(
        "   Total Participants: {}\n",
        board.total_participants
    ));
    out.push_str(&format!(
        "   Top {LEADERBOARD_SIZE} Rankings Generated: {}\n",
        board.entries.len()
    ));
    out
}

/// Everything printed after the query succeeds.
fn render_report(board: &Leaderboard) -> String {
    if board.total_participants == 0 {
        return "ℹ️  No participants found.\n".to_string();
    }
    format!("{}\n=== Ranking Complete ===\n", render_leaderboard(board))
}

async fn run(boss_id_arg: &str) -> Result<(), String> {
    let boss_id = parse_boss_id(boss_id_arg).map_err(|e| e.to_string())?;

    let config = Config::from_env().map_err(|e| format!("Error loading configuration: {e}"))?;
    config
        .validate()
        .map_err(|e| format!("Error loading configuration: {e}"))?;
    let deployment = config
        .load_deployment()
        .map_err(|e| format!("Error loading contract addresses: {e}"))?;

    let chain = EthersChain::read_only(&deployment)
        .map_err(|e| format!("Error connecting to network: {e}"))?;
    let ranking = RankingAggregator::new(Arc::new(chain))
        .with_fetch_concurrency(config.ranking_fetch_concurrency);

    let board = ranking
        .leaderboard(boss_id, LEADERBOARD_SIZE)
        .await
        .map_err(|e| format!("Error getting rankings: {e}"))?;

    print!("{}", render_report(&board));
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "world_boss_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    println!("=== Boss Damage Ranking - Top {LEADERBOARD_SIZE} ===\n");

    let args: Vec<String> = std::env::args().collect();
    let Some(boss_id) = args.get(1) else {
        eprintln!("❌ Usage: boss_top_three <bossId>");
        eprintln!("Example: boss_top_three 0");
        std::process::exit(1);
    };

    println!("📋 Querying top {LEADERBOARD_SIZE} for Boss ID: {boss_id}\n");

    if let Err(err) = run(boss_id).await {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
