//! Chicken Road Game Server
//!
//! Demo binary: plays one provably fair round against the in-process
//! service, then reveals and audits it.

use std::sync::Arc;

use anyhow::Context;
use rand::Rng;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use chicken_road::{
    game::payout::{difficulty, multiplier_table, win_probability},
    GameConfig, GameService, GameStatus, GameTable, VERSION,
};

/// Cash out once this many steps survive.
const TARGET_STEPS: u8 = 3;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Chicken Road Server v{}", VERSION);

    let config = GameConfig::default();
    info!(
        rows = config.row_count,
        cells = ?(config.min_cell_count..=config.max_cell_count),
        policy = ?config.policy,
        "table configuration"
    );

    for cell_count in config.min_cell_count..=config.max_cell_count {
        info!(
            cell_count,
            difficulty = ?difficulty(cell_count),
            step_win_probability = win_probability(cell_count),
            multipliers = ?multiplier_table(cell_count, config.row_count),
            "payout curve"
        );
    }

    let service = Arc::new(GameService::new(config));
    let mut table = GameTable::new(service);

    demo_round(&mut table).await?;

    Ok(())
}

/// Play one honest round: random cell picks, cash out at the target.
async fn demo_round(table: &mut GameTable) -> anyhow::Result<()> {
    info!("=== Starting Demo Round ===");
    info!(balance = table.balance(), "initial balance");

    let cell_count = 3u8;
    let snapshot = table.start_round(100.0, cell_count, None).await?;
    info!(
        id = %snapshot.id,
        commitment = %snapshot.server_seed_hash,
        client_seed = %snapshot.client_seed,
        nonce = snapshot.nonce,
        "round started; commitment published before play"
    );

    loop {
        let choice = rand::thread_rng().gen_range(0..cell_count);
        let result = table.step(Some(choice)).await?;
        let steps_completed = table
            .active_round()
            .map(|round| round.steps_completed)
            .unwrap_or(0);
        info!(
            choice,
            success = result.success,
            evidence = ?result.evidence,
            multiplier = result.new_multiplier,
            potential_win = result.potential_win,
            "step played"
        );

        if !result.success {
            info!(balance = table.balance(), "hit the hazard; bet is gone");
            break;
        }
        if steps_completed >= TARGET_STEPS {
            let cashout = table.cash_out().await?;
            info!(
                amount = cashout.amount,
                multiplier = cashout.final_multiplier,
                balance = table.balance(),
                "cashed out"
            );
            break;
        }
    }

    info!("=== Revealing and Auditing ===");
    let data = table.verification_data().await?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    if data.is_valid {
        info!("FAIRNESS VERIFIED: revealed seed reproduces the round");
    } else {
        info!("FAIRNESS FAILURE: outcome does not match the reveal");
    }

    if let Some(entry) = table.history().front() {
        info!(
            result = ?entry.result,
            payout = entry.payout,
            steps = entry.steps,
            "history recorded"
        );
    }

    table.reset().ok();
    debug_assert_eq!(table.status(), GameStatus::Idle);

    Ok(())
}
