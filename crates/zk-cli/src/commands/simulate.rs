//! Run a complete duel between two generated rosters.

use std::sync::Arc;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use zk_mechanics::{Item, ItemId};
use zk_session::{DuelConfig, DuelSurface, SessionRegistry, SpaceId, UserId};

use crate::surface::{SilentSurface, TerminalSurface};

const SPACE: SpaceId = SpaceId(1);
const CHALLENGER: UserId = UserId(1);
const OPPONENT: UserId = UserId(2);
const CHALLENGER_NAME: &str = "Anton";
const OPPONENT_NAME: &str = "Bruno";

const LABELS: [&str; 12] = [
    "Rusty Saber",
    "Oaken Buckler",
    "Iron Maul",
    "Gloomfang",
    "Sunforged Lance",
    "Wolfhide Cloak",
    "Runed Falchion",
    "Stormcaller",
    "Bramble Crown",
    "Quicksilver Dirk",
    "Warded Pavise",
    "Ember Talisman",
];

pub async fn run(seed: u64, roster: usize, paced: bool, json: bool) -> Result<(), String> {
    let mut config = DuelConfig::default().with_seed(seed);
    let max_roster = config.max_roster.min(roster.max(1));
    config = config.with_max_roster(max_roster);
    if !paced {
        config = config.without_pacing();
    }

    let registry = SessionRegistry::new(config);
    let surface: Arc<dyn DuelSurface> = if json {
        Arc::new(SilentSurface)
    } else {
        Arc::new(TerminalSurface::new(
            (CHALLENGER, CHALLENGER_NAME),
            (OPPONENT, OPPONENT_NAME),
        ))
    };
    let session = registry
        .create(SPACE, CHALLENGER, OPPONENT, surface)
        .await
        .map_err(|e| e.to_string())?;

    // Item stats come from the same seed as the duel, so a given seed
    // reproduces the entire run.
    let mut rng = StdRng::seed_from_u64(seed);
    let armory_a = generate_armory(&mut rng, 0);
    let armory_b = generate_armory(&mut rng, 100);

    session
        .fill_strongest(CHALLENGER, &armory_a)
        .await
        .map_err(|e| e.to_string())?;
    session
        .fill_random(OPPONENT, &armory_b)
        .await
        .map_err(|e| e.to_string())?;

    let mut outcome = session.subscribe_outcome();
    session
        .lock(CHALLENGER)
        .await
        .map_err(|e| e.to_string())?;
    session.lock(OPPONENT).await.map_err(|e| e.to_string())?;

    let report = outcome
        .borrow_and_update()
        .clone()
        .ok_or("duel produced no report")?;

    if json {
        let rendered = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{rendered}");
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        "Duel summary".bold(),
        format!("(seed={seed})").dimmed()
    );
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Round", CHALLENGER_NAME, OPPONENT_NAME, "Winner"]);
    for round in &report.rounds {
        let winner = match round.winner {
            Some(id) if id == CHALLENGER => CHALLENGER_NAME,
            Some(_) => OPPONENT_NAME,
            None => "draw",
        };
        table.add_row(vec![
            round.round.to_string(),
            round.challenger_item.to_string(),
            round.opponent_item.to_string(),
            winner.to_string(),
        ]);
    }
    println!("{table}");
    println!(
        "  Score: {CHALLENGER_NAME} {} - {} {OPPONENT_NAME}",
        report.score.challenger, report.score.opponent
    );

    Ok(())
}

fn generate_armory(rng: &mut StdRng, id_offset: u64) -> Vec<Item> {
    LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| {
            Item::new(
                ItemId(id_offset + i as u64 + 1),
                *label,
                rng.random_range(5..=30),
                rng.random_range(20..=80),
            )
        })
        .collect()
}
