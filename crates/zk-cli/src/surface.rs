//! Terminal rendering of duel updates.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use colored::Colorize;
use parking_lot::Mutex;

use zk_mechanics::FighterSlot;
use zk_session::{
    DuelEndReason, DuelSurface, DuelUpdate, RosterBoard, RosterView, SurfaceError, UserId,
};

/// Attack verbs rotated through for plain blows.
const VERBS: [&str; 8] = [
    "deals", "inflicts", "strikes for", "delivers", "lands", "brings", "hits for", "unleashes",
];

/// Swallows every update; used when the report goes out machine-readable.
pub struct SilentSurface;

#[async_trait]
impl DuelSurface for SilentSurface {
    async fn render(&self, _update: DuelUpdate) -> Result<(), SurfaceError> {
        Ok(())
    }
}

/// Prints duel narration to stdout.
///
/// Keeps track of the current fight's item labels so blow lines can name
/// the attacker; everything else is a straight translation of the update.
pub struct TerminalSurface {
    challenger: (UserId, String),
    opponent: (UserId, String),
    fighters: Mutex<[String; 2]>,
    blow_count: AtomicUsize,
}

impl TerminalSurface {
    /// Create a surface for the given players, challenger first.
    pub fn new(challenger: (UserId, &str), opponent: (UserId, &str)) -> Self {
        Self {
            challenger: (challenger.0, challenger.1.to_string()),
            opponent: (opponent.0, opponent.1.to_string()),
            fighters: Mutex::new([String::new(), String::new()]),
            blow_count: AtomicUsize::new(0),
        }
    }

    fn player_name(&self, id: Option<UserId>) -> String {
        match id {
            Some(id) if id == self.challenger.0 => self.challenger.1.clone(),
            Some(id) if id == self.opponent.0 => self.opponent.1.clone(),
            Some(id) => format!("user {id}"),
            None => "nobody".to_string(),
        }
    }

    fn print_roster(&self, name: &str, view: &RosterView) {
        let lock = if view.locked {
            " [locked]".green().to_string()
        } else {
            String::new()
        };
        println!("  {}{lock}", format!("{name}'s lineup").bold());
        if view.items.is_empty() {
            println!("    {}", "(no items selected yet)".dimmed());
        }
        for item in &view.items {
            println!("    - {item} {}", item.id.to_string().dimmed());
        }
    }

    fn print_board(&self, board: &RosterBoard) {
        println!();
        self.print_roster(&self.challenger.1, &board.challenger);
        self.print_roster(&self.opponent.1, &board.opponent);
    }
}

#[async_trait]
impl DuelSurface for TerminalSurface {
    async fn render(&self, update: DuelUpdate) -> Result<(), SurfaceError> {
        match update {
            DuelUpdate::Board(board) => self.print_board(&board),
            DuelUpdate::TimeoutWarning { remaining, .. } => {
                let minutes = remaining.as_secs().div_ceil(60);
                println!(
                    "  {}",
                    format!("Duel times out in {minutes} minutes!").yellow().bold()
                );
            }
            DuelUpdate::FightStarted {
                round,
                first,
                second,
                opener,
            } => {
                *self.fighters.lock() = [first.label.clone(), second.label.clone()];
                println!();
                println!("  {}", format!("Round {round}").bold().underline());
                println!("  {first} vs {second}");
                let opener_label = match opener {
                    FighterSlot::First => &first.label,
                    FighterSlot::Second => &second.label,
                };
                println!("  {opener_label} strikes first");
            }
            DuelUpdate::Blow { record, .. } => {
                let attacker = {
                    let fighters = self.fighters.lock();
                    match record.attacker {
                        FighterSlot::First => fighters[0].clone(),
                        FighterSlot::Second => fighters[1].clone(),
                    }
                };
                let hit = if record.crit {
                    format!(
                        "{attacker} lands a CRITICAL HIT for {:.0} damage!",
                        record.damage
                    )
                    .red()
                    .to_string()
                } else {
                    let verb = VERBS[self.blow_count.fetch_add(1, Ordering::Relaxed) % VERBS.len()];
                    format!("{attacker} {verb} {:.0} damage", record.damage)
                };
                let mitigated = if record.mitigation > 0.0 {
                    format!(" (mitigated {:.0}%)", record.mitigation * 100.0)
                } else {
                    String::new()
                };
                println!(
                    "  {hit}{mitigated}, {:.0} HP left",
                    record.defender_hp_display()
                );
            }
            DuelUpdate::FightResolved {
                round,
                winner,
                score,
            } => {
                let result = match winner {
                    Some(_) => format!("{} takes the round", self.player_name(winner)),
                    None => "a draw".to_string(),
                };
                println!("  {} {result}", format!("Round {round}:").bold());
                println!(
                    "  Score: {} {} - {} {}",
                    self.challenger.1, score.challenger, score.opponent, self.opponent.1
                );
            }
            DuelUpdate::Finished(report) => {
                println!();
                let line = match report.reason {
                    DuelEndReason::Fought => match report.winner {
                        Some(_) => format!("{} wins the duel!", self.player_name(report.winner))
                            .green()
                            .bold()
                            .to_string(),
                        None => "Both sides are evenly matched; the duel is a draw."
                            .yellow()
                            .to_string(),
                    },
                    DuelEndReason::Forfeit => {
                        format!("{} wins unopposed!", self.player_name(report.winner))
                            .green()
                            .to_string()
                    }
                    DuelEndReason::Voided => "Neither side fielded any items; the duel is void."
                        .yellow()
                        .to_string(),
                    DuelEndReason::Timeout => match report.winner {
                        Some(_) => format!(
                            "Duel timed out; {} wins by default.",
                            self.player_name(report.winner)
                        )
                        .yellow()
                        .to_string(),
                        None => "Duel timed out with no selections; cancelled."
                            .yellow()
                            .to_string(),
                    },
                    DuelEndReason::Cancelled => "Duel cancelled.".red().to_string(),
                };
                println!("  {line}");
            }
        }
        Ok(())
    }
}
