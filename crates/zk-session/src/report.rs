//! Final duel reports delivered to collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use zk_mechanics::{FightOutcome, Item};

use crate::participant::UserId;

/// Round-win tally for both sides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Rounds won by the challenger.
    pub challenger: u32,
    /// Rounds won by the opponent.
    pub opponent: u32,
}

/// One fought slot: the paired items and the resolved outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 1-based round number.
    pub round: u32,
    /// The challenger's item in this slot.
    pub challenger_item: Item,
    /// The opponent's item in this slot.
    pub opponent_item: Item,
    /// Blow-by-blow outcome of the fight.
    pub outcome: FightOutcome,
    /// Identity credited with the round, if any.
    pub winner: Option<UserId>,
}

/// How a duel reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelEndReason {
    /// Both sides locked and all paired slots were fought.
    Fought,
    /// One side locked in an empty proposal; the other wins unopposed.
    Forfeit,
    /// Both proposals were empty; nobody wins.
    Voided,
    /// The selection window expired.
    Timeout,
    /// A participant cancelled before commencement.
    Cancelled,
}

/// The final word on a duel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelReport {
    /// The winning identity, or `None` on a draw, void, or cancellation.
    pub winner: Option<UserId>,
    /// Every fought round in order.
    pub rounds: Vec<RoundRecord>,
    /// Final round-win tally.
    pub score: Score,
    /// Why the duel ended.
    pub reason: DuelEndReason,
    /// When the duel was opened.
    pub started_at: DateTime<Utc>,
    /// When the duel reached its terminal state.
    pub ended_at: DateTime<Utc>,
}

impl DuelReport {
    /// Returns true when the duel produced no winner.
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_round_trips_through_json() {
        let report = DuelReport {
            winner: Some(UserId(7)),
            rounds: Vec::new(),
            score: Score {
                challenger: 2,
                opponent: 1,
            },
            reason: DuelEndReason::Fought,
            started_at: Utc::now(),
            ended_at: Utc::now(),
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: DuelReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
        assert!(!back.is_draw());
    }
}
