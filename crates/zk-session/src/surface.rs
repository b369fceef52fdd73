//! The external render sink a session reports into.
//!
//! The engine never talks to a chat platform or a terminal directly; it
//! hands [`DuelUpdate`] values to a [`DuelSurface`] and lets the
//! implementation decide how they look. Surfaces are expected to be
//! idempotent "show the current state" sinks, like a repeatedly edited
//! pinned message.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use zk_mechanics::{AttackRecord, FighterSlot, Item};

use crate::participant::{Participant, UserId};
use crate::report::{DuelReport, Score};

/// Errors a surface can produce.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// The render target no longer exists or refuses updates; terminal for
    /// the session.
    #[error("render surface is gone")]
    Gone,

    /// A temporary failure; the caller may retry later.
    #[error("transient render failure: {0}")]
    Transient(String),
}

/// Snapshot of one roster for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterView {
    /// The roster owner.
    pub identity: UserId,
    /// Whether the owner has locked in.
    pub locked: bool,
    /// The proposed items, in selection order.
    pub items: Vec<Item>,
}

impl RosterView {
    pub(crate) fn of(participant: &Participant) -> Self {
        Self {
            identity: participant.identity(),
            locked: participant.locked(),
            items: participant.proposal().to_vec(),
        }
    }
}

/// Both rosters as shown on the shared board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterBoard {
    /// The challenger's roster.
    pub challenger: RosterView,
    /// The opponent's roster.
    pub opponent: RosterView,
}

/// One narration step handed to the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DuelUpdate {
    /// Steady-state re-render of the current rosters.
    Board(RosterBoard),

    /// One-shot warning that the duel will time out soon.
    TimeoutWarning {
        /// Current board.
        board: RosterBoard,
        /// Time left until timeout.
        remaining: Duration,
    },

    /// A fight between one paired slot is starting.
    FightStarted {
        /// 1-based round number.
        round: u32,
        /// The challenger's item.
        first: Item,
        /// The opponent's item.
        second: Item,
        /// Who strikes first.
        opener: FighterSlot,
    },

    /// One blow landed.
    Blow {
        /// 1-based round number.
        round: u32,
        /// The blow, with exact damage, crit, and mitigation numbers.
        record: AttackRecord,
    },

    /// A fight resolved, with the running score.
    FightResolved {
        /// 1-based round number.
        round: u32,
        /// Identity credited with the round, if any.
        winner: Option<UserId>,
        /// Round wins so far.
        score: Score,
    },

    /// The duel reached a terminal state.
    Finished(
        /// The final report.
        DuelReport,
    ),
}

/// An idempotent "render the current duel state" sink.
#[async_trait]
pub trait DuelSurface: Send + Sync {
    /// Render one update.
    async fn render(&self, update: DuelUpdate) -> Result<(), SurfaceError>;
}
