//! Duel session state machine and round orchestration.
//!
//! A [`DuelSession`] owns two participants and drives the whole life of a
//! duel: roster editing while `Open`, the one-way lock transitions, the
//! `Commencing` hand-off that runs the paired fights in order, and the
//! terminal states. A background refresh task (see [`crate::refresh`])
//! re-renders the board and enforces the selection timeout; it is stopped
//! before the rounds start and whenever the session leaves the registry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use zk_mechanics::{FighterSlot, Item, ItemId, resolve_fight};

use crate::config::DuelConfig;
use crate::error::{DuelError, DuelResult};
use crate::participant::{Participant, UserId};
use crate::registry::{SessionRegistry, SpaceId};
use crate::report::{DuelEndReason, DuelReport, RoundRecord, Score};
use crate::surface::{DuelSurface, DuelUpdate, RosterBoard, RosterView, SurfaceError};

/// Lifecycle of a duel session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelState {
    /// Rosters are editable; neither or one side has locked.
    Open,
    /// Both sides locked; rounds are running to completion.
    Commencing,
    /// All rounds resolved and the report was delivered.
    Finished,
    /// Cancelled or timed out before commencement.
    Cancelled,
}

/// What a successful lock call led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// Waiting for the other side to lock.
    Waiting,
    /// Both sides locked; the duel ran to completion.
    Commenced,
}

/// Mutable session state, only ever touched inside short lock scopes.
struct SessionCore {
    challenger: Participant,
    opponent: Participant,
    state: DuelState,
}

impl SessionCore {
    fn which(&self, identity: UserId) -> Option<&Participant> {
        if self.challenger.identity() == identity {
            Some(&self.challenger)
        } else if self.opponent.identity() == identity {
            Some(&self.opponent)
        } else {
            None
        }
    }

    fn which_mut(&mut self, identity: UserId) -> Option<&mut Participant> {
        if self.challenger.identity() == identity {
            Some(&mut self.challenger)
        } else if self.opponent.identity() == identity {
            Some(&mut self.opponent)
        } else {
            None
        }
    }

    fn both_locked(&self) -> bool {
        self.challenger.locked() && self.opponent.locked()
    }

    fn board(&self) -> RosterBoard {
        RosterBoard {
            challenger: RosterView::of(&self.challenger),
            opponent: RosterView::of(&self.opponent),
        }
    }
}

/// How the rounds will play out once both sides lock.
enum CommencePlan {
    /// At least one proposal was empty; no rounds are fought.
    ShortCircuit {
        winner: Option<UserId>,
        reason: DuelEndReason,
    },
    /// Fight the index-paired slots in order.
    Rounds {
        pairs: Vec<(Item, Item)>,
        challenger: UserId,
        opponent: UserId,
    },
}

/// An active duel between two participants in one space.
pub struct DuelSession {
    space: SpaceId,
    config: DuelConfig,
    surface: Arc<dyn DuelSurface>,
    registry: Weak<SessionRegistry>,
    core: Mutex<SessionCore>,
    rng: Mutex<StdRng>,
    cancel: CancellationToken,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
    surface_lost: AtomicBool,
    surface_established: AtomicBool,
    outcome: watch::Sender<Option<DuelReport>>,
    started_at: Instant,
    opened_at: DateTime<Utc>,
}

impl std::fmt::Debug for DuelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuelSession")
            .field("space", &self.space)
            .field("opened_at", &self.opened_at)
            .finish_non_exhaustive()
    }
}

impl DuelSession {
    pub(crate) fn new(
        space: SpaceId,
        challenger: UserId,
        opponent: UserId,
        config: DuelConfig,
        surface: Arc<dyn DuelSurface>,
        registry: Weak<SessionRegistry>,
    ) -> Arc<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (outcome, _) = watch::channel(None);
        Arc::new(Self {
            core: Mutex::new(SessionCore {
                challenger: Participant::new(challenger, config.max_roster),
                opponent: Participant::new(opponent, config.max_roster),
                state: DuelState::Open,
            }),
            space,
            config,
            surface,
            registry,
            rng: Mutex::new(rng),
            cancel: CancellationToken::new(),
            refresh_task: Mutex::new(None),
            surface_lost: AtomicBool::new(false),
            surface_established: AtomicBool::new(false),
            outcome,
            started_at: Instant::now(),
            opened_at: Utc::now(),
        })
    }

    /// The space this duel runs in.
    pub fn space(&self) -> SpaceId {
        self.space
    }

    /// The session configuration.
    pub fn config(&self) -> &DuelConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DuelState {
        self.core.lock().state
    }

    /// When the duel was opened.
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Both participant identities, challenger first.
    pub fn participants(&self) -> (UserId, UserId) {
        let core = self.core.lock();
        (core.challenger.identity(), core.opponent.identity())
    }

    /// Whether the identity is one of the two participants.
    pub fn is_participant(&self, identity: UserId) -> bool {
        self.core.lock().which(identity).is_some()
    }

    /// Snapshot of both rosters.
    pub fn board(&self) -> RosterBoard {
        self.core.lock().board()
    }

    /// Subscribe to the final report; holds `None` until the duel ends.
    pub fn subscribe_outcome(&self) -> watch::Receiver<Option<DuelReport>> {
        self.outcome.subscribe()
    }

    /// Add a single item to the caller's roster and re-render the board.
    pub async fn add_item(&self, identity: UserId, item: Item) -> DuelResult<()> {
        {
            let mut core = self.core.lock();
            core.which_mut(identity)
                .ok_or(DuelError::NotParticipant(identity))?
                .add(item)?;
        }
        self.render_board().await;
        Ok(())
    }

    /// Remove an item from the caller's roster and re-render the board.
    pub async fn remove_item(&self, identity: UserId, id: ItemId) -> DuelResult<Item> {
        let removed = {
            let mut core = self.core.lock();
            core.which_mut(identity)
                .ok_or(DuelError::NotParticipant(identity))?
                .remove(id)?
        };
        self.render_board().await;
        Ok(removed)
    }

    /// Fill the caller's remaining slots with a random sample from
    /// `candidates`. Returns the items added.
    pub async fn fill_random(&self, identity: UserId, candidates: &[Item]) -> DuelResult<Vec<Item>> {
        let added = {
            let mut core = self.core.lock();
            let participant = core
                .which_mut(identity)
                .ok_or(DuelError::NotParticipant(identity))?;
            let mut rng = self.rng.lock();
            participant.fill_random(candidates, &mut rng)?
        };
        self.render_board().await;
        Ok(added)
    }

    /// Fill the caller's remaining slots with the strongest candidates.
    /// Returns the items added.
    pub async fn fill_strongest(
        &self,
        identity: UserId,
        candidates: &[Item],
    ) -> DuelResult<Vec<Item>> {
        let added = {
            let mut core = self.core.lock();
            core.which_mut(identity)
                .ok_or(DuelError::NotParticipant(identity))?
                .fill_strongest(candidates)?
        };
        self.render_board().await;
        Ok(added)
    }

    /// Lock the caller's roster.
    ///
    /// When this call locks the second side, the session transitions to
    /// `Commencing` in the same non-suspending step and the rounds run to
    /// completion before the call returns. The transition happens exactly
    /// once even when both sides lock concurrently.
    pub async fn lock(&self, identity: UserId) -> DuelResult<LockOutcome> {
        let commence = {
            let mut core = self.core.lock();
            core.which_mut(identity)
                .ok_or(DuelError::NotParticipant(identity))?
                .lock()?;
            if core.both_locked() && core.state == DuelState::Open {
                core.state = DuelState::Commencing;
                true
            } else {
                false
            }
        };
        self.render_board().await;
        if commence {
            self.commence().await;
            Ok(LockOutcome::Commenced)
        } else {
            Ok(LockOutcome::Waiting)
        }
    }

    /// Cancel the duel before it commences.
    ///
    /// Stops the background task first, so a cancelled session can never
    /// re-render stale state afterwards. Cancelling an already-cancelled
    /// duel is a no-op; cancelling once the rounds started fails with
    /// [`DuelError::AlreadyCommenced`].
    pub async fn cancel(&self, identity: UserId) -> DuelResult<()> {
        {
            let core = self.core.lock();
            core.which(identity)
                .ok_or(DuelError::NotParticipant(identity))?;
            match core.state {
                DuelState::Open => {}
                DuelState::Cancelled => return Ok(()),
                DuelState::Commencing | DuelState::Finished => {
                    return Err(DuelError::AlreadyCommenced);
                }
            }
        }
        self.stop_refresh().await;
        let proceed = {
            let mut core = self.core.lock();
            if core.state == DuelState::Open {
                core.state = DuelState::Cancelled;
                true
            } else {
                false
            }
        };
        if proceed {
            info!(space = %self.space, by = %identity, "duel cancelled");
            self.conclude(None, Vec::new(), Score::default(), DuelEndReason::Cancelled)
                .await;
        }
        Ok(())
    }

    /// Run the duel after both sides locked.
    async fn commence(&self) {
        self.stop_refresh().await;
        info!(space = %self.space, "both sides locked; duel commencing");

        let plan = {
            let core = self.core.lock();
            let challenger = core.challenger.identity();
            let opponent = core.opponent.identity();
            let first = core.challenger.proposal();
            let second = core.opponent.proposal();
            match (first.is_empty(), second.is_empty()) {
                (true, true) => CommencePlan::ShortCircuit {
                    winner: None,
                    reason: DuelEndReason::Voided,
                },
                (true, false) => CommencePlan::ShortCircuit {
                    winner: Some(opponent),
                    reason: DuelEndReason::Forfeit,
                },
                (false, true) => CommencePlan::ShortCircuit {
                    winner: Some(challenger),
                    reason: DuelEndReason::Forfeit,
                },
                (false, false) => CommencePlan::Rounds {
                    pairs: first
                        .iter()
                        .cloned()
                        .zip(second.iter().cloned())
                        .collect(),
                    challenger,
                    opponent,
                },
            }
        };

        match plan {
            CommencePlan::ShortCircuit { winner, reason } => {
                self.set_state(DuelState::Finished);
                self.conclude(winner, Vec::new(), Score::default(), reason)
                    .await;
            }
            CommencePlan::Rounds {
                pairs,
                challenger,
                opponent,
            } => {
                let mut rounds = Vec::with_capacity(pairs.len());
                let mut score = Score::default();
                for (i, (first, second)) in pairs.into_iter().enumerate() {
                    let round = (i + 1) as u32;
                    let outcome = {
                        let mut rng = self.rng.lock();
                        resolve_fight(&first, &second, &mut *rng)
                    };
                    let winner = outcome.winner.map(|slot| match slot {
                        FighterSlot::First => challenger,
                        FighterSlot::Second => opponent,
                    });
                    match outcome.winner {
                        Some(FighterSlot::First) => score.challenger += 1,
                        Some(FighterSlot::Second) => score.opponent += 1,
                        None => {}
                    }

                    self.narrate(DuelUpdate::FightStarted {
                        round,
                        first: first.clone(),
                        second: second.clone(),
                        opener: outcome.opener,
                    })
                    .await;
                    self.pause(self.config.intro_pause).await;
                    for record in &outcome.blows {
                        self.narrate(DuelUpdate::Blow {
                            round,
                            record: record.clone(),
                        })
                        .await;
                        self.pause(self.config.blow_pause).await;
                    }
                    self.narrate(DuelUpdate::FightResolved {
                        round,
                        winner,
                        score,
                    })
                    .await;
                    self.pause(self.config.round_pause).await;

                    rounds.push(RoundRecord {
                        round,
                        challenger_item: first,
                        opponent_item: second,
                        outcome,
                        winner,
                    });
                }

                let winner = if score.challenger > score.opponent {
                    Some(challenger)
                } else if score.opponent > score.challenger {
                    Some(opponent)
                } else {
                    None
                };
                self.set_state(DuelState::Finished);
                self.conclude(winner, rounds, score, DuelEndReason::Fought)
                    .await;
            }
        }
    }

    /// Resolve the selection timeout; called by the refresh task.
    ///
    /// A no-op unless the session is still `Open` (the both-locked
    /// transition owns it otherwise).
    pub(crate) async fn resolve_timeout(&self) {
        let winner = {
            let mut core = self.core.lock();
            if core.state != DuelState::Open {
                return;
            }
            core.state = DuelState::Cancelled;
            match (core.challenger.locked(), core.opponent.locked()) {
                (true, false) => Some(core.challenger.identity()),
                (false, true) => Some(core.opponent.identity()),
                _ => None,
            }
        };
        info!(space = %self.space, ?winner, "duel timed out");
        self.conclude(winner, Vec::new(), Score::default(), DuelEndReason::Timeout)
            .await;
    }

    /// Deliver the final render and report, then leave the registry.
    async fn conclude(
        &self,
        winner: Option<UserId>,
        rounds: Vec<RoundRecord>,
        score: Score,
        reason: DuelEndReason,
    ) {
        let report = DuelReport {
            winner,
            rounds,
            score,
            reason,
            started_at: self.opened_at,
            ended_at: Utc::now(),
        };
        self.narrate(DuelUpdate::Finished(report.clone())).await;
        let _ = self.outcome.send_replace(Some(report));
        self.deregister();
        info!(space = %self.space, ?winner, ?reason, "duel concluded");
    }

    fn set_state(&self, state: DuelState) {
        self.core.lock().state = state;
    }

    fn deregister(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.space);
        }
    }

    /// Render an update, tracking surface loss. Fails with `Gone` exactly
    /// once the surface is known to be dead.
    pub(crate) async fn render(&self, update: DuelUpdate) -> Result<(), SurfaceError> {
        if self.surface_lost() {
            return Err(SurfaceError::Gone);
        }
        match self.surface.render(update).await {
            Ok(()) => {
                self.surface_established.store(true, Ordering::Relaxed);
                Ok(())
            }
            Err(SurfaceError::Gone) => {
                self.surface_lost.store(true, Ordering::Relaxed);
                Err(SurfaceError::Gone)
            }
            Err(err) => Err(err),
        }
    }

    /// Render, logging failures instead of propagating them.
    async fn narrate(&self, update: DuelUpdate) {
        match self.render(update).await {
            Ok(()) => {}
            Err(SurfaceError::Gone) => {
                debug!(space = %self.space, "surface gone mid-narration");
            }
            Err(SurfaceError::Transient(reason)) => {
                warn!(space = %self.space, %reason, "narration render failed");
            }
        }
    }

    async fn render_board(&self) {
        let board = self.core.lock().board();
        self.narrate(DuelUpdate::Board(board)).await;
    }

    /// First render after creation. Only a dead surface is fatal; a
    /// transient failure is left to the refresh task to repair.
    pub(crate) async fn render_initial(&self) -> Result<(), SurfaceError> {
        let board = self.core.lock().board();
        match self.render(DuelUpdate::Board(board)).await {
            Ok(()) => Ok(()),
            Err(SurfaceError::Gone) => Err(SurfaceError::Gone),
            Err(SurfaceError::Transient(reason)) => {
                warn!(space = %self.space, %reason, "initial render failed; refresh will retry");
                Ok(())
            }
        }
    }

    /// Steady-state board render for the refresh task.
    pub(crate) async fn render_refresh(&self) -> Result<(), SurfaceError> {
        let board = self.core.lock().board();
        self.render(DuelUpdate::Board(board)).await
    }

    /// One-shot timeout warning render for the refresh task.
    pub(crate) async fn render_warning(&self, remaining: Duration) {
        let board = self.core.lock().board();
        self.narrate(DuelUpdate::TimeoutWarning { board, remaining })
            .await;
    }

    /// Skip pacing once the surface is gone; nobody is watching.
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() && !self.surface_lost() {
            tokio::time::sleep(duration).await;
        }
    }

    /// Cancel the refresh task and wait for it to finish.
    async fn stop_refresh(&self) {
        self.cancel.cancel();
        let handle = self.refresh_task.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(space = %self.space, %err, "refresh task ended abnormally");
            }
        }
    }

    pub(crate) fn set_refresh_task(&self, handle: JoinHandle<()>) {
        *self.refresh_task.lock() = Some(handle);
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub(crate) fn surface_lost(&self) -> bool {
        self.surface_lost.load(Ordering::Relaxed)
    }

    pub(crate) fn surface_established(&self) -> bool {
        self.surface_established.load(Ordering::Relaxed)
    }
}
