//! Error types for duel sessions and the session registry.

use zk_mechanics::ItemId;

use crate::participant::UserId;

/// Alias for `Result<T, DuelError>`.
pub type DuelResult<T> = Result<T, DuelError>;

/// Errors that can occur while managing a duel.
#[derive(Debug, thiserror::Error)]
pub enum DuelError {
    /// The space already hosts a duel, or a challenger is fighting elsewhere.
    #[error("duel already active: {0}")]
    AlreadyActive(String),

    /// Both sides of a duel must be distinct identities.
    #[error("cannot open a duel against yourself")]
    SelfChallenge,

    /// The identity is not one of the two participants.
    #[error("user {0} is not part of this duel")]
    NotParticipant(UserId),

    /// Roster edits are rejected once the owner has locked in.
    #[error("selection is locked and cannot be updated")]
    Locked,

    /// Lock was requested a second time.
    #[error("selection is already locked")]
    AlreadyLocked,

    /// The item is already part of the proposal.
    #[error("item {0} is already in the roster")]
    Duplicate(ItemId),

    /// The item is not part of the proposal.
    #[error("item {0} is not in the roster")]
    NotPresent(ItemId),

    /// The proposal has reached its maximum size.
    #[error("roster already holds the maximum of {0} items")]
    RosterFull(usize),

    /// A fill operation found nothing eligible to add.
    #[error("no eligible items left to add")]
    NothingToAdd,

    /// The request arrived after the duel already commenced or finished.
    #[error("the duel has already commenced")]
    AlreadyCommenced,

    /// The external render target is permanently gone.
    #[error("render surface is gone")]
    SurfaceGone,
}
