//! Duel session engine for Zweikampf.
//!
//! Two participants in a shared space assemble rosters of owned items and
//! fight a scripted, randomized, multi-round duel that resolves
//! automatically once both sides commit. This crate owns the session life
//! cycle: the per-space [`SessionRegistry`], the roster-proposal state
//! machine with one-way locking, the background refresh/timeout task, and
//! the orchestration of sequential rounds on top of the `zk-mechanics`
//! fight resolver.
//!
//! Rendering is delegated to a [`DuelSurface`] implementation; item
//! ownership and identity display stay with the caller.

pub mod config;
pub mod error;
pub mod participant;
pub mod registry;
pub mod report;
pub mod session;
pub mod surface;

mod refresh;

#[cfg(test)]
mod test_surface;

pub use config::DuelConfig;
pub use error::{DuelError, DuelResult};
pub use participant::{Participant, UserId};
pub use registry::{SessionRegistry, SpaceId};
pub use report::{DuelEndReason, DuelReport, RoundRecord, Score};
pub use session::{DuelSession, DuelState, LockOutcome};
pub use surface::{DuelSurface, DuelUpdate, RosterBoard, RosterView, SurfaceError};
