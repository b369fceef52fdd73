//! Process-wide registry of active duels.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DuelConfig;
use crate::error::{DuelError, DuelResult};
use crate::participant::UserId;
use crate::refresh;
use crate::session::DuelSession;
use crate::surface::{DuelSurface, SurfaceError};

/// Identifier of one shared space (a channel, guild, or room). Each space
/// hosts at most one active duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpaceId(pub u64);

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry mapping each space to its single active duel.
///
/// Injected into command handlers rather than living as a global; holds the
/// only state shared across duels. All map access happens in short
/// non-suspending critical sections.
pub struct SessionRegistry {
    config: DuelConfig,
    sessions: Mutex<HashMap<SpaceId, Arc<DuelSession>>>,
}

impl SessionRegistry {
    /// Create a registry handing out sessions with the given configuration.
    pub fn new(config: DuelConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Open a duel between `challenger` and `opponent` in `space`.
    ///
    /// Fails with [`DuelError::AlreadyActive`] if the space already hosts a
    /// duel or either identity is fighting anywhere else, and with
    /// [`DuelError::SelfChallenge`] when both sides are the same identity.
    /// On success the initial board is rendered and the background refresh
    /// task is started; a surface that is already dead fails creation.
    pub async fn create(
        self: &Arc<Self>,
        space: SpaceId,
        challenger: UserId,
        opponent: UserId,
        surface: Arc<dyn DuelSurface>,
    ) -> DuelResult<Arc<DuelSession>> {
        if challenger == opponent {
            return Err(DuelError::SelfChallenge);
        }
        let session = {
            let mut sessions = self.sessions.lock();
            if sessions.contains_key(&space) {
                return Err(DuelError::AlreadyActive(format!(
                    "space {space} already hosts a duel"
                )));
            }
            for active in sessions.values() {
                for identity in [challenger, opponent] {
                    if active.is_participant(identity) {
                        return Err(DuelError::AlreadyActive(format!(
                            "user {identity} is already in a duel"
                        )));
                    }
                }
            }
            let session = DuelSession::new(
                space,
                challenger,
                opponent,
                self.config.clone(),
                surface,
                Arc::downgrade(self),
            );
            sessions.insert(space, Arc::clone(&session));
            session
        };

        // First render happens outside the map lock. Only a dead surface is
        // fatal; transient failures are repaired by the refresh task.
        if let Err(SurfaceError::Gone) = session.render_initial().await {
            self.remove(space);
            return Err(DuelError::SurfaceGone);
        }

        let handle = tokio::spawn(refresh::run(Arc::clone(self), Arc::clone(&session)));
        session.set_refresh_task(handle);
        info!(%space, %challenger, %opponent, "duel opened");
        Ok(session)
    }

    /// Fetch the active duel for a space.
    ///
    /// A session whose surface has been invalidated is treated as absent
    /// and removed on the spot.
    pub fn get(&self, space: SpaceId) -> Option<Arc<DuelSession>> {
        let session = self.sessions.lock().get(&space).cloned()?;
        if session.surface_lost() {
            debug!(%space, "dropping duel with lost surface");
            self.remove(space);
            return None;
        }
        Some(session)
    }

    /// Unconditionally deregister the duel in `space`, cancelling its
    /// background task. Idempotent.
    pub fn remove(&self, space: SpaceId) {
        let removed = self.sessions.lock().remove(&space);
        if let Some(session) = removed {
            session.cancel_token().cancel();
            debug!(%space, "duel deregistered");
        }
    }

    /// Number of active duels.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether no duel is active anywhere.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_surface::{RecordingSurface, Respond};

    const ALICE: UserId = UserId(1);
    const BOB: UserId = UserId(2);
    const CAROL: UserId = UserId(3);
    const DAVE: UserId = UserId(4);

    fn config() -> DuelConfig {
        DuelConfig::default().with_seed(1).without_pacing()
    }

    #[tokio::test]
    async fn one_duel_per_space() {
        let registry = SessionRegistry::new(config());
        registry
            .create(SpaceId(1), ALICE, BOB, RecordingSurface::new())
            .await
            .unwrap();

        let err = registry
            .create(SpaceId(1), CAROL, DAVE, RecordingSurface::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DuelError::AlreadyActive(_)));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn participants_are_exclusive_across_spaces() {
        let registry = SessionRegistry::new(config());
        registry
            .create(SpaceId(1), ALICE, BOB, RecordingSurface::new())
            .await
            .unwrap();

        // Alice is busy, even in another space.
        let err = registry
            .create(SpaceId(2), CAROL, ALICE, RecordingSurface::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DuelError::AlreadyActive(_)));

        registry
            .create(SpaceId(2), CAROL, DAVE, RecordingSurface::new())
            .await
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn self_challenge_is_rejected() {
        let registry = SessionRegistry::new(config());
        let err = registry
            .create(SpaceId(1), ALICE, ALICE, RecordingSurface::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DuelError::SelfChallenge));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn cancelling_frees_space_and_identities() {
        let registry = SessionRegistry::new(config());
        let session = registry
            .create(SpaceId(1), ALICE, BOB, RecordingSurface::new())
            .await
            .unwrap();

        session.cancel(ALICE).await.unwrap();
        assert!(registry.is_empty());

        // Both the space and the identities are free again.
        registry
            .create(SpaceId(1), ALICE, CAROL, RecordingSurface::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dead_surface_fails_creation() {
        let registry = SessionRegistry::new(config());
        let err = registry
            .create(
                SpaceId(1),
                ALICE,
                BOB,
                RecordingSurface::scripted([Respond::Gone]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DuelError::SurfaceGone));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = SessionRegistry::new(config());
        let session = registry
            .create(SpaceId(1), ALICE, BOB, RecordingSurface::new())
            .await
            .unwrap();

        registry.remove(SpaceId(1));
        registry.remove(SpaceId(1));
        assert!(registry.is_empty());
        assert!(session.cancel_token().is_cancelled());
    }
}
