//! The per-session background refresh/timeout task.
//!
//! One task per duel: every `refresh_interval` it re-renders the board,
//! emits a single latched warning once `warn_after` has elapsed, and
//! resolves the duel once `timeout_after` has elapsed. The task exits when
//! its cancellation token fires (manual cancel, commencement hand-off, or
//! registry removal), when the surface is gone, or when it resolves the
//! timeout itself.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::registry::SessionRegistry;
use crate::session::DuelSession;
use crate::surface::SurfaceError;

pub(crate) async fn run(registry: Arc<SessionRegistry>, session: Arc<DuelSession>) {
    let refresh = session.config().refresh_interval;
    let warn_after = session.config().warn_after;
    let timeout_after = session.config().timeout_after;
    let mut warned = false;

    loop {
        tokio::select! {
            () = session.cancel_token().cancelled() => {
                debug!(space = %session.space(), "refresh task cancelled");
                break;
            }
            () = sleep(refresh) => {}
        }

        let elapsed = session.elapsed();

        if !warned && elapsed >= warn_after {
            // Latched before rendering; a failed warning is not repeated.
            warned = true;
            let remaining = timeout_after.saturating_sub(elapsed);
            session.render_warning(remaining).await;
        }

        if elapsed >= timeout_after {
            // Resolves and deregisters unless the duel already commenced;
            // either way this task is done.
            session.resolve_timeout().await;
            break;
        }

        match session.render_refresh().await {
            Ok(()) => {}
            Err(SurfaceError::Gone) => {
                debug!(space = %session.space(), "surface gone; deregistering duel");
                registry.remove(session.space());
                break;
            }
            Err(SurfaceError::Transient(reason)) => {
                warn!(
                    space = %session.space(),
                    %reason,
                    "refresh render failed; retrying next interval"
                );
            }
        }
    }

    // A session whose surface never came up must not leak a registry entry.
    if !session.surface_established() {
        registry.remove(session.space());
    }
}
