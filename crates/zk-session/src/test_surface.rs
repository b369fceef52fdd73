//! Shared surface doubles for session tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::surface::{DuelSurface, DuelUpdate, SurfaceError};

/// Scripted render response.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Respond {
    Ok,
    Transient,
    Gone,
}

/// Records every successfully rendered update and answers renders from a
/// script; an exhausted script keeps answering `Ok`.
pub(crate) struct RecordingSurface {
    updates: Mutex<Vec<DuelUpdate>>,
    script: Mutex<VecDeque<Respond>>,
}

impl RecordingSurface {
    pub(crate) fn new() -> Arc<Self> {
        Self::scripted([])
    }

    pub(crate) fn scripted(script: impl IntoIterator<Item = Respond>) -> Arc<Self> {
        Arc::new(Self {
            updates: Mutex::new(Vec::new()),
            script: Mutex::new(script.into_iter().collect()),
        })
    }

    pub(crate) fn count_matching(&self, pred: impl Fn(&DuelUpdate) -> bool) -> usize {
        self.updates.lock().iter().filter(|u| pred(u)).count()
    }
}

#[async_trait]
impl DuelSurface for RecordingSurface {
    async fn render(&self, update: DuelUpdate) -> Result<(), SurfaceError> {
        let respond = self.script.lock().pop_front().unwrap_or(Respond::Ok);
        match respond {
            Respond::Ok => {
                self.updates.lock().push(update);
                Ok(())
            }
            Respond::Transient => Err(SurfaceError::Transient("scripted failure".into())),
            Respond::Gone => Err(SurfaceError::Gone),
        }
    }
}
