//! One side of a duel and its roster state.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use zk_mechanics::{Item, ItemId};

use crate::error::{DuelError, DuelResult};

/// Opaque external user handle (a chat-platform snowflake or similar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One side of a duel: an identity, an editable proposal, and a lock flag.
///
/// Mutation goes through the owning session; the lock flag only ever moves
/// from false to true.
#[derive(Debug, Clone)]
pub struct Participant {
    identity: UserId,
    proposal: Vec<Item>,
    locked: bool,
    max_roster: usize,
}

impl Participant {
    /// Create a participant with an empty proposal.
    pub(crate) fn new(identity: UserId, max_roster: usize) -> Self {
        Self {
            identity,
            proposal: Vec::new(),
            locked: false,
            max_roster,
        }
    }

    /// The participant's identity.
    pub fn identity(&self) -> UserId {
        self.identity
    }

    /// The proposed items, in selection order.
    pub fn proposal(&self) -> &[Item] {
        &self.proposal
    }

    /// Whether the participant has locked in.
    pub fn locked(&self) -> bool {
        self.locked
    }

    /// How many items can still be added.
    pub fn remaining_slots(&self) -> usize {
        self.max_roster.saturating_sub(self.proposal.len())
    }

    /// Append an item to the proposal.
    pub(crate) fn add(&mut self, item: Item) -> DuelResult<()> {
        self.ensure_unlocked()?;
        if self.proposal.iter().any(|i| i.id == item.id) {
            return Err(DuelError::Duplicate(item.id));
        }
        if self.proposal.len() >= self.max_roster {
            return Err(DuelError::RosterFull(self.max_roster));
        }
        self.proposal.push(item);
        Ok(())
    }

    /// Remove an item from the proposal by identity.
    pub(crate) fn remove(&mut self, id: ItemId) -> DuelResult<Item> {
        self.ensure_unlocked()?;
        match self.proposal.iter().position(|i| i.id == id) {
            Some(pos) => Ok(self.proposal.remove(pos)),
            None => Err(DuelError::NotPresent(id)),
        }
    }

    /// Fill the remaining slots with a uniform random sample (without
    /// replacement) from `candidates`, excluding items already proposed.
    /// Returns the items added.
    pub(crate) fn fill_random(
        &mut self,
        candidates: &[Item],
        rng: &mut StdRng,
    ) -> DuelResult<Vec<Item>> {
        self.ensure_unlocked()?;
        let mut eligible = self.eligible(candidates);
        let slots = self.remaining_slots();
        if eligible.is_empty() || slots == 0 {
            return Err(DuelError::NothingToAdd);
        }
        eligible.shuffle(rng);
        eligible.truncate(slots);
        self.proposal.extend(eligible.iter().cloned());
        Ok(eligible)
    }

    /// Fill the remaining slots with the strongest eligible candidates,
    /// ranked by attack + health (ties keep candidate order). Returns the
    /// items added.
    pub(crate) fn fill_strongest(&mut self, candidates: &[Item]) -> DuelResult<Vec<Item>> {
        self.ensure_unlocked()?;
        let mut eligible = self.eligible(candidates);
        let slots = self.remaining_slots();
        if eligible.is_empty() || slots == 0 {
            return Err(DuelError::NothingToAdd);
        }
        // Stable sort, so equal-power items stay in candidate order.
        eligible.sort_by(|a, b| b.power().cmp(&a.power()));
        eligible.truncate(slots);
        self.proposal.extend(eligible.iter().cloned());
        Ok(eligible)
    }

    /// Commit the proposal. Fails if already locked.
    pub(crate) fn lock(&mut self) -> DuelResult<()> {
        if self.locked {
            return Err(DuelError::AlreadyLocked);
        }
        self.locked = true;
        Ok(())
    }

    fn ensure_unlocked(&self) -> DuelResult<()> {
        if self.locked {
            Err(DuelError::Locked)
        } else {
            Ok(())
        }
    }

    fn eligible(&self, candidates: &[Item]) -> Vec<Item> {
        candidates
            .iter()
            .filter(|c| !self.proposal.iter().any(|p| p.id == c.id))
            .cloned()
            .collect()
    }
}
