//! Combat mechanics for Zweikampf.
//!
//! Provides the immutable item snapshots duelists bring into a fight and a
//! stochastic 1v1 fight resolver: two items trade blows, damage is reduced by
//! the defender's mitigation, critical hits spike it back up, and a fight
//! that drags past its turn budget ends in a draw. Everything here is pure;
//! randomness enters only through the [`FightRng`] seam.

pub mod fight;
pub mod item;

pub use fight::{
    AttackRecord, FightOutcome, FightRng, FighterSlot, MAX_TURNS, attack_damage, crit_chance,
    mitigation, resolve_fight,
};
pub use item::{Item, ItemId};
