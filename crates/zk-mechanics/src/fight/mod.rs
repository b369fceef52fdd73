//! 1v1 fight resolution.
//!
//! A fight pits two [`Item`](crate::Item) snapshots against each other: a
//! coin decides who opens, then the sides alternate blows until one side's
//! hit points reach zero or the turn budget runs out. The damage math lives
//! in [`attack`]; the loop and its blow-by-blow log live in [`resolve`].

pub mod attack;
pub mod resolve;

pub use attack::{attack_damage, crit_chance, mitigation};
pub use resolve::{AttackRecord, FightOutcome, FightRng, FighterSlot, MAX_TURNS, resolve_fight};
