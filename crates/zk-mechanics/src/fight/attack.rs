//! Damage math for a single blow.
//!
//! The constants reproduce the tuning of the duel game this engine powers
//! and are deliberately frozen rather than configurable.

use crate::item::Item;

/// Base critical-hit probability before the attack-advantage bonus.
pub const BASE_CRIT_CHANCE: f64 = 0.08;
/// Lower bound on the critical-hit probability.
pub const MIN_CRIT_CHANCE: f64 = 0.05;
/// Upper bound on the critical-hit probability.
pub const MAX_CRIT_CHANCE: f64 = 0.20;
/// Damage multiplier applied on a critical hit.
pub const CRIT_MULTIPLIER: f64 = 1.3;
/// Upper bound on the defender's damage mitigation.
pub const MAX_MITIGATION: f64 = 0.20;

/// Weight of the attack advantage in the critical-hit probability.
const ADVANTAGE_WEIGHT: f64 = 0.3;
/// Divisor relating defender health to mitigation.
const MITIGATION_DIVISOR: f64 = 4.0;

/// Probability that `attacker` lands a critical hit on `defender`.
///
/// The 8% base rate grows with the attacker's advantage over the defender's
/// health and is clamped to `[0.05, 0.20]`.
pub fn crit_chance(attacker: &Item, defender: &Item) -> f64 {
    let advantage = f64::from(attacker.attack) / (f64::from(defender.health) + 1.0);
    (BASE_CRIT_CHANCE * (1.0 + advantage * ADVANTAGE_WEIGHT))
        .clamp(MIN_CRIT_CHANCE, MAX_CRIT_CHANCE)
}

/// Fraction of incoming damage the defender shrugs off, in `[0, 0.20]`.
///
/// Tougher defenders mitigate more. The attack stat is floored at 1 in the
/// denominator so zero-attack items do not divide by zero.
pub fn mitigation(attacker: &Item, defender: &Item) -> f64 {
    let attack = f64::from(attacker.attack.max(1));
    (f64::from(defender.health) / (attack * MITIGATION_DIVISOR)).clamp(0.0, MAX_MITIGATION)
}

/// Damage dealt by one blow.
///
/// A critical hit deals at least `1.3 x` the raw attack stat, so mitigation
/// never pulls a crit below that floor.
pub fn attack_damage(attacker: &Item, defender: &Item, crit: bool) -> f64 {
    let base = f64::from(attacker.attack) * (1.0 - mitigation(attacker, defender));
    if crit {
        (base * CRIT_MULTIPLIER).max(f64::from(attacker.attack) * CRIT_MULTIPLIER)
    } else {
        base
    }
}
