//! The fight loop: two items trade blows until one falls or the turn budget
//! runs out.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::attack::{attack_damage, crit_chance, mitigation};
use crate::item::Item;

/// Maximum number of full exchanges before a fight is declared a draw.
pub const MAX_TURNS: u32 = 10;

/// Which of the two fighters a record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FighterSlot {
    /// The first fighter passed to [`resolve_fight`].
    First,
    /// The second fighter passed to [`resolve_fight`].
    Second,
}

impl FighterSlot {
    /// The opposing slot.
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// Source of randomness for a fight.
///
/// Implemented for every [`rand::Rng`]; tests provide scripted
/// implementations to pin down exact outcomes.
pub trait FightRng {
    /// Fair coin deciding whether the first fighter opens the fight.
    fn opening_coin(&mut self) -> bool;

    /// Bernoulli roll against a probability in `[0, 1]`.
    fn chance(&mut self, probability: f64) -> bool;
}

impl<R: Rng> FightRng for R {
    fn opening_coin(&mut self) -> bool {
        self.random_bool(0.5)
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.random_bool(probability.clamp(0.0, 1.0))
    }
}

/// One blow inside a fight, carrying the numbers a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackRecord {
    /// Who struck the blow.
    pub attacker: FighterSlot,
    /// Damage dealt.
    pub damage: f64,
    /// Whether the blow was a critical hit.
    pub crit: bool,
    /// Mitigation fraction applied to the blow.
    pub mitigation: f64,
    /// Defender hit points after the blow; may be negative.
    pub defender_hp: f64,
}

impl AttackRecord {
    /// Defender hit points clamped to zero for display.
    pub fn defender_hp_display(&self) -> f64 {
        self.defender_hp.max(0.0)
    }
}

/// The outcome of one resolved fight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FightOutcome {
    /// Who opened the fight.
    pub opener: FighterSlot,
    /// The winning side, or `None` when the turn budget ran out.
    pub winner: Option<FighterSlot>,
    /// Every blow in order.
    pub blows: Vec<AttackRecord>,
}

impl FightOutcome {
    /// Returns true when the fight ended without a winner.
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Resolve a 1v1 fight between `first` and `second`.
///
/// The opening attacker is chosen by a fair coin, then the sides alternate
/// blows. Hit points are tracked as floats and may go negative on the
/// killing blow. If both sides survive [`MAX_TURNS`] full exchanges the
/// fight is a draw.
pub fn resolve_fight(first: &Item, second: &Item, rng: &mut impl FightRng) -> FightOutcome {
    let opener = if rng.opening_coin() {
        FighterSlot::First
    } else {
        FighterSlot::Second
    };
    let mut hp = [f64::from(first.health), f64::from(second.health)];
    let mut blows = Vec::new();
    let mut winner = None;

    'turns: for _ in 0..MAX_TURNS {
        for attacker in [opener, opener.other()] {
            let (att, def) = match attacker {
                FighterSlot::First => (first, second),
                FighterSlot::Second => (second, first),
            };
            let crit = rng.chance(crit_chance(att, def));
            let damage = attack_damage(att, def, crit);
            let defender = attacker.other();
            hp[defender.index()] -= damage;
            blows.push(AttackRecord {
                attacker,
                damage,
                crit,
                mitigation: mitigation(att, def),
                defender_hp: hp[defender.index()],
            });
            if hp[defender.index()] <= 0.0 {
                winner = Some(attacker);
                break 'turns;
            }
        }
    }

    FightOutcome {
        opener,
        winner,
        blows,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::item::ItemId;

    /// Scripted randomness: a fixed opening coin and a queue of crit rolls
    /// (exhausted rolls never crit).
    struct Scripted {
        open_first: bool,
        crits: Vec<bool>,
        next: usize,
    }

    impl Scripted {
        fn no_crits(open_first: bool) -> Self {
            Self {
                open_first,
                crits: Vec::new(),
                next: 0,
            }
        }
    }

    impl FightRng for Scripted {
        fn opening_coin(&mut self) -> bool {
            self.open_first
        }

        fn chance(&mut self, _probability: f64) -> bool {
            let crit = self.crits.get(self.next).copied().unwrap_or(false);
            self.next += 1;
            crit
        }
    }

    fn item(attack: u32, health: u32) -> Item {
        Item::new(ItemId(u64::from(attack)), "Test", attack, health)
    }

    #[test]
    fn mirror_match_opener_wins_on_seventh_blow() {
        // Both 10 ATK / 50 HP: 20% mitigation, 8 damage per blow, so the
        // seventh blow from the opener lands the kill (50 - 7 * 8 = -6).
        let a = item(10, 50);
        let b = item(10, 50);
        let mut rng = Scripted::no_crits(true);
        let outcome = resolve_fight(&a, &b, &mut rng);

        assert_eq!(outcome.opener, FighterSlot::First);
        assert_eq!(outcome.winner, Some(FighterSlot::First));
        assert_eq!(outcome.blows.len(), 13);
        for (i, blow) in outcome.blows.iter().enumerate() {
            let expected = if i % 2 == 0 {
                FighterSlot::First
            } else {
                FighterSlot::Second
            };
            assert_eq!(blow.attacker, expected);
            assert!((blow.damage - 8.0).abs() < 1e-12);
            assert!((blow.mitigation - 0.2).abs() < 1e-12);
            assert!(!blow.crit);
        }
        let last = outcome.blows.last().unwrap();
        assert!((last.defender_hp - (-6.0)).abs() < 1e-12);
        assert!((last.defender_hp_display() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn mirror_match_is_symmetric_for_second_opener() {
        let a = item(10, 50);
        let b = item(10, 50);
        let mut rng = Scripted::no_crits(false);
        let outcome = resolve_fight(&a, &b, &mut rng);

        assert_eq!(outcome.opener, FighterSlot::Second);
        assert_eq!(outcome.winner, Some(FighterSlot::Second));
        assert_eq!(outcome.blows.len(), 13);
    }

    #[test]
    fn harmless_items_draw_after_turn_budget() {
        // Zero attack deals zero damage; the fight exhausts its budget.
        let a = item(0, 5);
        let b = item(0, 5);
        let mut rng = Scripted::no_crits(true);
        let outcome = resolve_fight(&a, &b, &mut rng);

        assert!(outcome.is_draw());
        assert_eq!(outcome.blows.len(), (MAX_TURNS * 2) as usize);
        assert!(outcome.blows.iter().all(|b| b.damage == 0.0));
    }

    #[test]
    fn scripted_crit_uses_floor_damage() {
        let a = item(10, 50);
        let b = item(10, 50);
        let mut rng = Scripted {
            open_first: true,
            crits: vec![true],
            next: 0,
        };
        let outcome = resolve_fight(&a, &b, &mut rng);

        let first = &outcome.blows[0];
        assert!(first.crit);
        assert!((first.damage - 13.0).abs() < 1e-12);
        assert!((first.defender_hp - 37.0).abs() < 1e-12);
    }

    #[test]
    fn one_sided_fight_never_exceeds_budget() {
        let strong = item(200, 80);
        let weak = item(1, 10);
        let mut rng = Scripted::no_crits(true);
        let outcome = resolve_fight(&strong, &weak, &mut rng);

        assert_eq!(outcome.winner, Some(FighterSlot::First));
        assert_eq!(outcome.blows.len(), 1);
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let a = item(14, 33);
        let b = item(9, 61);
        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        let o1 = resolve_fight(&a, &b, &mut rng1);
        let o2 = resolve_fight(&a, &b, &mut rng2);
        assert_eq!(o1, o2);
    }

    #[test]
    fn seeded_outcomes_stay_within_bounds() {
        // Whatever the dice do, the log never exceeds the budget and the
        // last blow is the only one that may leave the defender at or
        // below zero.
        let a = item(12, 40);
        let b = item(15, 35);
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = resolve_fight(&a, &b, &mut rng);
            assert!(outcome.blows.len() <= (MAX_TURNS * 2) as usize);
            for blow in &outcome.blows[..outcome.blows.len().saturating_sub(1)] {
                assert!(blow.defender_hp > 0.0);
            }
            if let Some(winner) = outcome.winner {
                let last = outcome.blows.last().unwrap();
                assert_eq!(last.attacker, winner);
                assert!(last.defender_hp <= 0.0);
            }
        }
    }

    #[test]
    fn slot_other_flips() {
        assert_eq!(FighterSlot::First.other(), FighterSlot::Second);
        assert_eq!(FighterSlot::Second.other(), FighterSlot::First);
    }
}
