//! Resolve one 1v1 fight directly, without a session.

use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;

use zk_mechanics::{FighterSlot, Item, ItemId, resolve_fight};

pub fn run(
    attack_a: u32,
    health_a: u32,
    attack_b: u32,
    health_b: u32,
    seed: u64,
) -> Result<(), String> {
    let first = Item::new(ItemId(1), "First", attack_a, health_a);
    let second = Item::new(ItemId(2), "Second", attack_b, health_b);
    let mut rng = StdRng::seed_from_u64(seed);
    let outcome = resolve_fight(&first, &second, &mut rng);

    let fighter = |slot: FighterSlot| match slot {
        FighterSlot::First => &first,
        FighterSlot::Second => &second,
    };

    println!(
        "  {} vs {}",
        first.to_string().bold(),
        second.to_string().bold()
    );
    println!("  {} strikes first", fighter(outcome.opener).label);
    for record in &outcome.blows {
        let attacker = &fighter(record.attacker).label;
        let hit = if record.crit {
            format!(
                "{attacker} lands a CRITICAL HIT for {:.0} damage!",
                record.damage
            )
            .red()
            .to_string()
        } else {
            format!("{attacker} deals {:.0} damage", record.damage)
        };
        let mitigated = if record.mitigation > 0.0 {
            format!(" (mitigated {:.0}%)", record.mitigation * 100.0)
        } else {
            String::new()
        };
        println!(
            "  {hit}{mitigated}, {:.0} HP left",
            record.defender_hp_display()
        );
    }

    match outcome.winner {
        Some(slot) => println!(
            "  {}",
            format!("{} wins the fight!", fighter(slot).label)
                .green()
                .bold()
        ),
        None => println!("  {}", "Neither side fell; the fight is a draw.".yellow()),
    }

    Ok(())
}
