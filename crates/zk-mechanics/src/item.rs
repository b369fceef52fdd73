//! Item snapshots used in fights.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of an item within a duel.
///
/// Assigned by whatever ownership store supplies the items; the engine only
/// requires uniqueness within a single duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:X}", self.0)
    }
}

/// An immutable snapshot of an owned item for the duration of one duel.
///
/// Stats are frozen at selection time; whatever the backing store does to the
/// item afterwards has no effect on a running duel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Identifier, unique within the duel.
    pub id: ItemId,
    /// Display label.
    pub label: String,
    /// Attack stat. Zero is allowed; such an item can only lose or draw.
    pub attack: u32,
    /// Health stat, always at least 1.
    pub health: u32,
}

impl Item {
    /// Create a new item snapshot. `health` is clamped to at least 1.
    pub fn new(id: ItemId, label: impl Into<String>, attack: u32, health: u32) -> Self {
        Self {
            id,
            label: label.into(),
            attack,
            health: health.max(1),
        }
    }

    /// Combined strength used to rank items (strongest-first fills).
    pub fn power(&self) -> u32 {
        self.attack + self.health
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ATK:{} HP:{})", self.label, self.attack, self.health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_clamped_to_one() {
        let item = Item::new(ItemId(1), "Paper Shield", 3, 0);
        assert_eq!(item.health, 1);
        let item = Item::new(ItemId(2), "Iron Shield", 3, 40);
        assert_eq!(item.health, 40);
    }

    #[test]
    fn power_sums_stats() {
        let item = Item::new(ItemId(1), "Saber", 12, 30);
        assert_eq!(item.power(), 42);
    }

    #[test]
    fn display_formats() {
        let item = Item::new(ItemId(0x2A), "Saber", 12, 30);
        assert_eq!(item.to_string(), "Saber (ATK:12 HP:30)");
        assert_eq!(item.id.to_string(), "#2A");
    }

    #[test]
    fn round_trip_serde() {
        let item = Item::new(ItemId(7), "Oaken Buckler", 5, 25);
        let json = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
