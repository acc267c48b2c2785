//! Equipment slots.
//!
//! A fixed row of slots filled first-empty-first. Nothing is ever evicted:
//! when every slot is taken the incoming item is handed back to the caller.

use serde::{Deserialize, Serialize};

use crate::constants::EQUIPMENT_SLOTS;
use crate::equipment::EquipmentItem;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSlots {
    slots: [Option<EquipmentItem>; EQUIPMENT_SLOTS],
}

impl EquipmentSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Places `item` in the first empty slot and returns its index.
    /// A full row gives the item back untouched.
    pub fn insert(&mut self, item: EquipmentItem) -> Result<usize, EquipmentItem> {
        match self.slots.iter().position(Option::is_none) {
            Some(idx) => {
                self.slots[idx] = Some(item);
                Ok(idx)
            }
            None => Err(item),
        }
    }

    /// Empties slot `index`. Out-of-range or empty slots yield `None`.
    pub fn remove(&mut self, index: usize) -> Option<EquipmentItem> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn get(&self, index: usize) -> Option<&EquipmentItem> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Slot view in order, empties included.
    pub fn slots(&self) -> &[Option<EquipmentItem>] {
        &self.slots
    }

    /// Equipped items only.
    pub fn items(&self) -> impl Iterator<Item = &EquipmentItem> {
        self.slots.iter().flatten()
    }

    pub fn used(&self) -> usize {
        self.items().count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::{ItemId, Rarity, StatMods};

    fn item(id: u64) -> EquipmentItem {
        EquipmentItem {
            id: ItemId(id),
            rarity: Rarity::Common,
            icon: 0,
            name: "Common Equipment".into(),
            mods: StatMods::default(),
            lines: vec![],
        }
    }

    #[test]
    fn test_slots_default_empty() {
        let slots = EquipmentSlots::new();
        assert_eq!(slots.capacity(), EQUIPMENT_SLOTS);
        assert_eq!(slots.used(), 0);
        assert!(!slots.is_full());
    }

    #[test]
    fn test_insert_fills_first_empty() {
        let mut slots = EquipmentSlots::new();
        assert_eq!(slots.insert(item(1)), Ok(0));
        assert_eq!(slots.insert(item(2)), Ok(1));
        slots.remove(0);
        assert_eq!(slots.insert(item(3)), Ok(0));
        assert_eq!(slots.get(0).map(|i| i.id), Some(ItemId(3)));
    }

    #[test]
    fn test_insert_full_returns_item() {
        let mut slots = EquipmentSlots::new();
        for i in 0..EQUIPMENT_SLOTS as u64 {
            assert!(slots.insert(item(i)).is_ok());
        }
        assert!(slots.is_full());
        let back = slots.insert(item(99)).unwrap_err();
        assert_eq!(back.id, ItemId(99));
        assert_eq!(slots.used(), EQUIPMENT_SLOTS);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut slots = EquipmentSlots::new();
        assert!(slots.remove(0).is_none());
        assert!(slots.remove(EQUIPMENT_SLOTS + 3).is_none());
    }
}
