//! Map cells: per-slot object content in render order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Logical layers of a cell. Declaration order is render order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellSlot {
    Terrain,
    Graffiti,
    Fields,
    Furniture,
    WallFurniture,
    Items,
    Creatures,
    Vehicles,
    Unknown,
}

/// How many distinct objects a slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotCapacity {
    Single,
    Multiple,
}

impl CellSlot {
    pub fn capacity(self) -> SlotCapacity {
        match self {
            CellSlot::Fields | CellSlot::Items | CellSlot::Unknown => SlotCapacity::Multiple,
            _ => SlotCapacity::Single,
        }
    }

    /// Default slot for a game-data object `type`.
    pub fn for_object_type(object_type: &str) -> Option<CellSlot> {
        match object_type {
            "terrain" => Some(CellSlot::Terrain),
            "furniture" | "trap" => Some(CellSlot::Furniture),
            "item" | "ITEM" | "vehicle_part" => Some(CellSlot::Items),
            "field" => Some(CellSlot::Fields),
            "MONSTER" | "npc" => Some(CellSlot::Creatures),
            "vehicle" => Some(CellSlot::Vehicles),
            "graffiti" => Some(CellSlot::Graffiti),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("Object id must not be empty")]
    EmptyObjectId,
    #[error("Invalid quantity {0}, must be >= 1")]
    InvalidQuantity(u32),
}

/// One object (possibly stacked) inside a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSlotContent {
    pub object_id: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra_data: serde_json::Map<String, serde_json::Value>,
}

impl CellSlotContent {
    pub fn new(object_id: impl Into<String>, quantity: u32) -> Result<Self, CellError> {
        let object_id = object_id.into();
        if object_id.is_empty() {
            return Err(CellError::EmptyObjectId);
        }
        if quantity < 1 {
            return Err(CellError::InvalidQuantity(quantity));
        }
        Ok(Self { object_id, quantity, extra_data: serde_json::Map::new() })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SlotContent {
    Single(CellSlotContent),
    Multiple(Vec<CellSlotContent>),
}

/// Content of a single map cell. Cells carry no coordinates; the
/// containing map addresses them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapCell {
    slots: BTreeMap<CellSlot, SlotContent>,
}

impl MapCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an object in a slot. Single-capacity slots are overwritten,
    /// multiple-capacity slots are appended to.
    pub fn set_content(&mut self, slot: CellSlot, object_id: &str, quantity: u32) -> Result<(), CellError> {
        let content = CellSlotContent::new(object_id, quantity)?;
        match slot.capacity() {
            SlotCapacity::Single => {
                self.slots.insert(slot, SlotContent::Single(content));
            }
            SlotCapacity::Multiple => {
                let entry = self.slots.entry(slot).or_insert_with(|| SlotContent::Multiple(Vec::new()));
                match entry {
                    SlotContent::Multiple(list) => list.push(content),
                    SlotContent::Single(_) => *entry = SlotContent::Multiple(vec![content]),
                }
            }
        }
        Ok(())
    }

    /// Builder form of [`MapCell::set_content`] with quantity 1.
    pub fn with(mut self, slot: CellSlot, object_id: &str) -> Result<Self, CellError> {
        self.set_content(slot, object_id, 1)?;
        Ok(self)
    }

    /// First content of a slot.
    pub fn content(&self, slot: CellSlot) -> Option<&CellSlotContent> {
        match self.slots.get(&slot)? {
            SlotContent::Single(c) => Some(c),
            SlotContent::Multiple(list) => list.first(),
        }
    }

    pub fn all_in_slot(&self, slot: CellSlot) -> &[CellSlotContent] {
        match self.slots.get(&slot) {
            Some(SlotContent::Single(c)) => std::slice::from_ref(c),
            Some(SlotContent::Multiple(list)) => list,
            None => &[],
        }
    }

    pub fn clear_slot(&mut self, slot: CellSlot) {
        self.slots.remove(&slot);
    }

    /// Remove an object from a slot. `quantity` of `None` removes the whole
    /// entry; otherwise the stack shrinks and is removed once exhausted.
    pub fn remove_content(&mut self, slot: CellSlot, object_id: &str, quantity: Option<u32>) -> bool {
        let Some(content) = self.slots.get_mut(&slot) else {
            return false;
        };
        match content {
            SlotContent::Single(c) => {
                if c.object_id != object_id {
                    return false;
                }
                self.slots.remove(&slot);
                true
            }
            SlotContent::Multiple(list) => {
                let Some(pos) = list.iter().position(|c| c.object_id == object_id) else {
                    return false;
                };
                match quantity {
                    Some(q) if list[pos].quantity > q => list[pos].quantity -= q,
                    _ => {
                        list.remove(pos);
                    }
                }
                if list.is_empty() {
                    self.slots.remove(&slot);
                }
                true
            }
        }
    }

    pub fn has_content(&self, slot: CellSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    /// All object ids in render order.
    pub fn object_ids(&self) -> Vec<&str> {
        self.slots
            .values()
            .flat_map(|content| match content {
                SlotContent::Single(c) => std::slice::from_ref(c),
                SlotContent::Multiple(list) => list.as_slice(),
            })
            .map(|c| c.object_id.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
