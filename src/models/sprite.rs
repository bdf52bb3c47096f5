//! Sprite references as they appear in tile definitions.
//!
//! A tile's `fg`/`bg` value takes one of three shapes: a single sprite
//! index, an ordered list of indices (rotation frames), or a list of
//! weighted alternatives. Anything else is rejected at parse time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A sprite index, or the explicit absence of one.
///
/// Tile definitions encode "no sprite" as a negative integer; it is
/// decoded into [`SpriteId::NoSprite`] so it can never be confused with
/// a real sheet position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum SpriteId {
    Real(u32),
    NoSprite,
}

impl SpriteId {
    /// Index of a real sprite.
    pub fn index(self) -> Option<u32> {
        match self {
            SpriteId::Real(i) => Some(i),
            SpriteId::NoSprite => None,
        }
    }

    pub fn is_real(self) -> bool {
        matches!(self, SpriteId::Real(_))
    }
}

impl From<i64> for SpriteId {
    fn from(value: i64) -> Self {
        if value < 0 || value > u32::MAX as i64 {
            SpriteId::NoSprite
        } else {
            SpriteId::Real(value as u32)
        }
    }
}

impl From<SpriteId> for i64 {
    fn from(value: SpriteId) -> Self {
        match value {
            SpriteId::Real(i) => i as i64,
            SpriteId::NoSprite => -1,
        }
    }
}

impl From<u32> for SpriteId {
    fn from(value: u32) -> Self {
        SpriteId::Real(value)
    }
}

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpriteId::Real(i) => write!(f, "{}", i),
            SpriteId::NoSprite => write!(f, "none"),
        }
    }
}

/// The `sprite` payload of a weighted entry: one index or a rotation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpriteValue {
    Single(SpriteId),
    List(Vec<SpriteId>),
}

impl SpriteValue {
    /// The sprite used when a single index is required: the value itself,
    /// or the first element of a list.
    pub fn first(&self) -> SpriteId {
        match self {
            SpriteValue::Single(id) => *id,
            SpriteValue::List(ids) => ids.first().copied().unwrap_or(SpriteId::Real(0)),
        }
    }

    /// Element `index` of a list value; a single value ignores the index.
    pub fn at(&self, index: usize) -> Option<SpriteId> {
        match self {
            SpriteValue::Single(id) => Some(*id),
            SpriteValue::List(ids) => ids.get(index).copied(),
        }
    }

    fn collect_into(&self, out: &mut Vec<SpriteId>) {
        match self {
            SpriteValue::Single(id) => out.push(*id),
            SpriteValue::List(ids) => out.extend(ids.iter().copied()),
        }
    }
}

fn default_weight() -> u32 {
    1
}

/// One alternative among several frames or orientations of a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedSprite {
    #[serde(default = "default_weight")]
    pub weight: u32,
    pub sprite: SpriteValue,
}

impl WeightedSprite {
    pub fn new(weight: u32, sprite: impl Into<SpriteId>) -> Self {
        Self { weight, sprite: SpriteValue::Single(sprite.into()) }
    }

    pub fn with_rotations(weight: u32, sprites: Vec<SpriteId>) -> Self {
        Self { weight, sprite: SpriteValue::List(sprites) }
    }
}

impl Default for WeightedSprite {
    fn default() -> Self {
        Self::new(1, 0u32)
    }
}

/// A tile's foreground or background reference.
///
/// Variant order matters for deserialization: an empty list is read as an
/// empty rotation list, and a list mixing integers with objects matches no
/// variant and fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpriteRef {
    Single(SpriteId),
    Rotations(Vec<SpriteId>),
    Weighted(Vec<WeightedSprite>),
}

impl SpriteRef {
    /// Every sprite index this reference can produce, in declaration order.
    pub fn sprite_ids(&self) -> Vec<SpriteId> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    pub(crate) fn collect_into(&self, out: &mut Vec<SpriteId>) {
        match self {
            SpriteRef::Single(id) => out.push(*id),
            SpriteRef::Rotations(ids) => out.extend(ids.iter().copied()),
            SpriteRef::Weighted(list) => {
                for entry in list {
                    entry.sprite.collect_into(out);
                }
            }
        }
    }

    pub fn is_no_sprite(&self) -> bool {
        matches!(self, SpriteRef::Single(SpriteId::NoSprite))
    }
}

impl From<u32> for SpriteRef {
    fn from(value: u32) -> Self {
        SpriteRef::Single(SpriteId::Real(value))
    }
}
