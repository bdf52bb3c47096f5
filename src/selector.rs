//! Sprite selection for weighted and animated references.
//!
//! Static picks are a pure function of `(x, y, object_id)` so the same map
//! always renders the same way. Animated picks read the tile type's shared
//! [`AnimationStates`] entry and offset it by position.

use crate::animation::AnimationStates;
use crate::models::{SpriteId, WeightedSprite};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(mut hash: u64, bytes: &[u8]) -> u64 {
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// FNV-1a hash of a grid position, fixed across builds and platforms.
pub fn position_hash(x: i32, y: i32) -> u64 {
    let hash = fnv1a(FNV_OFFSET, &x.to_le_bytes());
    fnv1a(hash, &y.to_le_bytes())
}

/// FNV-1a hash of a grid position and object id.
pub fn position_id_hash(x: i32, y: i32, object_id: &str) -> u64 {
    fnv1a(position_hash(x, y), object_id.as_bytes())
}

/// Walk cumulative weights with `seed`. A list whose weights sum to zero
/// always yields its first frame.
pub fn pick_weighted(frames: &[WeightedSprite], seed: u64) -> Option<&WeightedSprite> {
    let first = frames.first()?;
    let total: u64 = frames.iter().map(|f| u64::from(f.weight)).sum();
    if total == 0 {
        return Some(first);
    }
    let roll = seed % total;

    let mut accumulated = 0u64;
    for frame in frames {
        accumulated += u64::from(frame.weight);
        if roll < accumulated {
            return Some(frame);
        }
    }
    Some(first)
}

/// Chooses frames from weighted lists, optionally driven by animation state.
#[derive(Debug, Default)]
pub struct SpriteSelector<'a> {
    animations: Option<&'a mut AnimationStates>,
}

impl<'a> SpriteSelector<'a> {
    /// A selector without animation: animated lists pick statically.
    pub fn new() -> Self {
        Self { animations: None }
    }

    pub fn with_animations(animations: &'a mut AnimationStates) -> Self {
        Self { animations: Some(animations) }
    }

    pub fn has_animations(&self) -> bool {
        self.animations.is_some()
    }

    /// Select one frame of `frames` for the tile at `(x, y)`.
    ///
    /// Animated lists are registered under `object_id` on first use. An
    /// empty list yields the default frame (weight 1, sprite 0).
    pub fn select_frame(
        &mut self,
        frames: &[WeightedSprite],
        x: i32,
        y: i32,
        object_id: &str,
        animated: bool,
    ) -> WeightedSprite {
        if frames.is_empty() {
            return WeightedSprite::default();
        }
        if animated {
            if let Some(states) = self.animations.as_deref_mut() {
                states.register(object_id, frames);
                if let Some(frame) = states.frame_for_position(object_id, x, y) {
                    return frame.clone();
                }
            }
        }
        pick_weighted(frames, position_id_hash(x, y, object_id)).cloned().unwrap_or_default()
    }

    /// Like [`SpriteSelector::select_frame`], narrowed to one sprite index.
    pub fn select_sprite(
        &mut self,
        frames: &[WeightedSprite],
        x: i32,
        y: i32,
        object_id: &str,
        animated: bool,
    ) -> SpriteId {
        self.select_frame(frames, x, y, object_id, animated).sprite.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpriteValue;

    fn weighted(entries: &[(u32, u32)]) -> Vec<WeightedSprite> {
        entries.iter().map(|(w, s)| WeightedSprite::new(*w, *s)).collect()
    }

    #[test]
    fn test_static_selection_is_pure() {
        let frames = weighted(&[(3, 10), (1, 11), (6, 12)]);
        let mut selector = SpriteSelector::new();
        for x in -5..5 {
            for y in -5..5 {
                let a = selector.select_sprite(&frames, x, y, "t_grass", false);
                let b = selector.select_sprite(&frames, x, y, "t_grass", false);
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_pick_weighted_walks_cumulative_weights() {
        let frames = weighted(&[(3, 10), (1, 11), (6, 12)]);
        let picks: Vec<u32> = (0..10)
            .map(|seed| pick_weighted(&frames, seed).unwrap().sprite.first().index().unwrap())
            .collect();
        assert_eq!(picks, vec![10, 10, 10, 11, 12, 12, 12, 12, 12, 12]);
    }

    #[test]
    fn test_position_hashes_are_pinned() {
        assert_eq!(fnv1a(FNV_OFFSET, b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(position_hash(0, 0), 0xa8c7_f832_281a_39c5);
        assert_eq!(position_hash(3, -2), 0xf883_8cc2_7d18_e3d3);
        assert_eq!(position_id_hash(3, -2, "t_grass"), 0x20bc_fe15_0570_693c);
    }

    #[test]
    fn test_zero_weights_fall_back_to_first() {
        let frames = weighted(&[(0, 1), (0, 2)]);
        for seed in 0..4 {
            assert_eq!(pick_weighted(&frames, seed).unwrap().sprite.first(), SpriteId::Real(1));
        }
        assert_eq!(pick_weighted(&frames, 7).unwrap().sprite.first(), SpriteId::Real(1));
        assert!(pick_weighted(&[], 7).is_none());
    }

    #[test]
    fn test_empty_list_yields_default() {
        let mut selector = SpriteSelector::new();
        assert_eq!(selector.select_frame(&[], 0, 0, "x", false), WeightedSprite::default());
    }

    #[test]
    fn test_rotation_frame_narrows_to_first() {
        let frames = vec![WeightedSprite::with_rotations(1, vec![SpriteId::Real(7), SpriteId::Real(8)])];
        let mut selector = SpriteSelector::new();
        assert_eq!(selector.select_sprite(&frames, 1, 2, "f_chair", false), SpriteId::Real(7));
        assert!(matches!(selector.select_frame(&frames, 1, 2, "f_chair", false).sprite, SpriteValue::List(_)));
    }

    #[test]
    fn test_animated_selection_follows_clock() {
        let frames = weighted(&[(1, 0), (1, 1), (1, 2)]);
        let mut states = AnimationStates::new();
        let before = SpriteSelector::with_animations(&mut states).select_sprite(&frames, 4, 4, "fd_fire", true);
        assert_eq!(states.len(), 1);
        states.tick();
        let after = SpriteSelector::with_animations(&mut states).select_sprite(&frames, 4, 4, "fd_fire", true);
        let (b, a) = (before.index().unwrap(), after.index().unwrap());
        assert_eq!((b + 1) % 3, a);
    }
}
