//! Multitile subtile selection from neighbor connectivity.
//!
//! Directions are always ordered `[N, W, S, E]`. A neighbor is connected
//! when it holds the same object id or when this object's `connects_to`
//! groups meet the neighbor's `connect_groups`. `rotates_to` groups are
//! tracked separately and only feed the alternate index.

use std::collections::BTreeSet;
use std::fmt;

use crate::game_data::{ObjectResolver, ResolvedObject};
use crate::models::MapCell;

/// A cardinal direction in neighbor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    West,
    South,
    East,
}

impl Direction {
    /// Neighbor order used throughout rendering.
    pub const ALL: [Direction; 4] = [Direction::North, Direction::West, Direction::South, Direction::East];

    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::West => 1,
            Direction::South => 2,
            Direction::East => 3,
        }
    }

    /// Grid offset `(dx, dy)` with y growing southwards.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::West => (-1, 0),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
        }
    }
}

/// Multitile piece kinds, named as in `additional_tiles` ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubtileKind {
    Unconnected,
    EndPiece,
    Edge,
    Corner,
    TConnection,
    Center,
}

impl SubtileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SubtileKind::Unconnected => "unconnected",
            SubtileKind::EndPiece => "end_piece",
            SubtileKind::Edge => "edge",
            SubtileKind::Corner => "corner",
            SubtileKind::TConnection => "t_connection",
            SubtileKind::Center => "center",
        }
    }

    /// Clockwise rotation in degrees applied to a single-sprite subtile.
    pub fn rotation_angle(self, index: usize) -> u32 {
        let table: &[u32] = match self {
            SubtileKind::EndPiece | SubtileKind::Corner => &[0, 270, 180, 90],
            SubtileKind::Edge => &[0, 90],
            SubtileKind::TConnection => &[0, 90, 180, 270],
            SubtileKind::Center | SubtileKind::Unconnected => &[0],
        };
        table.get(index).copied().unwrap_or(0)
    }
}

impl fmt::Display for SubtileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alternate index for unconnected pieces, keyed by `rotates_to` mask
/// (N=8, E=4, S=2, W=1). Masks not listed map to [`NO_ROTATION_MATCH`].
const UNCONNECTED_ROTATION: [(u8, usize); 14] = [
    (0b0000, 15),
    (0b1000, 2),
    (0b0100, 3),
    (0b0010, 0),
    (0b0001, 1),
    (0b1100, 6),
    (0b0110, 7),
    (0b0011, 4),
    (0b1001, 5),
    (0b0111, 8),
    (0b1011, 9),
    (0b1101, 10),
    (0b1110, 11),
    (0b1111, 12),
];

pub const NO_ROTATION_MATCH: usize = 15;

/// Codepage 437 box-drawing glyphs.
const GLYPH_END_PIECE: [u8; 4] = [210, 198, 208, 181];
const GLYPH_T_CONNECTION: [u8; 4] = [203, 204, 202, 185];
const GLYPH_EDGE_NS: u8 = 186;
const GLYPH_EDGE_WE: u8 = 205;
const GLYPH_CORNER: [u8; 4] = [201, 200, 188, 187];
const GLYPH_CENTER: u8 = 206;

/// Rotation frame for `ALIGN_WORKBENCH` objects, by neighbor direction.
const WORKBENCH_INDEX: [usize; 4] = [2, 1, 0, 3];

/// Result of connectivity classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtile {
    pub kind: SubtileKind,
    pub index: usize,
    /// Index derived from `rotates_to` neighbors; tried before `index`.
    pub alt_index: usize,
    /// Box-drawing glyph for the piece, or the caller's symbol when unconnected.
    pub symbol: String,
}

impl Subtile {
    pub fn unconnected(symbol: &str) -> Self {
        Self { kind: SubtileKind::Unconnected, index: 0, alt_index: 0, symbol: symbol.to_string() }
    }
}

/// Object ids and connect groups present in one neighbor cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborInfo {
    pub ids: BTreeSet<String>,
    pub groups: BTreeSet<String>,
}

impl NeighborInfo {
    pub fn from_cell(cell: &MapCell, resolver: &dyn ObjectResolver, preferred_mods: &[String]) -> Self {
        let mut info = NeighborInfo::default();
        for id in cell.object_ids() {
            if let Some(object) = resolver.resolve(id, preferred_mods) {
                info.groups.extend(object.connect_groups);
            }
            info.ids.insert(id.to_string());
        }
        info
    }
}

fn glyph(code: u8) -> String {
    char::from(code).to_string()
}

fn rotation_mask(rotates: [bool; 4]) -> u8 {
    let [n, w, s, e] = rotates;
    (u8::from(n) << 3) | (u8::from(e) << 2) | (u8::from(s) << 1) | u8::from(w)
}

/// Alternate index of an unconnected piece from its `rotates_to` neighbors.
pub fn unconnected_rotation_index(rotates: [bool; 4]) -> usize {
    let mask = rotation_mask(rotates);
    UNCONNECTED_ROTATION.iter().find(|(m, _)| *m == mask).map_or(NO_ROTATION_MATCH, |(_, index)| *index)
}

/// Alternate index for edge-like pieces. Even orientations run N-S and are
/// told apart by W/E neighbors; odd orientations run E-W and use N/S.
pub fn edge_like_rotation_index(orientation: usize, rotates: [bool; 4]) -> usize {
    let [n, w, s, e] = rotates;
    if orientation % 2 == 0 {
        match (w, e) {
            (true, false) => 0,
            (false, true) => 2,
            (true, true) => 4,
            (false, false) => 6,
        }
    } else {
        match (n, s) {
            (false, true) => 1,
            (true, false) => 3,
            (true, true) => 5,
            (false, false) => 7,
        }
    }
}

/// Classify a piece from connected and rotates-toward flags, `[N, W, S, E]`.
pub fn classify(connected: [bool; 4], rotates: [bool; 4], fallback_symbol: &str) -> Subtile {
    let count = connected.iter().filter(|c| **c).count();
    let [n, w, s, e] = connected;

    let (kind, index, alt_index, symbol) = match count {
        1 => {
            let dir = connected.iter().position(|c| *c).unwrap_or(0);
            let index = [2, 3, 0, 1][dir];
            (SubtileKind::EndPiece, index, edge_like_rotation_index(index, rotates), glyph(GLYPH_END_PIECE[index]))
        }
        2 if n && s => (SubtileKind::Edge, 0, edge_like_rotation_index(0, rotates), glyph(GLYPH_EDGE_NS)),
        2 if w && e => (SubtileKind::Edge, 1, edge_like_rotation_index(1, rotates), glyph(GLYPH_EDGE_WE)),
        2 => {
            let index = match (n, w, s) {
                (true, true, _) => 2,
                (_, true, true) => 3,
                (_, _, true) => 0,
                _ => 1,
            };
            (SubtileKind::Corner, index, index, glyph(GLYPH_CORNER[index]))
        }
        3 => {
            let index = connected.iter().position(|c| !*c).unwrap_or(0);
            (SubtileKind::TConnection, index, index, glyph(GLYPH_T_CONNECTION[index]))
        }
        4 => (SubtileKind::Center, 0, 0, glyph(GLYPH_CENTER)),
        _ => (SubtileKind::Unconnected, 0, unconnected_rotation_index(rotates), fallback_symbol.to_string()),
    };
    Subtile { kind, index, alt_index, symbol }
}

/// Connected and rotates-toward flags for `object` against its neighbors.
pub fn connections(object: &ResolvedObject, neighbors: &[Option<NeighborInfo>; 4]) -> ([bool; 4], [bool; 4]) {
    let mut connected = [false; 4];
    let mut rotates = [false; 4];
    for (i, neighbor) in neighbors.iter().enumerate() {
        let Some(info) = neighbor else {
            continue;
        };
        connected[i] = info.ids.contains(&object.id) || !object.connects_to.is_disjoint(&info.groups);
        rotates[i] = !object.rotates_to.is_disjoint(&info.groups);
    }
    (connected, rotates)
}

/// Resolve the subtile for `object_id` given its four neighbor cells.
///
/// Objects unknown to the resolver are unconnected.
pub fn resolve_subtile(
    resolver: &dyn ObjectResolver,
    preferred_mods: &[String],
    object_id: &str,
    neighbors: &[Option<&MapCell>; 4],
    fallback_symbol: &str,
) -> Subtile {
    let Some(object) = resolver.resolve(object_id, preferred_mods) else {
        return Subtile::unconnected(fallback_symbol);
    };
    let infos = neighbors.map(|cell| cell.map(|c| NeighborInfo::from_cell(c, resolver, preferred_mods)));
    let (connected, rotates) = connections(&object, &infos);
    classify(connected, rotates, fallback_symbol)
}

/// Rotation frame for `ALIGN_WORKBENCH` objects: the first neighbor in
/// `[N, W, S, E]` holding a workbench decides. 0 when none does.
pub fn workbench_index(
    resolver: &dyn ObjectResolver,
    preferred_mods: &[String],
    neighbors: &[Option<&MapCell>; 4],
) -> usize {
    for (i, neighbor) in neighbors.iter().enumerate() {
        let Some(cell) = neighbor else {
            continue;
        };
        let has_workbench = cell
            .object_ids()
            .into_iter()
            .any(|id| resolver.resolve(id, preferred_mods).is_some_and(|o| o.workbench));
        if has_workbench {
            return WORKBENCH_INDEX[i];
        }
    }
    0
}
