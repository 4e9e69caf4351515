//! Tile identity, placed tiles and tileset entries

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 64-bit tile identifier: high 32 bits = owning tileset, low 32 bits = sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u64);

impl TileId {
    /// The empty tile every unpainted grid position holds
    pub const EMPTY: TileId = TileId(0);

    pub fn new(tileset_id: u32, sequence: u32) -> Self {
        TileId(((tileset_id as u64) << 32) | sequence as u64)
    }

    /// ID of the tileset this tile belongs to
    #[inline]
    pub fn tileset(&self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Per-tileset sequence number
    #[inline]
    pub fn sequence(&self) -> u32 {
        self.0 as u32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tileset(), self.sequence())
    }
}

/// Clockwise rotation in quarter turns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    /// The next quarter turn (wraps after 270)
    pub fn next(self) -> Rotation {
        match self {
            Rotation::None => Rotation::Clockwise90,
            Rotation::Clockwise90 => Rotation::Clockwise180,
            Rotation::Clockwise180 => Rotation::Clockwise270,
            Rotation::Clockwise270 => Rotation::None,
        }
    }

    pub fn quarter_turns(self) -> u8 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 1,
            Rotation::Clockwise180 => 2,
            Rotation::Clockwise270 => 3,
        }
    }
}

/// Identity and orientation of a placed tile.
///
/// Equality is what fill and replace match on; collision data is not part of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileProperties {
    pub id: TileId,
    #[serde(default)]
    pub rot: Rotation,
}

impl TileProperties {
    pub fn new(id: TileId) -> Self {
        Self {
            id,
            rot: Rotation::None,
        }
    }

    pub fn with_rotation(id: TileId, rot: Rotation) -> Self {
        Self { id, rot }
    }
}

/// Content of one grid position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub properties: TileProperties,
    /// Square collision sub-grid, row-major. Copied from the brush on paint.
    pub collision: Vec<bool>,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            properties: TileProperties::new(TileId::EMPTY),
            collision: vec![false],
        }
    }
}

impl Tile {
    /// Side length of the collision sub-grid
    pub fn collision_size(&self) -> usize {
        isqrt(self.collision.len())
    }
}

// Edge connection flags, used to filter tiles for auto-tiling
/// Connects to the left neighbour
pub const CONNECT_LEFT: u8 = 1;
/// Connects to the top neighbour
pub const CONNECT_TOP: u8 = 2;
/// Connects to the right neighbour
pub const CONNECT_RIGHT: u8 = 4;
/// Connects to the bottom neighbour
pub const CONNECT_BOTTOM: u8 = 8;

/// Which edges of a tile visually connect to neighbours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionMask(pub u8);

impl ConnectionMask {
    pub const NONE: ConnectionMask = ConnectionMask(0);
    pub const ALL: ConnectionMask =
        ConnectionMask(CONNECT_LEFT | CONNECT_TOP | CONNECT_RIGHT | CONNECT_BOTTOM);

    #[inline]
    pub fn contains(&self, other: ConnectionMask) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn toggle(&mut self, flag: u8) {
        self.0 ^= flag & Self::ALL.0;
    }

    /// The mask after a quarter turn clockwise (Left -> Top -> Right -> Bottom -> Left)
    pub fn rotated(&self) -> ConnectionMask {
        let m = self.0 & Self::ALL.0;
        ConnectionMask(((m << 1) & Self::ALL.0) | (m >> 3))
    }
}

/// One tile definition inside a tileset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileTexture {
    pub id: TileId,
    /// Name the image was imported under, also its file stem on disk
    pub name: String,
    #[serde(default)]
    pub connections: ConnectionMask,
    pub collision: Vec<bool>,
    /// Pixels, stored next to the tileset document rather than inside it
    #[serde(skip, default = "empty_image")]
    pub image: RgbaImage,
}

impl TileTexture {
    pub fn new(id: TileId, name: impl Into<String>, image: RgbaImage, collision_size: u32) -> Self {
        let side = collision_size.max(1) as usize;
        Self {
            id,
            name: name.into(),
            connections: ConnectionMask::NONE,
            collision: vec![false; side * side],
            image,
        }
    }

    /// The transparent placeholder used for "no tile"
    pub fn none() -> Self {
        Self::new(
            TileId::EMPTY,
            "none",
            RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0])),
            1,
        )
    }

    pub fn collision_size(&self) -> usize {
        isqrt(self.collision.len())
    }

    /// Flip one collision sub-cell. Returns the new value, or None when out of range.
    pub fn toggle_collision(&mut self, x: usize, y: usize) -> Option<bool> {
        let side = self.collision_size();
        if x >= side || y >= side {
            return None;
        }
        let cell = &mut self.collision[y * side + x];
        *cell = !*cell;
        Some(*cell)
    }

    pub fn set_connections(&mut self, mask: ConnectionMask) {
        self.connections = mask;
    }
}

pub(crate) fn empty_image() -> RgbaImage {
    RgbaImage::new(0, 0)
}

/// Integer square root for side lengths of square buffers
pub(crate) fn isqrt(n: usize) -> usize {
    let mut side = (n as f64).sqrt() as usize;
    while side * side > n {
        side -= 1;
    }
    while (side + 1) * (side + 1) <= n {
        side += 1;
    }
    side
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_id_halves() {
        let id = TileId::new(7, 42);
        assert_eq!(id.tileset(), 7);
        assert_eq!(id.sequence(), 42);
        assert_eq!(id.0, (7u64 << 32) | 42);
        assert!(TileId::EMPTY.is_empty());
        assert!(!id.is_empty());
    }

    #[test]
    fn test_rotation_cycles() {
        let mut r = Rotation::None;
        for turns in 1..=4 {
            r = r.next();
            assert_eq!(r.quarter_turns(), turns % 4);
        }
        assert_eq!(r, Rotation::None);
    }

    #[test]
    fn test_properties_equality_ignores_collision() {
        let id = TileId::new(1, 5);
        let a = Tile {
            properties: TileProperties::new(id),
            collision: vec![true],
        };
        let b = Tile {
            properties: TileProperties::new(id),
            collision: vec![false],
        };
        assert_eq!(a.properties, b.properties);
        assert_ne!(
            TileProperties::new(id),
            TileProperties::with_rotation(id, Rotation::Clockwise90)
        );
    }

    #[test]
    fn test_connection_mask_rotation() {
        let left = ConnectionMask(CONNECT_LEFT);
        assert_eq!(left.rotated(), ConnectionMask(CONNECT_TOP));
        assert_eq!(
            ConnectionMask(CONNECT_BOTTOM).rotated(),
            ConnectionMask(CONNECT_LEFT)
        );
        assert_eq!(left.rotated().rotated().rotated().rotated(), left);
        assert!(ConnectionMask::ALL.contains(ConnectionMask(CONNECT_RIGHT)));
    }

    #[test]
    fn test_toggle_collision() {
        let mut tt = TileTexture::new(TileId::new(1, 1), "grass", RgbaImage::new(4, 4), 2);
        assert_eq!(tt.collision.len(), 4);
        assert_eq!(tt.toggle_collision(1, 1), Some(true));
        assert!(tt.collision[3]);
        assert_eq!(tt.toggle_collision(2, 0), None);
    }

    #[test]
    fn test_default_tile_is_empty() {
        let tile = Tile::default();
        assert!(tile.properties.id.is_empty());
        assert_eq!(tile.collision_size(), 1);
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(17), 4);
    }
}
