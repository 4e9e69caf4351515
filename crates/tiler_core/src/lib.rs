//! Core data structures and algorithms for the Tiler map painter
//!
//! This crate provides:
//! - `TilerMap` - A sparse map of square cells, each holding a tile grid and one texture
//! - `Tileset` - Tile textures with connection masks and collision sub-grids
//! - `NormalBrush` / `CopyBrush` - Stamps applied by paint, fill and replace
//! - `TilerMapEdit` - Paint, flood fill and map-wide replace
//! - `UndoPaint` - Bounded undo/redo log of tile writes
//! - `find_rects` - Greedy rectangle merging used to build colliders

mod brush;
mod cell;
mod collision;
mod combine;
mod edit;
mod error;
mod map;
mod mesh;
mod point;
mod texture;
mod tile;
mod tileset;
mod undo;

pub use brush::{
    clamp_brush_size, AnyBrush, Brush, CopyBrush, Footprint, NormalBrush, Stamp, MAX_BRUSH_SIZE,
    MIN_BRUSH_SIZE,
};
pub use cell::Cell;
pub use collision::{
    cell_boxes, map_boxes, map_collision_resolution, merge_cell_collision, BoxKind, ColliderBox,
};
pub use combine::{find_rects, MergedRect, OccupancyGrid, RectMap, RectSize};
pub use edit::TilerMapEdit;
pub use error::TilerError;
pub use map::{CellDocument, MapDocument, MapSettings, TilerMap, MAX_COPY_TILES};
pub use mesh::PlaneMesh;
pub use point::Point;
pub use texture::{CellTexture, CLEAR_COLOR};
pub use tile::{
    ConnectionMask, Rotation, Tile, TileId, TileProperties, TileTexture, CONNECT_BOTTOM,
    CONNECT_LEFT, CONNECT_RIGHT, CONNECT_TOP,
};
pub use tileset::{TileFilter, Tileset, TilesetSettings};
pub use undo::{UndoPaint, UndoRecord, MAX_UNDOS};

/// Re-export of the pixel types used in the public API
pub use image::{Rgba, RgbaImage};
