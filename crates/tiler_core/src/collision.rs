//! Box colliders and navigation blockers from painted collision data
//!
//! Each cell's per-tile collision grids are stitched into one cell-wide
//! occupancy grid, merged into rectangles, and turned into boxes positioned
//! in map-local world units.

use crate::brush::scale_square;
use crate::cell::Cell;
use crate::combine::{find_rects, OccupancyGrid};
use crate::map::TilerMap;
use crate::point::Point;
use serde::{Deserialize, Serialize};

/// What a generated box is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoxKind {
    /// Physics collider, raised half a unit so it sits on the plane
    Collider,
    /// Solid block excluded from navigation, centered on the plane
    NavBlocker,
}

impl BoxKind {
    fn elevation(self) -> f32 {
        match self {
            BoxKind::Collider => 0.5,
            BoxKind::NavBlocker => 0.0,
        }
    }
}

/// An axis-aligned box on the map plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColliderBox {
    pub kind: BoxKind,
    /// Cell the box was generated for
    pub cell: Point,
    /// Center in map-local world units
    pub center: [f32; 3],
    pub size: [f32; 3],
}

/// Largest collision sub-grid side used by any tile of the map (at least 1)
pub fn map_collision_resolution(map: &TilerMap) -> usize {
    map.cells()
        .iter()
        .flat_map(|c| c.tiles())
        .map(|t| t.collision_size())
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Stitch a cell's tile collision grids into one grid of side
/// `tiles_per_cell * resolution`. Coarser tile grids are upsampled.
pub fn merge_cell_collision(cell: &Cell, resolution: usize) -> OccupancyGrid {
    let tpc = cell.tiles_per_cell() as usize;
    let resolution = resolution.max(1);
    let mut grid = OccupancyGrid::new(tpc * resolution, tpc * resolution);

    for (index, tile) in cell.tiles().iter().enumerate() {
        let side = tile.collision_size();
        if side == 0 || !tile.collision.iter().any(|&c| c) {
            continue;
        }
        let scaled = scale_square(&tile.collision, side, resolution);
        let (ox, oy) = ((index % tpc) * resolution, (index / tpc) * resolution);
        for (i, &solid) in scaled.iter().enumerate() {
            if solid {
                grid.set(ox + i % resolution, oy + i / resolution, true);
            }
        }
    }
    grid
}

/// Boxes covering the solid parts of one cell
pub fn cell_boxes(map: &TilerMap, cell: &Cell, resolution: usize, kind: BoxKind) -> Vec<ColliderBox> {
    let grid = merge_cell_collision(cell, resolution);
    let rects = find_rects(&grid);
    let side = grid.width();
    if side == 0 {
        return Vec::new();
    }

    let cell_size = map.settings().cell_size();
    let per = cell_size / side as f32;
    let inset = cell_size / 2.0 - per / 2.0;
    let origin = cell.world_position(map.tile_size());

    let mut boxes = Vec::with_capacity(rects.len());
    for y in 0..rects.height() {
        for x in 0..rects.width() {
            let Some(size) = rects.anchor(x, y) else {
                continue;
            };
            let (w, h) = (size.width as f32, size.height as f32);
            let cx = per * ((2 * x) as f32 + w - 1.0) / 2.0 - inset;
            let cz = per * ((2 * y) as f32 - h + 1.0) / 2.0 - inset;
            boxes.push(ColliderBox {
                kind,
                cell: cell.coord,
                center: [origin[0] + cx, kind.elevation(), origin[2] + cz],
                size: [w * per, 1.0, h * per],
            });
        }
    }
    boxes
}

/// Boxes for every cell of the map
pub fn map_boxes(map: &TilerMap, kind: BoxKind) -> Vec<ColliderBox> {
    let resolution = map_collision_resolution(map);
    let boxes: Vec<ColliderBox> = map
        .cells()
        .iter()
        .flat_map(|cell| cell_boxes(map, cell, resolution, kind))
        .collect();
    tracing::info!(
        "Generated {} {:?} boxes for map {} ({} cells)",
        boxes.len(),
        kind,
        map.name,
        map.cells().len()
    );
    boxes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapSettings;

    fn map() -> TilerMap {
        TilerMap::new(
            "collision",
            MapSettings {
                tile_size: 1.0,
                tiles_per_cell: 4,
                texture_resolution: 128,
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn set_collision(map: &mut TilerMap, tile: Point, collision: Vec<bool>) {
        let local = map.local_tile(tile);
        map.find_or_create_cell(tile).tile_mut(local).unwrap().collision = collision;
    }

    #[test]
    fn test_empty_map_has_no_boxes() {
        let mut map = map();
        assert_eq!(map_collision_resolution(&map), 1);
        map.find_or_create_cell(Point::ZERO);
        assert!(map_boxes(&map, BoxKind::Collider).is_empty());
    }

    #[test]
    fn test_merge_places_tiles() {
        let mut map = map();
        // Local (0, 0) is world (-1, -1); local (3, 1) is world (2, 0)
        set_collision(&mut map, Point::new(-1, -1), vec![true]);
        set_collision(&mut map, Point::new(2, 0), vec![false, true, false, false]);

        let resolution = map_collision_resolution(&map);
        assert_eq!(resolution, 2);

        let grid = merge_cell_collision(&map.cells()[0], resolution);
        assert_eq!(grid.width(), 8);
        // 1x1 grid upsampled to 2x2
        assert!(grid.get(0, 0) && grid.get(1, 0) && grid.get(0, 1) && grid.get(1, 1));
        assert!(grid.get(7, 2));
        assert!(!grid.get(6, 2));
        assert_eq!(grid.count_occupied(), 5);
    }

    #[test]
    fn test_two_by_two_block_is_one_box() {
        let mut map = map();
        for (x, y) in [(-1, -1), (0, -1), (-1, 0), (0, 0)] {
            set_collision(&mut map, Point::new(x, y), vec![true]);
        }

        let boxes = map_boxes(&map, BoxKind::Collider);
        assert_eq!(boxes.len(), 1);
        let b = &boxes[0];
        assert_eq!(b.size, [2.0, 1.0, 2.0]);
        // Cell origin is (0.5, 0, 0.5); the block covers local x 0..2, z 0..2
        // of a 4-wide cell centered there, so its center sits 1 unit in from the corner
        assert_eq!(b.center, [0.5 - 1.0, 0.5, 0.5 - 1.0]);
        assert_eq!(b.cell, Point::ZERO);
    }

    #[test]
    fn test_nav_blockers_sit_on_plane() {
        let mut map = map();
        set_collision(&mut map, Point::new(2, 2), vec![true]);
        let boxes = map_boxes(&map, BoxKind::NavBlocker);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].center[1], 0.0);
        assert_eq!(boxes[0].size, [1.0, 1.0, 1.0]);
        // Local (3, 3): 1.5 units from the cell center on both axes
        assert_eq!(boxes[0].center, [0.5 + 1.5, 0.0, 0.5 + 1.5]);
    }

    #[test]
    fn test_boxes_cover_collision_exactly() {
        let mut map = map();
        for (x, y) in [(-1, -1), (0, -1), (1, -1), (-1, 0), (2, 2), (3, 3)] {
            set_collision(&mut map, Point::new(x, y), vec![true]);
        }
        let boxes = map_boxes(&map, BoxKind::Collider);
        let area: f32 = boxes.iter().map(|b| b.size[0] * b.size[2]).sum();
        assert_eq!(area, 6.0);
        // (3, 3) lives in cell (1, 1)
        assert!(boxes.iter().any(|b| b.cell == Point::new(1, 1)));
    }
}
