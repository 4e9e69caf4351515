//! Paint, fill and replace on a map, recording prior state for undo

use crate::brush::{Brush, NormalBrush, Stamp};
use crate::map::TilerMap;
use crate::point::Point;
use crate::undo::UndoPaint;
use std::collections::VecDeque;

/// An editing pass over one map.
///
/// Every tile whose identity changes gets its prior state pushed to the undo
/// log first. Cell textures touched by an operation are committed once when
/// the operation finishes.
pub struct TilerMapEdit<'a> {
    map: &'a mut TilerMap,
    undo: &'a mut UndoPaint,
    /// Cell indices with uncommitted texture writes
    touched: Vec<usize>,
}

impl<'a> TilerMapEdit<'a> {
    pub fn new(map: &'a mut TilerMap, undo: &'a mut UndoPaint) -> Self {
        Self {
            map,
            undo,
            touched: Vec::new(),
        }
    }

    pub fn map(&self) -> &TilerMap {
        self.map
    }

    /// Stamp a brush centered on `point`. Returns the number of tiles changed.
    pub fn paint<S: Stamp + ?Sized>(&mut self, point: Point, brush: &S, brush_size: u32) -> usize {
        let footprint = brush.footprint(brush_size);
        let mut changed = 0;

        for offset in footprint.offsets() {
            let Some(data) = brush.get_brush(offset.x, offset.y) else {
                continue;
            };
            let target = point + offset;
            let cell = self.map.find_or_create_cell_index(target);
            let local = self.map.local_tile(target);
            if self.change_tile(cell, local, data).is_some() {
                changed += 1;
            }
        }

        self.apply();
        changed
    }

    /// Flood-fill the 4-connected region matching the tile at `start`.
    ///
    /// Only existing cells are spread into; the start cell is created if needed.
    pub fn fill(&mut self, start: Point, brush: &NormalBrush) -> usize {
        let Some(target) = self.map.get_or_create_tile(start).map(|t| t.properties) else {
            return 0;
        };
        let Some(replacement) = brush.get_brush(start.x, start.y) else {
            return 0;
        };
        if replacement.properties == target {
            return 0;
        }

        let mut changed = 0;
        let mut queue = VecDeque::from([start]);
        while let Some(p) = queue.pop_front() {
            let matches = self
                .map
                .get_tile(p)
                .is_some_and(|t| t.properties == target);
            if !matches {
                continue;
            }
            let Some(cell) = self.map.find_cell_index(self.map.cell_coord(p)) else {
                continue;
            };
            let local = self.map.local_tile(p);

            // A failed write leaves the tile matching; spreading from it would never end
            if self.change_tile(cell, local, replacement).is_none() {
                continue;
            }
            changed += 1;

            queue.push_back(Point::new(p.x - 1, p.y));
            queue.push_back(Point::new(p.x + 1, p.y));
            queue.push_back(Point::new(p.x, p.y - 1));
            queue.push_back(Point::new(p.x, p.y + 1));
        }

        self.apply();
        changed
    }

    /// Rewrite every tile in the map that matches the tile at `start`
    pub fn replace(&mut self, start: Point, brush: &NormalBrush) -> usize {
        let Some(target) = self.map.get_or_create_tile(start).map(|t| t.properties) else {
            return 0;
        };
        let Some(replacement) = brush.get_brush(start.x, start.y) else {
            return 0;
        };
        if replacement.properties == target {
            return 0;
        }

        let mut changed = 0;
        for cell_index in 0..self.map.cells().len() {
            let matching: Vec<Point> = match self.map.cell_at(cell_index) {
                Some(cell) => cell
                    .tiles()
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.properties == target)
                    .map(|(i, _)| cell.local_of(i))
                    .collect(),
                None => continue,
            };
            for local in matching {
                if self.change_tile(cell_index, local, replacement).is_some() {
                    changed += 1;
                }
            }
        }

        self.apply();
        changed
    }

    /// Write one tile if its identity differs from `data`.
    ///
    /// Returns the index of the touched cell, or None when nothing was written
    /// (same identity, bad local coordinate or missing texture).
    pub fn change_tile(&mut self, cell_index: usize, local: Point, data: &Brush) -> Option<usize> {
        let cell = self.map.cell_at_mut(cell_index)?;
        let current = match cell.tile(local) {
            Ok(tile) => tile.properties,
            Err(e) => {
                tracing::warn!("{}", e);
                return None;
            }
        };
        if current == data.properties {
            return None;
        }

        let old = match cell.tile_brush(local) {
            Ok(brush) => brush,
            Err(e) => {
                tracing::warn!("Skipping tile {} in cell {}: {}", local, cell.coord, e);
                return None;
            }
        };
        let (x, y, size) = cell.tile_region(local)?;
        let colors = data.colors_at(size);
        let coord = cell.coord;

        let texture = cell.texture_mut()?;
        if !texture.set_pixels(x, y, size, size, &colors) {
            tracing::warn!("Could not write pixels of tile {} in cell {}", local, coord);
            return None;
        }
        self.undo.push(coord, local, old);

        let tile = cell.tile_mut(local).ok()?;
        tile.properties = data.properties;
        tile.collision = data.collision.clone();
        cell.mark_dirty();

        if !self.touched.contains(&cell_index) {
            self.touched.push(cell_index);
        }
        Some(cell_index)
    }

    /// Commit every texture written since the last apply
    pub fn apply(&mut self) {
        for index in self.touched.drain(..) {
            if let Some(texture) = self.map.cell_at_mut(index).and_then(|c| c.texture_mut()) {
                texture.apply();
            }
        }
    }
}
