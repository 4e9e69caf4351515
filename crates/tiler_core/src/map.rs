//! The sparse, cell-chunked tile map
//!
//! World tiles are grouped into square cells of `tiles_per_cell` tiles a side.
//! Cell 0 spans world tiles `-tpc/2 + 1 ..= tpc/2` on each axis; cells are
//! only created when something inside them is written.

use crate::brush::{Brush, CopyBrush};
use crate::cell::Cell;
use crate::error::TilerError;
use crate::mesh::PlaneMesh;
use crate::point::Point;
use crate::texture::CellTexture;
use crate::tile::Tile;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Largest number of tiles a copy brush may capture
pub const MAX_COPY_TILES: usize = 64 * 64;

/// Creation parameters for a map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    /// World size of one tile
    pub tile_size: f32,
    pub tiles_per_cell: u32,
    /// Pixel size of each cell's texture
    pub texture_resolution: u32,
    #[serde(default = "default_shader")]
    pub default_shader: String,
    /// Draw order among map layers
    #[serde(default)]
    pub layer: i32,
}

fn default_shader() -> String {
    "Diffuse".to_string()
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            tile_size: 1.0,
            tiles_per_cell: 16,
            texture_resolution: 1024,
            default_shader: default_shader(),
            layer: 0,
        }
    }
}

impl MapSettings {
    pub fn validate(&self) -> Result<(), TilerError> {
        let res = self.texture_resolution;
        if !res.is_power_of_two() || !(128..=4096).contains(&res) {
            return Err(TilerError::InvalidConfig(format!(
                "texture resolution {} must be a power of two between 128 and 4096",
                res
            )));
        }
        let tpc = self.tiles_per_cell;
        if !tpc.is_power_of_two() || !(2..=32).contains(&tpc) {
            return Err(TilerError::InvalidConfig(format!(
                "tiles per cell {} must be a power of two between 2 and 32",
                tpc
            )));
        }
        if self.tile_size.is_nan() || self.tile_size <= 0.0 {
            return Err(TilerError::InvalidConfig(format!(
                "tile size {} must be positive",
                self.tile_size
            )));
        }
        if res % tpc != 0 {
            return Err(TilerError::InvalidConfig(format!(
                "texture resolution {} is not divisible by {} tiles per cell",
                res, tpc
            )));
        }
        Ok(())
    }

    /// Pixel size of one tile inside a cell texture
    pub fn tile_resolution(&self) -> u32 {
        self.texture_resolution / self.tiles_per_cell
    }

    /// World size of one cell
    pub fn cell_size(&self) -> f32 {
        self.tile_size * self.tiles_per_cell as f32
    }
}

/// A paintable map made of lazily created cells
#[derive(Debug, Clone)]
pub struct TilerMap {
    pub id: Uuid,
    pub name: String,
    settings: MapSettings,
    cells: Vec<Cell>,
    shared_mesh: Option<Arc<PlaneMesh>>,
}

impl TilerMap {
    /// Create an empty map. Invalid settings are refused before anything is built.
    pub fn new(name: impl Into<String>, settings: MapSettings) -> Result<Self, TilerError> {
        settings.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            settings,
            cells: Vec::new(),
            shared_mesh: None,
        })
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    pub fn tiles_per_cell(&self) -> u32 {
        self.settings.tiles_per_cell
    }

    pub fn tile_size(&self) -> f32 {
        self.settings.tile_size
    }

    pub fn tile_resolution(&self) -> u32 {
        self.settings.tile_resolution()
    }

    pub fn layer(&self) -> i32 {
        self.settings.layer
    }

    pub fn set_layer(&mut self, layer: i32) {
        self.settings.layer = layer;
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Mesh shared by every cell, built with the first cell
    pub fn shared_mesh(&self) -> Option<&Arc<PlaneMesh>> {
        self.shared_mesh.as_ref()
    }

    /// Cell coordinate containing a world tile
    pub fn cell_coord(&self, tile: Point) -> Point {
        let tpc = self.settings.tiles_per_cell as i32;
        let axis = |t: i32| (2 * t - 1 + tpc).div_euclid(2 * tpc);
        Point::new(axis(tile.x), axis(tile.y))
    }

    /// Tile coordinate inside its cell, `0..tiles_per_cell` on each axis
    pub fn local_tile(&self, tile: Point) -> Point {
        let tpc = self.settings.tiles_per_cell as i32;
        tile - self.cell_coord(tile) * tpc + (tpc / 2 - 1)
    }

    /// World tile of a local tile in a cell; inverse of [`TilerMap::local_tile`]
    pub fn world_tile(&self, cell: Point, local: Point) -> Point {
        let tpc = self.settings.tiles_per_cell as i32;
        cell * tpc + local - (tpc / 2 - 1)
    }

    /// World tile under a map-local world position on the XZ plane
    pub fn world_to_tile(&self, x: f32, z: f32) -> Point {
        let size = self.settings.tile_size;
        Point::new((x / size).round() as i32, (z / size).round() as i32)
    }

    pub fn find_cell_index(&self, coord: Point) -> Option<usize> {
        self.cells.iter().position(|c| c.coord == coord)
    }

    pub fn find_cell(&self, coord: Point) -> Option<&Cell> {
        self.cells.iter().find(|c| c.coord == coord)
    }

    pub fn find_cell_mut(&mut self, coord: Point) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|c| c.coord == coord)
    }

    /// The cell holding a world tile, if it exists
    pub fn find_cell_from_tile(&self, tile: Point) -> Option<&Cell> {
        self.find_cell(self.cell_coord(tile))
    }

    /// Index of the cell holding a world tile, creating it if needed
    pub fn find_or_create_cell_index(&mut self, tile: Point) -> usize {
        let coord = self.cell_coord(tile);
        match self.find_cell_index(coord) {
            Some(index) => index,
            None => self.create_cell(coord),
        }
    }

    pub fn find_or_create_cell(&mut self, tile: Point) -> &mut Cell {
        let index = self.find_or_create_cell_index(tile);
        &mut self.cells[index]
    }

    pub fn cell_at(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn cell_at_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    /// The tile at a world tile. Unpainted regions have no tile.
    pub fn get_tile(&self, tile: Point) -> Option<&Tile> {
        let cell = self.find_cell_from_tile(tile)?;
        let local = self.local_tile(tile);
        match cell.tile(local) {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    }

    /// The tile at a world tile, creating its cell first
    pub fn get_or_create_tile(&mut self, tile: Point) -> Option<&Tile> {
        let local = self.local_tile(tile);
        let cell = self.find_or_create_cell(tile);
        match cell.tile(local) {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        }
    }

    /// Capture what is painted at a world tile, creating its cell first
    pub fn get_tile_brush(&mut self, tile: Point) -> Result<Brush, TilerError> {
        let local = self.local_tile(tile);
        self.find_or_create_cell(tile).tile_brush(local)
    }

    /// Capture the inclusive rectangle between two world tiles as a copy brush.
    /// Tiles in cells that were never created are captured as empty.
    pub fn capture_copy_brush(&self, a: Point, b: Point) -> Result<CopyBrush, TilerError> {
        let min = Point::new(a.x.min(b.x), a.y.min(b.y));
        let max = Point::new(a.x.max(b.x), a.y.max(b.y));
        let width = i64::from(max.x) - i64::from(min.x) + 1;
        let height = i64::from(max.y) - i64::from(min.y) + 1;
        let too_large = TilerError::RegionTooLarge { width, height };
        let count = width
            .checked_mul(height)
            .filter(|&n| n <= MAX_COPY_TILES as i64)
            .ok_or(too_large)?;
        let (width, height) = (width as u32, height as u32);

        let mut brushes = Vec::with_capacity(count as usize);
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                let tile = Point::new(x, y);
                let brush = match self.find_cell_from_tile(tile) {
                    Some(cell) => cell.tile_brush(self.local_tile(tile))?,
                    None => Brush::empty(self.tile_resolution()),
                };
                brushes.push(brush);
            }
        }
        CopyBrush::new(width, height, brushes)
    }

    /// Cells whose texture changed since the last save
    pub fn dirty_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| c.is_dirty())
    }

    fn mesh(&mut self) -> Arc<PlaneMesh> {
        let size = self.settings.cell_size();
        self.shared_mesh
            .get_or_insert_with(|| Arc::new(PlaneMesh::new(size, size, 1)))
            .clone()
    }

    fn create_cell(&mut self, coord: Point) -> usize {
        let mesh = self.mesh();
        let cell = Cell::new(
            coord,
            self.settings.tiles_per_cell,
            self.settings.texture_resolution,
            mesh,
        );
        tracing::debug!("Created cell {} in map {}", cell.name(), self.name);
        self.cells.push(cell);
        self.cells.len() - 1
    }

    /// Snapshot of the map's tile data, without pixels
    pub fn to_document(&self) -> MapDocument {
        MapDocument {
            version: 1,
            id: self.id,
            name: self.name.clone(),
            settings: self.settings.clone(),
            cells: self
                .cells
                .iter()
                .map(|c| CellDocument {
                    coord: c.coord,
                    tiles: c.tiles().to_vec(),
                })
                .collect(),
        }
    }

    /// Rebuild a map from its document. `texture_for` supplies each cell's
    /// pixels; a cell without one comes back with no texture.
    pub fn from_document<F>(doc: MapDocument, mut texture_for: F) -> Result<Self, TilerError>
    where
        F: FnMut(&CellDocument) -> Option<CellTexture>,
    {
        let mut map = TilerMap::new(doc.name, doc.settings)?;
        map.id = doc.id;
        for cell_doc in doc.cells {
            let texture = texture_for(&cell_doc);
            if texture.is_none() {
                tracing::warn!("Cell {} has no texture", cell_doc.coord);
            }
            let mesh = map.mesh();
            let cell = Cell::from_parts(
                cell_doc.coord,
                map.settings.tiles_per_cell,
                cell_doc.tiles,
                texture,
                mesh,
            )?;
            map.cells.push(cell);
        }
        Ok(map)
    }
}

/// Stored tile data of one cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellDocument {
    pub coord: Point,
    pub tiles: Vec<Tile>,
}

/// On-disk form of a map. Cell textures live beside it as PNG files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(bevy::asset::Asset, bevy::reflect::TypePath))]
pub struct MapDocument {
    /// Format version for future compatibility
    pub version: u32,
    pub id: Uuid,
    pub name: String,
    pub settings: MapSettings,
    pub cells: Vec<CellDocument>,
}
