//! A square chunk of the map: a fixed grid of tiles plus one backing texture

use crate::brush::Brush;
use crate::error::TilerError;
use crate::mesh::PlaneMesh;
use crate::point::Point;
use crate::texture::CellTexture;
use crate::tile::Tile;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Cell {
    /// Cell coordinate (in cells, not tiles)
    pub coord: Point,
    tiles_per_cell: u32,
    /// Row-major, `tiles_per_cell²` entries
    tiles: Vec<Tile>,
    texture: Option<CellTexture>,
    mesh: Arc<PlaneMesh>,
    dirty: bool,
}

impl Cell {
    /// A cell of empty tiles over a cleared texture. New cells start dirty
    /// so their texture gets written on the next save.
    pub fn new(coord: Point, tiles_per_cell: u32, texture_resolution: u32, mesh: Arc<PlaneMesh>) -> Self {
        let count = (tiles_per_cell * tiles_per_cell) as usize;
        Self {
            coord,
            tiles_per_cell,
            tiles: vec![Tile::default(); count],
            texture: Some(CellTexture::new(texture_resolution)),
            mesh,
            dirty: true,
        }
    }

    /// Rebuild a cell from stored tiles and pixels
    pub fn from_parts(
        coord: Point,
        tiles_per_cell: u32,
        tiles: Vec<Tile>,
        texture: Option<CellTexture>,
        mesh: Arc<PlaneMesh>,
    ) -> Result<Self, TilerError> {
        let count = (tiles_per_cell * tiles_per_cell) as usize;
        if tiles.len() != count {
            return Err(TilerError::TileOutOfRange {
                index: tiles.len() as i64,
                len: count,
            });
        }
        Ok(Self {
            coord,
            tiles_per_cell,
            tiles,
            texture,
            mesh,
            dirty: false,
        })
    }

    /// Name the cell is stored under
    pub fn name(&self) -> String {
        self.coord.to_string()
    }

    pub fn tiles_per_cell(&self) -> u32 {
        self.tiles_per_cell
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Flat index of a local tile coordinate
    pub fn index_of(&self, local: Point) -> Result<usize, TilerError> {
        let tpc = self.tiles_per_cell as i32;
        if local.x < 0 || local.y < 0 || local.x >= tpc || local.y >= tpc {
            return Err(TilerError::TileOutOfRange {
                index: local.y as i64 * tpc as i64 + local.x as i64,
                len: self.tiles.len(),
            });
        }
        Ok((local.y * tpc + local.x) as usize)
    }

    /// Local coordinate of a flat index
    pub fn local_of(&self, index: usize) -> Point {
        let tpc = self.tiles_per_cell as usize;
        Point::new((index % tpc) as i32, (index / tpc) as i32)
    }

    pub fn tile(&self, local: Point) -> Result<&Tile, TilerError> {
        let index = self.index_of(local)?;
        Ok(&self.tiles[index])
    }

    pub fn tile_mut(&mut self, local: Point) -> Result<&mut Tile, TilerError> {
        let index = self.index_of(local)?;
        Ok(&mut self.tiles[index])
    }

    pub fn texture(&self) -> Option<&CellTexture> {
        self.texture.as_ref()
    }

    pub fn texture_mut(&mut self) -> Option<&mut CellTexture> {
        self.texture.as_mut()
    }

    /// Drop the backing texture, as when its file is deleted out from under the map
    pub fn release_texture(&mut self) -> Option<CellTexture> {
        self.texture.take()
    }

    pub fn set_texture(&mut self, texture: CellTexture) {
        self.texture = Some(texture);
    }

    /// Side length in pixels of one tile's region of the texture
    pub fn tile_pixels(&self) -> Option<u32> {
        self.texture
            .as_ref()
            .map(|t| t.width() / self.tiles_per_cell)
    }

    /// Pixel rectangle (x, y, size) of a local tile
    pub fn tile_region(&self, local: Point) -> Option<(u32, u32, u32)> {
        let size = self.tile_pixels()?;
        Some((local.x as u32 * size, local.y as u32 * size, size))
    }

    /// Capture what is painted at a local tile: its pixels, identity and collision
    pub fn tile_brush(&self, local: Point) -> Result<Brush, TilerError> {
        let tile = self.tile(local)?;
        let texture = self
            .texture
            .as_ref()
            .ok_or(TilerError::MissingTexture { cell: self.coord })?;
        let size = texture.width() / self.tiles_per_cell;
        let colors = texture
            .get_pixels(local.x as u32 * size, local.y as u32 * size, size, size)
            .ok_or(TilerError::MissingTexture { cell: self.coord })?;
        Ok(Brush::new(colors, tile.properties, tile.collision.clone()))
    }

    /// Map-local position of the cell's origin
    pub fn world_position(&self, tile_size: f32) -> [f32; 3] {
        let cell_size = tile_size * self.tiles_per_cell as f32;
        [
            self.coord.x as f32 * cell_size + tile_size / 2.0,
            0.0,
            self.coord.y as f32 * cell_size + tile_size / 2.0,
        ]
    }

    pub fn mesh(&self) -> &Arc<PlaneMesh> {
        &self.mesh
    }

    /// True when the texture changed since it was last saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// True if every tile is still empty
    pub fn is_empty(&self) -> bool {
        self.tiles.iter().all(|t| t.properties.id.is_empty())
    }
}
