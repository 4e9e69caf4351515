//! Tilesets: the palette of tile textures a map is painted from

use crate::error::TilerError;
use crate::tile::{ConnectionMask, TileId, TileTexture};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Creation parameters for a tileset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetSettings {
    pub name: String,
    /// Pixel size of each tile texture
    pub tile_size: u32,
    /// Side length of each tile's collision sub-grid
    pub collision: u32,
}

impl Default for TilesetSettings {
    fn default() -> Self {
        Self {
            name: "Tileset".to_string(),
            tile_size: 128,
            collision: 1,
        }
    }
}

impl TilesetSettings {
    pub fn validate(&self) -> Result<(), TilerError> {
        if !self.tile_size.is_power_of_two() || !(16..=1024).contains(&self.tile_size) {
            return Err(TilerError::InvalidConfig(format!(
                "tile size {} must be a power of two between 16 and 1024",
                self.tile_size
            )));
        }
        if self.collision < 1 {
            return Err(TilerError::InvalidConfig(
                "collision resolution must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A collection of tile textures sharing one tile size and collision resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tileset {
    pub id: Uuid,
    /// Embedded in the high half of every TileId this tileset hands out
    pub tileset_id: u32,
    pub settings: TilesetSettings,
    next_tile_id: u32,
    assets: Vec<TileTexture>,
    #[serde(skip, default = "TileTexture::none")]
    none: TileTexture,
}

impl Tileset {
    /// Create an empty tileset. Fails if the settings are out of range.
    pub fn new(settings: TilesetSettings) -> Result<Self, TilerError> {
        settings.validate()?;
        let id = Uuid::new_v4();
        Ok(Self {
            id,
            tileset_id: (id.as_u128() as u32).max(1),
            settings,
            next_tile_id: 0,
            assets: Vec::new(),
            none: TileTexture::none(),
        })
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn tile_size(&self) -> u32 {
        self.settings.tile_size
    }

    pub fn collision(&self) -> u32 {
        self.settings.collision
    }

    /// Import an image as a tile.
    ///
    /// An asset with the same name is returned as-is. New images are resized
    /// to the tile size and get an all-clear collision grid.
    pub fn add_asset(&mut self, name: &str, image: &RgbaImage) -> TileId {
        if let Some(existing) = self.assets.iter().find(|a| a.name == name) {
            return existing.id;
        }

        self.next_tile_id += 1;
        let id = TileId::new(self.tileset_id, self.next_tile_id);
        let size = self.settings.tile_size;
        let pixels = if image.dimensions() == (size, size) {
            image.clone()
        } else {
            imageops::resize(image, size, size, FilterType::Nearest)
        };

        self.assets
            .push(TileTexture::new(id, name, pixels, self.settings.collision));
        tracing::debug!("Added tile {} ({}) to tileset {}", name, id, self.name());
        id
    }

    pub fn remove_asset(&mut self, id: TileId) -> Option<TileTexture> {
        let index = self.assets.iter().position(|a| a.id == id)?;
        Some(self.assets.remove(index))
    }

    /// Look up a tile texture. The empty id resolves to the transparent placeholder.
    pub fn asset(&self, id: TileId) -> Option<&TileTexture> {
        if id.is_empty() {
            return Some(&self.none);
        }
        self.assets.iter().find(|a| a.id == id)
    }

    /// Like [`Tileset::asset`], but an unknown id is an error
    pub fn tile(&self, id: TileId) -> Result<&TileTexture, TilerError> {
        self.asset(id).ok_or(TilerError::UnknownTile(id))
    }

    pub fn asset_mut(&mut self, id: TileId) -> Option<&mut TileTexture> {
        self.assets.iter_mut().find(|a| a.id == id)
    }

    pub fn assets(&self) -> &[TileTexture] {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut [TileTexture] {
        &mut self.assets
    }

    /// True if the id was minted by this tileset
    pub fn owns(&self, id: TileId) -> bool {
        id.tileset() == self.tileset_id
    }

    /// Tiles whose connection mask passes the filter
    pub fn filtered(&self, filter: &TileFilter) -> Vec<&TileTexture> {
        self.assets.iter().filter(|a| filter.matches(a)).collect()
    }
}

/// Connection-mask filter for picking auto-tile candidates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileFilter {
    pub connections: ConnectionMask,
    /// Also accept tiles that match once the filter is rotated
    pub with_rotation: bool,
    /// Require an exact mask rather than a superset
    pub exclusive: bool,
}

impl TileFilter {
    pub fn matches(&self, tile: &TileTexture) -> bool {
        let mut mask = self.connections;
        let turns = if self.with_rotation { 4 } else { 1 };
        for _ in 0..turns {
            if self.accepts(tile.connections, mask) {
                return true;
            }
            mask = mask.rotated();
        }
        false
    }

    fn accepts(&self, tile: ConnectionMask, mask: ConnectionMask) -> bool {
        if self.exclusive {
            tile == mask
        } else {
            tile.contains(mask)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{CONNECT_BOTTOM, CONNECT_LEFT, CONNECT_RIGHT, CONNECT_TOP};
    use image::Rgba;

    fn settings(tile_size: u32, collision: u32) -> TilesetSettings {
        TilesetSettings {
            name: "test".to_string(),
            tile_size,
            collision,
        }
    }

    #[test]
    fn test_settings_validation() {
        assert!(settings(16, 1).validate().is_ok());
        assert!(settings(1024, 4).validate().is_ok());
        assert!(settings(8, 1).validate().is_err());
        assert!(settings(2048, 1).validate().is_err());
        assert!(settings(100, 1).validate().is_err());
        assert!(settings(64, 0).validate().is_err());
        assert!(Tileset::new(settings(100, 1)).is_err());
    }

    #[test]
    fn test_add_asset_ids_and_dedup() {
        let mut tileset = Tileset::new(settings(16, 2)).unwrap();
        let image = RgbaImage::from_pixel(32, 32, Rgba([255, 0, 0, 255]));

        let first = tileset.add_asset("grass", &image);
        let second = tileset.add_asset("stone", &image);
        let again = tileset.add_asset("grass", &image);

        assert_eq!(first.sequence(), 1);
        assert_eq!(second.sequence(), 2);
        assert_eq!(first, again);
        assert_eq!(first.tileset(), tileset.tileset_id);
        assert!(tileset.owns(second));
        assert_eq!(tileset.assets().len(), 2);

        let grass = tileset.asset(first).unwrap();
        assert_eq!(grass.image.dimensions(), (16, 16));
        assert_eq!(grass.collision, vec![false; 4]);
    }

    #[test]
    fn test_empty_id_is_transparent_placeholder() {
        let tileset = Tileset::new(settings(16, 1)).unwrap();
        let none = tileset.asset(TileId::EMPTY).unwrap();
        assert_eq!(none.image.dimensions(), (1, 1));
        assert_eq!(none.image.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_remove_asset() {
        let mut tileset = Tileset::new(settings(16, 1)).unwrap();
        let id = tileset.add_asset("water", &RgbaImage::new(16, 16));
        assert!(tileset.remove_asset(id).is_some());
        assert!(tileset.asset(id).is_none());
        assert!(tileset.remove_asset(id).is_none());

        // Sequence numbers are never reused
        let next = tileset.add_asset("water", &RgbaImage::new(16, 16));
        assert_eq!(next.sequence(), 2);
    }

    #[test]
    fn test_filter_containment_and_exclusive() {
        let mut tileset = Tileset::new(settings(16, 1)).unwrap();
        let corner = tileset.add_asset("corner", &RgbaImage::new(16, 16));
        let edge = tileset.add_asset("edge", &RgbaImage::new(16, 16));
        tileset
            .asset_mut(corner)
            .unwrap()
            .set_connections(ConnectionMask(CONNECT_LEFT | CONNECT_TOP));
        tileset
            .asset_mut(edge)
            .unwrap()
            .set_connections(ConnectionMask(CONNECT_LEFT));

        let loose = TileFilter {
            connections: ConnectionMask(CONNECT_LEFT),
            ..Default::default()
        };
        assert_eq!(tileset.filtered(&loose).len(), 2);

        let exact = TileFilter {
            exclusive: true,
            ..loose
        };
        let names: Vec<_> = tileset.filtered(&exact).iter().map(|t| t.name.clone()).collect();
        assert_eq!(names, vec!["edge".to_string()]);
    }

    #[test]
    fn test_filter_with_rotation() {
        let mut tile = TileTexture::new(TileId::new(1, 1), "pipe", RgbaImage::new(1, 1), 1);
        tile.set_connections(ConnectionMask(CONNECT_TOP | CONNECT_BOTTOM));

        let horizontal = TileFilter {
            connections: ConnectionMask(CONNECT_LEFT | CONNECT_RIGHT),
            with_rotation: false,
            exclusive: true,
        };
        assert!(!horizontal.matches(&tile));

        let rotating = TileFilter {
            with_rotation: true,
            ..horizontal
        };
        assert!(rotating.matches(&tile));
    }
}
