//! Map and tileset file save/load operations

use super::{asset_dir, cell_texture_path, tile_texture_path};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use tiler_core::{CellTexture, MapDocument, TilerMap, Tileset};

#[derive(Debug)]
pub enum StoreError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ImageError(String),
    /// Two layers would be written to the same file
    DuplicateLayerPath(PathBuf),
    NoPath,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IoError(e) => write!(f, "IO error: {}", e),
            StoreError::ParseError(e) => write!(f, "Parse error: {}", e),
            StoreError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            StoreError::ImageError(e) => write!(f, "Image error: {}", e),
            StoreError::DuplicateLayerPath(p) => {
                write!(f, "More than one layer is saved to {:?}", p)
            }
            StoreError::NoPath => write!(f, "No file path set"),
        }
    }
}

impl std::error::Error for StoreError {}

fn create_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::IoError(e.to_string()))?;
        }
    }
    Ok(())
}

/// Save a map document and the textures of its dirty cells.
///
/// Returns the number of cell textures written. Dirty flags are cleared
/// for every texture that was written.
pub fn save_map(map: &mut TilerMap, path: &Path) -> Result<usize, StoreError> {
    let content = serde_json::to_string_pretty(&map.to_document())
        .map_err(|e| StoreError::SerializeError(e.to_string()))?;

    create_parent(path)?;
    std::fs::write(path, content).map_err(|e| StoreError::IoError(e.to_string()))?;

    let dir = asset_dir(path);
    std::fs::create_dir_all(&dir).map_err(|e| StoreError::IoError(e.to_string()))?;

    let mut written = 0;
    for cell in map.cells_mut() {
        if !cell.is_dirty() {
            continue;
        }
        let Some(texture) = cell.texture() else {
            tracing::warn!("Cell {} has no texture to save", cell.coord);
            continue;
        };
        texture
            .image()
            .save_with_format(cell_texture_path(path, cell.coord), ImageFormat::Png)
            .map_err(|e| StoreError::ImageError(e.to_string()))?;
        cell.clear_dirty();
        written += 1;
    }

    tracing::info!("Saved map {} to {:?} ({} textures)", map.name, path, written);
    Ok(written)
}

/// Load a map document and its cell textures. A missing texture file leaves
/// that cell without a texture.
pub fn load_map(path: &Path) -> Result<TilerMap, StoreError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| StoreError::IoError(e.to_string()))?;
    let doc: MapDocument =
        serde_json::from_str(&content).map_err(|e| StoreError::ParseError(e.to_string()))?;

    let map = TilerMap::from_document(doc, |cell| {
        let file = cell_texture_path(path, cell.coord);
        match image::open(&file) {
            Ok(img) => Some(CellTexture::from_image(img.to_rgba8())),
            Err(e) => {
                tracing::warn!("Could not read {:?}: {}", file, e);
                None
            }
        }
    })
    .map_err(|e| StoreError::ParseError(e.to_string()))?;

    tracing::info!("Loaded map {} from {:?}", map.name, path);
    Ok(map)
}

/// Save a tileset document and every tile image
pub fn save_tileset(tileset: &Tileset, path: &Path) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(tileset)
        .map_err(|e| StoreError::SerializeError(e.to_string()))?;

    create_parent(path)?;
    std::fs::write(path, content).map_err(|e| StoreError::IoError(e.to_string()))?;

    std::fs::create_dir_all(asset_dir(path)).map_err(|e| StoreError::IoError(e.to_string()))?;
    for tile in tileset.assets() {
        tile.image
            .save_with_format(tile_texture_path(path, tile.id), ImageFormat::Png)
            .map_err(|e| StoreError::ImageError(e.to_string()))?;
    }

    tracing::info!("Saved tileset {} to {:?}", tileset.name(), path);
    Ok(())
}

/// Load a tileset document and attach its tile images
pub fn load_tileset(path: &Path) -> Result<Tileset, StoreError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| StoreError::IoError(e.to_string()))?;
    let mut tileset: Tileset =
        serde_json::from_str(&content).map_err(|e| StoreError::ParseError(e.to_string()))?;
    tileset
        .settings
        .validate()
        .map_err(|e| StoreError::ParseError(e.to_string()))?;

    for tile in tileset.assets_mut() {
        let file = tile_texture_path(path, tile.id);
        match image::open(&file) {
            Ok(img) => tile.image = img.to_rgba8(),
            Err(e) => tracing::warn!("Tile {} has no image ({:?}): {}", tile.name, file, e),
        }
    }

    tracing::info!("Loaded tileset {} from {:?}", tileset.name(), path);
    Ok(tileset)
}
