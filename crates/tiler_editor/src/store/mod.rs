//! Map and tileset persistence
//!
//! Documents are pretty-printed JSON. Pixel data lives beside each document
//! in a directory named after it:
//!
//! ```text
//! forest.json
//! forest/
//!     cell_0_0_TEX.png
//!     cell_1_-1_TEX.png
//! ```

mod file;

pub use file::*;

use std::path::{Path, PathBuf};
use tiler_core::{Point, TileId};

/// Directory holding the images of a document
pub fn asset_dir(document: &Path) -> PathBuf {
    document.with_extension("")
}

/// PNG file of a map cell's texture
pub fn cell_texture_path(document: &Path, cell: Point) -> PathBuf {
    asset_dir(document).join(format!("cell_{}_{}_TEX.png", cell.x, cell.y))
}

/// PNG file of a tileset entry
pub fn tile_texture_path(document: &Path, id: TileId) -> PathBuf {
    asset_dir(document).join(format!("tile_{}.png", id.sequence()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_paths() {
        let doc = Path::new("maps/forest.json");
        assert_eq!(asset_dir(doc), PathBuf::from("maps/forest"));
        assert_eq!(
            cell_texture_path(doc, Point::new(1, -1)),
            PathBuf::from("maps/forest/cell_1_-1_TEX.png")
        );
        assert_eq!(
            tile_texture_path(doc, TileId::new(9, 3)),
            PathBuf::from("maps/forest/tile_3.png")
        );
    }
}
