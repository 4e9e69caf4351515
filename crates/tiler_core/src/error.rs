use crate::point::Point;
use crate::tile::TileId;

/// Errors raised by grid, brush and configuration operations
#[derive(Debug, Clone, PartialEq)]
pub enum TilerError {
    /// The cell at this cell coordinate has no backing texture
    MissingTexture { cell: Point },
    /// A local tile index fell outside the cell's tile array
    TileOutOfRange { index: i64, len: usize },
    InvalidConfig(String),
    /// A copy brush was captured from a region with nothing in it
    EmptyCopyBrush,
    /// The tileset has no tile with this id
    UnknownTile(TileId),
    /// A copy region holds more tiles than a copy brush may capture
    RegionTooLarge { width: i64, height: i64 },
}

impl std::fmt::Display for TilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TilerError::MissingTexture { cell } => {
                write!(f, "Texture for cell {} is missing", cell)
            }
            TilerError::TileOutOfRange { index, len } => {
                write!(f, "Tile index {} out of range (cell holds {} tiles)", index, len)
            }
            TilerError::InvalidConfig(e) => write!(f, "Invalid configuration: {}", e),
            TilerError::EmptyCopyBrush => write!(f, "Copy brush region is empty"),
            TilerError::UnknownTile(id) => write!(f, "Unknown tile {}", id),
            TilerError::RegionTooLarge { width, height } => {
                write!(f, "Copy region {}x{} is too large", width, height)
            }
        }
    }
}

impl std::error::Error for TilerError {}
