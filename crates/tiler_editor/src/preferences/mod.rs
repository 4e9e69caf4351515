//! Editor preferences persisted between sessions
//!
//! Holds the defaults offered when a new map or tileset is created, the
//! undo depth and brush size, and the list of recently opened maps.

mod file;

pub use file::*;

use serde::{Deserialize, Serialize};
use tiler_core::{clamp_brush_size, MapSettings, TilesetSettings, MAX_UNDOS, MIN_BRUSH_SIZE};

/// Maximum number of entries kept in the recent maps list
pub const MAX_RECENT_MAPS: usize = 10;

/// A recently opened map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentMap {
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    /// Settings offered for new maps
    pub default_map: MapSettings,
    /// Settings offered for new tilesets
    pub default_tileset: TilesetSettings,
    /// Number of undo steps kept per session
    pub undo_depth: usize,
    pub brush_size: u32,
    /// Most recent first
    pub recent_maps: Vec<RecentMap>,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            default_map: MapSettings::default(),
            default_tileset: TilesetSettings::default(),
            undo_depth: MAX_UNDOS,
            brush_size: MIN_BRUSH_SIZE,
            recent_maps: Vec::new(),
        }
    }
}

impl EditorPreferences {
    /// Move a map to the front of the recent list, dropping the oldest entry
    /// once the list is full
    pub fn add_recent_map(&mut self, path: impl Into<String>, name: impl Into<String>) {
        let path = path.into();
        self.recent_maps.retain(|r| r.path != path);
        self.recent_maps.insert(
            0,
            RecentMap {
                path,
                name: name.into(),
            },
        );
        self.recent_maps.truncate(MAX_RECENT_MAPS);
    }

    pub fn remove_recent_map(&mut self, path: &str) {
        self.recent_maps.retain(|r| r.path != path);
    }

    pub fn clear_recent_maps(&mut self) {
        self.recent_maps.clear();
    }

    /// The map opened most recently
    pub fn last_map(&self) -> Option<&RecentMap> {
        self.recent_maps.first()
    }

    /// Brush size clamped to the supported range
    pub fn brush_size(&self) -> u32 {
        clamp_brush_size(self.brush_size)
    }

    /// Undo depth, at least one step
    pub fn undo_depth(&self) -> usize {
        self.undo_depth.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_maps_ordering() {
        let mut prefs = EditorPreferences::default();
        prefs.add_recent_map("a.json", "A");
        prefs.add_recent_map("b.json", "B");
        prefs.add_recent_map("a.json", "A again");

        assert_eq!(prefs.recent_maps.len(), 2);
        assert_eq!(prefs.last_map().unwrap().name, "A again");
        assert_eq!(prefs.recent_maps[1].path, "b.json");

        prefs.remove_recent_map("a.json");
        assert_eq!(prefs.last_map().unwrap().path, "b.json");

        prefs.clear_recent_maps();
        assert!(prefs.last_map().is_none());
    }

    #[test]
    fn test_recent_maps_capped() {
        let mut prefs = EditorPreferences::default();
        for i in 0..15 {
            prefs.add_recent_map(format!("{}.json", i), format!("Map {}", i));
        }
        assert_eq!(prefs.recent_maps.len(), MAX_RECENT_MAPS);
        assert_eq!(prefs.last_map().unwrap().path, "14.json");
        assert_eq!(prefs.recent_maps.last().unwrap().path, "5.json");
    }

    #[test]
    fn test_clamped_values() {
        let prefs = EditorPreferences {
            brush_size: 40,
            undo_depth: 0,
            ..Default::default()
        };
        assert_eq!(prefs.brush_size(), tiler_core::MAX_BRUSH_SIZE);
        assert_eq!(prefs.undo_depth(), 1);
    }
}
