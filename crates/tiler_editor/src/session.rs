//! The editing session
//!
//! A session owns the open map layers, the active drawing tool with its
//! brush size, and the undo log of the active layer. Hosts feed it pointer
//! strokes, key presses and asset change notifications.

use crate::events::{EventKind, HostEvent, HostEvents, Subscription};
use crate::preferences::EditorPreferences;
use crate::shortcuts::{shortcut_for, KeyPress, ShortcutAction};
use crate::store::{asset_dir, load_map, save_map, StoreError};
use crate::tools::{DrawTool, ToolKind};
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tiler_core::{
    clamp_brush_size, AnyBrush, NormalBrush, Point, TileId, TileTexture, TilerError, TilerMap,
    TilerMapEdit, Tileset, UndoPaint,
};
use uuid::Uuid;

/// One map open in the session
#[derive(Debug, Clone)]
pub struct MapLayer {
    pub id: Uuid,
    pub name: String,
    /// Document the layer saves to
    pub path: Option<PathBuf>,
    pub map: TilerMap,
    pub visible: bool,
}

impl MapLayer {
    pub fn new(map: TilerMap, path: Option<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: map.name.clone(),
            path,
            map,
            visible: true,
        }
    }
}

/// Direction for [`Session::move_layer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerMove {
    /// Toward the front of the list
    Up,
    Down,
}

#[derive(Debug)]
pub struct Session {
    layers: Vec<MapLayer>,
    active: Option<usize>,
    tool: DrawTool,
    brush_size: u32,
    undo: UndoPaint,
    /// Texture size used for brushes while no layer is open
    default_resolution: u32,
    changed_assets: Vec<PathBuf>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&EditorPreferences::default())
    }
}

impl Session {
    pub fn new(preferences: &EditorPreferences) -> Self {
        let default_resolution = preferences.default_map.tile_resolution().max(1);
        Self {
            layers: Vec::new(),
            active: None,
            tool: DrawTool::Paint(NormalBrush::empty(default_resolution).into()),
            brush_size: preferences.brush_size(),
            undo: UndoPaint::with_capacity(preferences.undo_depth()),
            default_resolution,
            changed_assets: Vec::new(),
        }
    }

    // Layers

    /// Add a layer and return its index. The first layer becomes active.
    pub fn add_layer(&mut self, map: TilerMap, path: Option<PathBuf>) -> usize {
        self.layers.push(MapLayer::new(map, path));
        let index = self.layers.len() - 1;
        if self.active.is_none() {
            self.set_active_layer(index);
        }
        index
    }

    /// Load a saved map as a new layer
    pub fn open_layer(&mut self, path: &Path) -> Result<usize, StoreError> {
        let map = load_map(path)?;
        Ok(self.add_layer(map, Some(path.to_path_buf())))
    }

    pub fn layers(&self) -> &[MapLayer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&MapLayer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut MapLayer> {
        self.layers.get_mut(index)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_layer(&self) -> Option<&MapLayer> {
        self.active.and_then(|i| self.layers.get(i))
    }

    pub fn active_layer_mut(&mut self) -> Option<&mut MapLayer> {
        self.active.and_then(|i| self.layers.get_mut(i))
    }

    /// Switch the layer being edited. Undo history belongs to one layer, so
    /// switching clears it.
    pub fn set_active_layer(&mut self, index: usize) -> bool {
        if index >= self.layers.len() {
            return false;
        }
        if self.active != Some(index) {
            self.undo.clear();
            self.active = Some(index);
        }
        true
    }

    /// Swap a layer with its neighbor, exchanging their z-order values
    pub fn move_layer(&mut self, index: usize, direction: LayerMove) -> bool {
        let other = match direction {
            LayerMove::Up if index > 0 => index - 1,
            LayerMove::Down if index + 1 < self.layers.len() => index + 1,
            _ => return false,
        };

        let a = self.layers[index].map.layer();
        let b = self.layers[other].map.layer();
        self.layers[index].map.set_layer(b);
        self.layers[other].map.set_layer(a);
        self.layers.swap(index, other);

        self.active = self.active.map(|active| {
            if active == index {
                other
            } else if active == other {
                index
            } else {
                active
            }
        });
        true
    }

    // Tools and brushes

    pub fn tool(&self) -> &DrawTool {
        &self.tool
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = clamp_brush_size(size);
    }

    fn texture_size(&self) -> u32 {
        self.active_layer()
            .map(|layer| layer.map.tile_resolution())
            .unwrap_or(self.default_resolution)
    }

    pub fn set_tool(&mut self, kind: ToolKind) {
        let texture_size = self.texture_size();
        let placeholder = DrawTool::Paint(NormalBrush::empty(texture_size).into());
        let tool = std::mem::replace(&mut self.tool, placeholder);
        self.tool = tool.switch(kind, texture_size);
    }

    pub fn set_brush(&mut self, brush: AnyBrush) {
        let texture_size = self.texture_size();
        self.tool.set_brush(brush, texture_size);
    }

    /// Pick a tileset entry as the brush
    pub fn select_tile(&mut self, tile: &TileTexture) {
        let brush = NormalBrush::new(self.texture_size(), tile);
        self.set_brush(brush.into());
    }

    /// Select a tile of `tileset` by id
    pub fn select_tile_id(&mut self, tileset: &Tileset, id: TileId) -> Result<(), TilerError> {
        let tile = tileset.tile(id)?;
        self.select_tile(tile);
        Ok(())
    }

    pub fn rotate_brush(&mut self) {
        self.tool.brush_mut().rotate();
    }

    /// Capture a rectangle of the active layer and paint with it.
    /// Returns false when no layer is open.
    pub fn copy_region(&mut self, a: Point, b: Point) -> Result<bool, TilerError> {
        let Some(layer) = self.active_layer() else {
            return Ok(false);
        };
        let brush = layer.map.capture_copy_brush(a, b)?;
        self.tool = DrawTool::Paint(brush.into());
        Ok(true)
    }

    // Strokes

    /// Start a new undo step. Call when the pointer goes down.
    pub fn begin_stroke(&mut self) {
        self.undo.new_undo();
    }

    /// Apply the tool at a world tile within the current stroke.
    /// Returns the number of tiles changed.
    pub fn stroke_to(&mut self, point: Point) -> usize {
        let Some(index) = self.active else {
            return 0;
        };
        let Some(layer) = self.layers.get_mut(index) else {
            return 0;
        };

        let mut edit = TilerMapEdit::new(&mut layer.map, &mut self.undo);
        let changed = self.tool.apply(&mut edit, point, self.brush_size);
        edit.apply();
        changed
    }

    /// A single click: one undo step holding one tool application
    pub fn apply_tool(&mut self, point: Point) -> usize {
        self.begin_stroke();
        self.stroke_to(point)
    }

    pub fn undo(&mut self) -> usize {
        match self.active.and_then(|i| self.layers.get_mut(i)) {
            Some(layer) => self.undo.undo(&mut layer.map),
            None => 0,
        }
    }

    pub fn redo(&mut self) -> usize {
        match self.active.and_then(|i| self.layers.get_mut(i)) {
            Some(layer) => self.undo.redo(&mut layer.map),
            None => 0,
        }
    }

    pub fn undo_log(&self) -> &UndoPaint {
        &self.undo
    }

    // Input

    /// Run the shortcut bound to a key press. Returns the action performed.
    pub fn handle_key(&mut self, press: KeyPress) -> Option<ShortcutAction> {
        let action = shortcut_for(press)?;
        match action {
            ShortcutAction::RotateBrush => self.rotate_brush(),
            ShortcutAction::SelectTool(kind) => self.set_tool(kind),
            ShortcutAction::ShrinkBrush | ShortcutAction::GrowBrush => {
                // Only a single-tile paint brush has a size
                if !self.tool.uses_brush_size() {
                    return None;
                }
                let size = if action == ShortcutAction::GrowBrush {
                    self.brush_size + 1
                } else {
                    self.brush_size.saturating_sub(1)
                };
                self.set_brush_size(size);
            }
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Save => {
                if let Err(e) = self.save_all() {
                    tracing::error!("Failed to save: {}", e);
                }
            }
        }
        Some(action)
    }

    pub fn handle_event(&mut self, event: &HostEvent) -> Option<ShortcutAction> {
        match event {
            HostEvent::KeyPressed(press) => self.handle_key(*press),
            HostEvent::AssetChanged(path) => {
                if !self.changed_assets.contains(path) {
                    self.changed_assets.push(path.clone());
                }
                None
            }
        }
    }

    /// Layers whose document or pixel files changed on disk
    pub fn stale_layers(&self) -> Vec<usize> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| {
                layer.path.as_deref().is_some_and(|path| {
                    let dir = asset_dir(path);
                    self.changed_assets
                        .iter()
                        .any(|changed| changed == path || changed.starts_with(&dir))
                })
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Replace a layer's map with what is on disk. Clears the undo log if it
    /// is the active layer.
    pub fn reload_layer(&mut self, index: usize) -> Result<(), StoreError> {
        let path = self
            .layers
            .get(index)
            .and_then(|layer| layer.path.clone())
            .ok_or(StoreError::NoPath)?;
        let map = load_map(&path)?;

        let dir = asset_dir(&path);
        self.changed_assets
            .retain(|changed| changed != &path && !changed.starts_with(&dir));
        if let Some(layer) = self.layers.get_mut(index) {
            layer.map = map;
        }
        if self.active == Some(index) {
            self.undo.clear();
        }
        Ok(())
    }

    // Saving

    /// Save every layer that has a path.
    ///
    /// Two layers pointing at one document would overwrite each other, so
    /// that case refuses the whole save. Returns the number of layers saved.
    pub fn save_all(&mut self) -> Result<usize, StoreError> {
        let mut seen = HashSet::new();
        for layer in &self.layers {
            if let Some(path) = &layer.path {
                if !seen.insert(path) {
                    tracing::error!(
                        "Layer {} shares its file {:?} with another layer, nothing saved",
                        layer.name,
                        path
                    );
                    return Err(StoreError::DuplicateLayerPath(path.clone()));
                }
            }
        }

        let mut saved = 0;
        for layer in &mut self.layers {
            let Some(path) = &layer.path else {
                tracing::error!("Layer {} has no file path, skipped", layer.name);
                for cell in layer.map.cells_mut() {
                    cell.mark_dirty();
                }
                continue;
            };
            save_map(&mut layer.map, path)?;
            saved += 1;
        }

        self.undo.clear();
        Ok(saved)
    }
}

/// Route host events into a shared session. The session receives events for
/// as long as the returned subscriptions are kept.
pub fn connect(session: &Rc<RefCell<Session>>, events: &HostEvents) -> Vec<Subscription> {
    [EventKind::KeyPressed, EventKind::AssetChanged]
        .into_iter()
        .map(|kind| {
            let session = Rc::downgrade(session);
            events.subscribe(kind, move |event| {
                if let Some(session) = session.upgrade() {
                    session.borrow_mut().handle_event(event);
                }
            })
        })
        .collect()
}
