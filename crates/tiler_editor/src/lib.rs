//! tiler_editor - Headless editing session for the Tiler map painter
//!
//! This crate provides:
//! - `Session` - open map layers, the active tool and brush size, undo/redo
//! - Paint, fill and replace tools with normal and copy brushes
//! - Keyboard shortcuts and host event subscription
//! - Map and tileset save/load (JSON documents with PNG textures)
//! - Editor preferences stored in the platform config directory
//!
//! # Usage
//!
//! ```rust,ignore
//! use tiler_core::{MapSettings, Point, TilerMap};
//! use tiler_editor::{preferences::EditorPreferences, Session};
//!
//! let prefs = EditorPreferences::load();
//! let mut session = Session::new(&prefs);
//! let map = TilerMap::new("forest", prefs.default_map.clone())?;
//! session.add_layer(map, Some("maps/forest.json".into()));
//! session.select_tile(tileset.asset(grass).unwrap());
//! session.apply_tool(Point::new(3, 4));
//! session.save_all()?;
//! ```

pub mod events;
pub mod preferences;
pub mod session;
pub mod shortcuts;
pub mod store;
pub mod tools;

pub use events::{EventKind, HostEvent, HostEvents, Subscription};
pub use session::{connect, LayerMove, MapLayer, Session};
pub use shortcuts::{shortcut_for, KeyCode, KeyPress, ShortcutAction};
pub use store::StoreError;
pub use tools::{DrawTool, ToolKind};

// Re-export the core crate
pub use tiler_core;
