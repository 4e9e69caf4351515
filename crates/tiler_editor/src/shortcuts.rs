//! Keyboard shortcut mapping

use crate::tools::ToolKind;

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    KeyA,
    KeyD,
    KeyS,
    KeyY,
    KeyZ,
    Digit1,
    Digit2,
    Digit3,
    Other(char),
}

impl KeyCode {
    /// Map a typed character to a key, ignoring case
    pub fn from_char(c: char) -> KeyCode {
        match c.to_ascii_lowercase() {
            'a' => KeyCode::KeyA,
            'd' => KeyCode::KeyD,
            's' => KeyCode::KeyS,
            'y' => KeyCode::KeyY,
            'z' => KeyCode::KeyZ,
            '1' => KeyCode::Digit1,
            '2' => KeyCode::Digit2,
            '3' => KeyCode::Digit3,
            other => KeyCode::Other(other),
        }
    }
}

/// One key press with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: KeyCode,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn key(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: true,
            shift: false,
        }
    }

    pub fn ctrl_shift(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: true,
            shift: true,
        }
    }
}

/// What a shortcut asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    RotateBrush,
    SelectTool(ToolKind),
    ShrinkBrush,
    GrowBrush,
    Undo,
    Redo,
    Save,
}

/// Resolve a key press to an action
pub fn shortcut_for(press: KeyPress) -> Option<ShortcutAction> {
    if press.ctrl {
        return match press.key {
            // Ctrl+Shift+Z or Ctrl+Y - Redo
            KeyCode::KeyZ if press.shift => Some(ShortcutAction::Redo),
            KeyCode::KeyY => Some(ShortcutAction::Redo),
            KeyCode::KeyZ => Some(ShortcutAction::Undo),
            KeyCode::KeyS => Some(ShortcutAction::Save),
            _ => None,
        };
    }

    match press.key {
        KeyCode::KeyD => Some(ShortcutAction::RotateBrush),
        KeyCode::Digit1 => Some(ShortcutAction::SelectTool(ToolKind::Paint)),
        KeyCode::Digit2 => Some(ShortcutAction::SelectTool(ToolKind::Fill)),
        KeyCode::Digit3 => Some(ShortcutAction::SelectTool(ToolKind::Replace)),
        KeyCode::KeyA => Some(ShortcutAction::ShrinkBrush),
        KeyCode::KeyS => Some(ShortcutAction::GrowBrush),
        _ => None,
    }
}
