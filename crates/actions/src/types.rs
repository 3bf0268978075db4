//! Event descriptors handed to the rendering host

use serde::{Deserialize, Serialize};

use crate::keys::{KeyData, KeyLocation};
use crate::state::Modifiers;

/// Keyboard event phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventKind {
    KeyDown,
    KeyPress,
    KeyUp,
}

/// Keyboard event to synthesize
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub key: String,
    pub code: String,
    pub location: KeyLocation,
    pub repeat: bool,
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(kind: KeyEventKind, data: &KeyData, modifiers: Modifiers) -> Self {
        Self {
            kind,
            key: data.key.clone(),
            code: data.code.to_string(),
            location: data.location,
            repeat: false,
            modifiers,
        }
    }

    pub fn with_kind(&self, kind: KeyEventKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }
}

/// Mouse event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseEventKind {
    MouseDown,
    MouseUp,
    MouseMove,
    ContextMenu,
}

/// Mouse event to synthesize at viewport coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: i64,
    pub y: i64,
    pub button: u32,
    pub buttons: u32,
    pub click_count: u32,
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

impl MouseEvent {
    pub fn new(kind: MouseEventKind, x: i64, y: i64, modifiers: Modifiers) -> Self {
        Self {
            kind,
            x,
            y,
            button: 0,
            buttons: 0,
            click_count: 0,
            modifiers,
        }
    }
}

/// How an element's centre point is resolved for element-origin moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CenterMode {
    /// Centre of the element's first client rect, clipped to the viewport
    InView,
    /// Legacy element coordinates
    Legacy,
}

impl CenterMode {
    pub fn from_spec_compat(spec_compat: bool) -> Self {
        if spec_compat {
            CenterMode::InView
        } else {
            CenterMode::Legacy
        }
    }
}

/// Platform conventions that change synthesized mouse input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Ctrl+click opens the context menu
    Mac,
    Other,
}

impl Default for Platform {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }
}

impl Platform {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "mac" | "macos" | "darwin" => Some(Platform::Mac),
            "other" | "linux" | "windows" => Some(Platform::Other),
            _ => None,
        }
    }
}
