//! User preferences kept next to the prompt store
//!
//! Each preference lives under its own key so the widget, the adapter and
//! the settings panel can read just what they need.

use serde::{Deserialize, Serialize};

/// Preference keys in the key/value substrate
pub mod keys {
    pub const BUTTON_POSITION: &str = "buttonPosition";
    pub const KEYBOARD_SHORTCUT: &str = "keyboardShortcut";
    pub const DISABLE_OVERWRITE: &str = "disableOverwrite";
    pub const DISPLAY_MODE: &str = "displayMode";
    pub const ONBOARDING_COMPLETED: &str = "onboardingCompleted";
    pub const ENABLE_TAGS: &str = "enableTags";

    pub const ALL: [&str; 6] = [
        BUTTON_POSITION,
        KEYBOARD_SHORTCUT,
        DISABLE_OVERWRITE,
        DISPLAY_MODE,
        ONBOARDING_COMPLETED,
        ENABLE_TAGS,
    ];
}

/// Floating button position in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ButtonPosition {
    pub x: f64,
    pub y: f64,
}

impl Default for ButtonPosition {
    fn default() -> Self {
        Self { x: 20.0, y: 20.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyboardShortcut {
    pub key:            String,
    pub modifier:       String,
    pub requires_shift: bool,
}

impl Default for KeyboardShortcut {
    fn default() -> Self {
        Self {
            key:            "p".to_string(),
            modifier:       "ctrl".to_string(),
            requires_shift: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayMode {
    #[default]
    Standard,
    HotCorner,
}

/// Every preference with its effective value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub button_position:      ButtonPosition,
    pub keyboard_shortcut:    KeyboardShortcut,
    /// Append to the input instead of replacing it
    pub disable_overwrite:    bool,
    pub display_mode:         DisplayMode,
    pub onboarding_completed: bool,
    pub enable_tags:          bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            button_position:      ButtonPosition::default(),
            keyboard_shortcut:    KeyboardShortcut::default(),
            disable_overwrite:    false,
            display_mode:         DisplayMode::Standard,
            onboarding_completed: false,
            enable_tags:          true,
        }
    }
}

/// Default value for a preference key, `None` for unknown keys
pub fn default_for(key: &str) -> Option<serde_json::Value> {
    let defaults = Preferences::default();
    let value = match key {
        keys::BUTTON_POSITION => serde_json::to_value(defaults.button_position),
        keys::KEYBOARD_SHORTCUT => serde_json::to_value(defaults.keyboard_shortcut),
        keys::DISABLE_OVERWRITE => serde_json::to_value(defaults.disable_overwrite),
        keys::DISPLAY_MODE => serde_json::to_value(defaults.display_mode),
        keys::ONBOARDING_COMPLETED => serde_json::to_value(defaults.onboarding_completed),
        keys::ENABLE_TAGS => serde_json::to_value(defaults.enable_tags),
        _ => return None,
    };
    value.ok()
}
