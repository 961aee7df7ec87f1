//! Render and input preferences
//!
//! The embedder owns storage; the JSON helpers exist so it can persist
//! settings wherever it keeps the rest of its preferences.

use serde::{Deserialize, Serialize};

/// Preferences for the playfield view and its touch handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Extra magnification on top of the aspect-fit scale.
    pub zoom: f32,
    /// Draw the FPS tally overlay.
    pub show_fps: bool,
    /// Map left/right touch zones to their flippers independently.
    /// Seeds [`InputMapper::new`](crate::input::InputMapper::new).
    pub independent_flippers: bool,
    /// Thicker strokes where the backend supports them.
    pub high_quality: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            show_fps: false,
            independent_flippers: true,
            high_quality: false,
        }
    }
}

impl RenderSettings {
    /// Stroke width in pixels for the raster path.
    pub fn line_width(&self) -> u32 {
        if self.high_quality { 2 } else { 1 }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
