//! Overlay configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes: `{"verticalOffset": 14, "scale": 0.8}`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::Placement;

/// Id of the overlay layer element when none is configured.
pub const DEFAULT_OVERLAY_ID: &str = "fingering-overlay";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    /// Gap between the top of the staff and the bottom of the diagrams
    pub vertical_offset: f64,
    /// Render scale applied to every diagram
    pub scale: f64,
    pub placement: Placement,
    /// When false, passes clear the overlay instead of building one
    pub show_fingerings: bool,
    /// Fixed wait between a render call and reading its geometry
    pub layout_settle_ms: u64,
    /// Reserved id of the overlay layer on the render surface
    pub overlay_id: String,
    /// Class vocabulary the renderer tags its glyphs with
    pub markers: GlyphMarkers,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            vertical_offset: 10.0,
            scale: 1.0,
            placement: Placement::Above,
            show_fingerings: true,
            layout_settle_ms: 100,
            overlay_id: DEFAULT_OVERLAY_ID.to_string(),
            markers: GlyphMarkers::default(),
        }
    }
}

impl OverlayConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: OverlayConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn layout_settle(&self) -> Duration {
        Duration::from_millis(self.layout_settle_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::Invalid(format!("scale must be positive, got {}", self.scale)));
        }
        if !self.vertical_offset.is_finite() {
            return Err(ConfigError::Invalid("verticalOffset must be finite".into()));
        }
        if self.overlay_id.trim().is_empty() {
            return Err(ConfigError::Invalid("overlayId must not be empty".into()));
        }
        Ok(())
    }
}

/// Class markers the external renderer attaches to glyph elements.
///
/// The defaults match abcjs output: `abcjs-note abcjs-l0 abcjs-m3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlyphMarkers {
    pub note: String,
    pub rest: String,
    pub staff: String,
    /// Prefix of the staff-line index marker (`<prefix><n>`)
    pub line_prefix: String,
    /// Prefix of the measure index marker (`<prefix><n>`)
    pub measure_prefix: String,
    /// Roles that never carry a pitch
    pub non_pitched: Vec<String>,
}

impl Default for GlyphMarkers {
    fn default() -> Self {
        Self {
            note: "abcjs-note".into(),
            rest: "abcjs-rest".into(),
            staff: "abcjs-staff".into(),
            line_prefix: "abcjs-l".into(),
            measure_prefix: "abcjs-m".into(),
            non_pitched: vec![
                "abcjs-clef".into(),
                "abcjs-key-signature".into(),
                "abcjs-time-signature".into(),
                "abcjs-tempo".into(),
            ],
        }
    }
}

impl GlyphMarkers {
    /// Parse the number out of an indexed marker such as `abcjs-l2`.
    ///
    /// Only an all-digit suffix counts, so `abcjs-lyrics` is not a line marker.
    pub fn index_of<'a, I>(prefix: &str, classes: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        classes.into_iter().find_map(|class| {
            let digits = class.strip_prefix(prefix)?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok()
        })
    }
}
