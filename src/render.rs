//! External notation renderer and parser boundaries.
//!
//! The engine never lays out or draws notation itself. A renderer draws a
//! tune into the surface it is handed; a parser reads the rendered tune
//! back as a flat, index-parallel sequence of semantic notes.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::model::SemanticEntry;
use crate::surface::RenderSurface;

/// Options passed through to the renderer on every render.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Which tune of a multi-tune source to display (0-based)
    pub starting_index: usize,
    /// Semitones to shift the displayed notation by
    pub visual_transpose: i32,
    /// Fixed staff width in pixels; `None` lets the renderer decide
    pub staff_width: Option<f64>,
}

/// Header information of a rendered tune.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuneMetadata {
    pub title: Option<String>,
    pub tempo_bpm: Option<f64>,
    /// Meter as written, e.g. `"6/8"` or `"C|"`
    pub meter: Option<String>,
}

/// Result of one render call.
pub trait RenderedTune {
    fn metadata(&self) -> TuneMetadata;
}

pub trait NotationRenderer<S: RenderSurface> {
    type Tune: RenderedTune;

    /// Draw `source` into `surface`, replacing whatever it showed before.
    fn render(&mut self, surface: &mut S, source: &str, options: &RenderOptions) -> Result<Self::Tune, RenderError>;

    /// Whether glyph geometry is readable as soon as `render` returns.
    ///
    /// Renderers that know when layout has committed should say so;
    /// otherwise the coordinator waits a fixed interval.
    fn commits_layout_synchronously(&self) -> bool {
        false
    }
}

pub trait NotationParser<T> {
    /// Semantic notes in render order, one entry per note-bearing glyph.
    fn semantic_notes(&self, tune: &T) -> Vec<SemanticEntry>;
}

impl<T, F> NotationParser<T> for F
where
    F: Fn(&T) -> Vec<SemanticEntry>,
{
    fn semantic_notes(&self, tune: &T) -> Vec<SemanticEntry> {
        self(tune)
    }
}
