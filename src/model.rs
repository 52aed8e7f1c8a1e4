//! Data model shared by the overlay pipeline stages.
//!
//! Everything here except the overlay layer is pass-scoped: produced from
//! one render, consumed by the next stage, discarded at the next render.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Horizontal center of the box.
    pub fn center_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(left, top, right - left, bottom - top)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> BoundingBox {
        BoundingBox::new(self.left + dx, self.top + dy, self.width, self.height)
    }
}

/// A point in viewport coordinates (used for surface origins).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub left: f64,
    pub top: f64,
}

impl Point {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Notes
// ═══════════════════════════════════════════════════════════════════════

/// A pitched note glyph as found on the render surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedNote {
    /// Position in the render-order sequence of note-bearing glyphs.
    /// Sparse once rests have been filtered out.
    pub render_index: usize,
    /// Physical staff line (system) the glyph sits on
    pub staff_line: usize,
    /// Measure the glyph belongs to
    pub measure: usize,
    /// Glyph bounds in viewport coordinates
    pub bbox: BoundingBox,
}

/// Pitch information for one logical note, as emitted by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticNote {
    /// Pitch name in ABC spelling, e.g. `"^F"`, `"d"`, `"e'"`
    pub pitch_name: String,
    /// No diagram for this note even if the pitch has a fingering
    #[serde(default)]
    pub suppress_diagram: bool,
}

impl SemanticNote {
    pub fn new(pitch_name: impl Into<String>) -> Self {
        Self { pitch_name: pitch_name.into(), suppress_diagram: false }
    }

    pub fn suppressed(pitch_name: impl Into<String>) -> Self {
        Self { pitch_name: pitch_name.into(), suppress_diagram: true }
    }
}

/// Wire form of a semantic note.
///
/// Older parsers emit bare pitch strings; both forms normalize to a
/// [`SemanticNote`]. A JSON `null` marks a position with no note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SemanticEntry {
    Missing,
    Pitch(String),
    Note(SemanticNote),
}

impl SemanticEntry {
    pub fn normalize(&self) -> Option<SemanticNote> {
        match self {
            SemanticEntry::Missing => None,
            SemanticEntry::Pitch(name) => Some(SemanticNote::new(name.clone())),
            SemanticEntry::Note(note) => Some(note.clone()),
        }
    }
}

impl From<&str> for SemanticEntry {
    fn from(name: &str) -> Self {
        SemanticEntry::Pitch(name.to_string())
    }
}

impl From<SemanticNote> for SemanticEntry {
    fn from(note: SemanticNote) -> Self {
        SemanticEntry::Note(note)
    }
}

/// A rendered note joined with its semantic note by render index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedNote {
    pub rendered: RenderedNote,
    pub semantic: SemanticNote,
}

impl AlignedNote {
    pub fn render_index(&self) -> usize {
        self.rendered.render_index
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.rendered.bbox
    }

    pub fn pitch_name(&self) -> &str {
        &self.semantic.pitch_name
    }
}

/// One physical line of notation with its notes sorted left to right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffLine {
    pub staff_line: usize,
    /// Top edge of the staff itself, independent of note heights
    pub anchor_top: f64,
    pub notes: Vec<AlignedNote>,
}

// ═══════════════════════════════════════════════════════════════════════
// Diagrams
// ═══════════════════════════════════════════════════════════════════════

/// Opaque fingering artifact supplied by a [`crate::fingering::FingeringProvider`].
///
/// `markup` is an SVG fragment drawn in its own coordinate box of
/// `width` × `height`, origin at the top-left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingeringDiagram {
    pub pitch_name: String,
    pub width: f64,
    pub height: f64,
    pub markup: String,
}

/// A diagram placed relative to the render surface origin.
///
/// `(left, top)` is the anchor: horizontal center, vertical bottom.
/// Diagrams grow upward from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedDiagram {
    pub diagram: FingeringDiagram,
    pub left: f64,
    pub top: f64,
    pub scale: f64,
}

impl PositionedDiagram {
    /// Top-left corner of the scaled diagram box.
    pub fn origin(&self) -> Point {
        Point::new(
            self.left - self.diagram.width * self.scale / 2.0,
            self.top - self.diagram.height * self.scale,
        )
    }
}

/// Where diagrams sit relative to their staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Above,
}
