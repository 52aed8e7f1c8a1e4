//! Render surfaces — the container an external renderer draws into.
//!
//! The overlay engine never looks a surface up by a global id: every stage
//! is handed the surface (or the glyphs read from it) explicitly.

mod bounds;
mod svg;

use std::collections::BTreeMap;

use crate::config::GlyphMarkers;
use crate::model::{BoundingBox, Point};
use crate::overlay::OverlayLayer;

pub use bounds::{path_bounds, Transform};
pub use svg::SvgSurface;

/// One drawn element and the role markers the renderer tagged it with.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub classes: Vec<String>,
    /// Bounds in viewport coordinates
    pub bbox: BoundingBox,
}

impl Glyph {
    pub fn new(classes: &str, bbox: BoundingBox) -> Self {
        Self {
            classes: classes.split_whitespace().map(str::to_string).collect(),
            bbox,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn class_index(&self, prefix: &str) -> Option<usize> {
        GlyphMarkers::index_of(prefix, self.classes.iter().map(String::as_str))
    }
}

/// A geometry-queryable container holding a rendered score.
pub trait RenderSurface {
    /// Every tagged element currently drawn, in render order.
    fn glyphs(&self) -> Vec<Glyph>;

    /// Top-left corner of the surface in viewport coordinates.
    fn origin(&self) -> Point;

    /// Make the surface a coordinate-establishing context for its overlay.
    fn ensure_positioned(&mut self);

    /// Remove the layer with the given id. Returns whether one existed.
    fn remove_layer(&mut self, id: &str) -> bool;

    /// Attach a freshly built layer.
    fn attach_layer(&mut self, layer: &OverlayLayer);
}

/// Resolves the physical top edge of a staff line.
pub trait StaffAnchors {
    fn anchor_top(&self, staff_line: usize) -> Option<f64>;
}

impl<F> StaffAnchors for F
where
    F: Fn(usize) -> Option<f64>,
{
    fn anchor_top(&self, staff_line: usize) -> Option<f64> {
        self(staff_line)
    }
}

/// Staff tops collected from the staff glyphs of one render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffAnchorMap {
    tops: BTreeMap<usize, f64>,
}

impl StaffAnchorMap {
    /// The anchor of a line is the highest edge of any staff glyph on it.
    pub fn from_glyphs(glyphs: &[Glyph], markers: &GlyphMarkers) -> Self {
        let mut tops = BTreeMap::new();
        for glyph in glyphs.iter().filter(|g| g.has_class(&markers.staff)) {
            let Some(line) = glyph.class_index(&markers.line_prefix) else {
                continue;
            };
            tops.entry(line)
                .and_modify(|top: &mut f64| *top = top.min(glyph.bbox.top))
                .or_insert(glyph.bbox.top);
        }
        Self { tops }
    }

    pub fn read<S: RenderSurface + ?Sized>(surface: &S, markers: &GlyphMarkers) -> Self {
        Self::from_glyphs(&surface.glyphs(), markers)
    }

    pub fn len(&self) -> usize {
        self.tops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tops.is_empty()
    }
}

impl StaffAnchors for StaffAnchorMap {
    fn anchor_top(&self, staff_line: usize) -> Option<f64> {
        self.tops.get(&staff_line).copied()
    }
}
