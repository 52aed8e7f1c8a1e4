//! Overlay lifecycle — owns the single diagram layer on a render surface.
//!
//! Every pass swaps the whole layer. Nothing is patched in place, so no
//! diagram from an earlier render can survive into a later one; the price
//! is a visible flash when renders come quickly.

use serde::Serialize;

use crate::config::DEFAULT_OVERLAY_ID;
use crate::model::PositionedDiagram;
use crate::surface::RenderSurface;
use crate::svg_builder::SvgBuilder;

/// The render-pass-scoped container holding positioned diagrams.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLayer {
    pub id: String,
    pub diagrams: Vec<PositionedDiagram>,
}

impl OverlayLayer {
    /// Serialize as an SVG group. Each diagram sits in its own group,
    /// translated so that its anchor lands on `(left, top)`.
    pub fn to_svg(&self) -> String {
        let mut layer = SvgBuilder::new();
        for placed in &self.diagrams {
            let corner = placed.origin();
            let mut item = SvgBuilder::new();
            item.raw(placed.diagram.markup.clone());
            layer.raw(item.build_group(&[
                ("class", "fingering-diagram".to_string()),
                ("data-pitch", placed.diagram.pitch_name.clone()),
                (
                    "transform",
                    format!("translate({:.2},{:.2}) scale({})", corner.left, corner.top, placed.scale),
                ),
            ]));
        }
        layer.build_group(&[
            ("id", self.id.clone()),
            ("class", "fingering-overlay".to_string()),
            ("pointer-events", "none".to_string()),
        ])
    }
}

/// Creates, replaces and clears the overlay layer of a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayManager {
    layer_id: String,
}

impl Default for OverlayManager {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLAY_ID)
    }
}

impl OverlayManager {
    pub fn new(layer_id: impl Into<String>) -> Self {
        Self { layer_id: layer_id.into() }
    }

    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    /// Swap in a fresh layer holding `diagrams`, removing any previous one.
    pub fn replace<S: RenderSurface + ?Sized>(&self, surface: &mut S, diagrams: Vec<PositionedDiagram>) {
        self.clear(surface);
        surface.ensure_positioned();
        let layer = OverlayLayer { id: self.layer_id.clone(), diagrams };
        log::debug!("Attaching overlay '{}' with {} diagrams", layer.id, layer.diagrams.len());
        surface.attach_layer(&layer);
    }

    /// Remove the layer if present. Returns whether one was removed.
    pub fn clear<S: RenderSurface + ?Sized>(&self, surface: &mut S) -> bool {
        let mut removed = false;
        // A surface should never hold two, but leave none behind if it does.
        while surface.remove_layer(&self.layer_id) {
            removed = true;
        }
        removed
    }
}
