//! Render surface backed by SVG markup.
//!
//! Geometry is read with `roxmltree` on demand; the overlay layer is
//! spliced into the markup text. SVG user units are taken to be viewport
//! pixels, so a glyph's viewport box is its SVG box shifted by the
//! surface origin.

use roxmltree::{Document, Node};

use super::bounds::{path_bounds, points_bounds, Transform};
use super::{Glyph, RenderSurface};
use crate::error::SurfaceError;
use crate::model::{BoundingBox, Point};
use crate::overlay::OverlayLayer;

#[derive(Debug, Clone, PartialEq)]
pub struct SvgSurface {
    markup: String,
    origin: Point,
}

impl SvgSurface {
    /// Wrap rendered SVG markup. The markup must parse and have an `<svg>` root.
    pub fn new(markup: impl Into<String>) -> Result<Self, SurfaceError> {
        let markup = markup.into();
        check_markup(&markup)?;
        Ok(Self { markup, origin: Point::default() })
    }

    /// An empty surface, as before the first render.
    pub fn blank() -> Self {
        Self {
            markup: r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#.to_string(),
            origin: Point::default(),
        }
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Replace the rendered content. Renderers call this once per render.
    pub fn set_markup(&mut self, markup: impl Into<String>) -> Result<(), SurfaceError> {
        let markup = markup.into();
        check_markup(&markup)?;
        self.markup = markup;
        Ok(())
    }

    /// Move the surface within the viewport (e.g. after scrolling).
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn into_markup(self) -> String {
        self.markup
    }

    fn parse(&self) -> Option<Document<'_>> {
        match Document::parse(&self.markup) {
            Ok(doc) => Some(doc),
            Err(e) => {
                log::warn!("Render surface markup no longer parses: {e}");
                None
            }
        }
    }
}

fn check_markup(markup: &str) -> Result<(), SurfaceError> {
    let doc = Document::parse(markup).map_err(|e| SurfaceError::Markup(e.to_string()))?;
    if doc.root_element().tag_name().name() != "svg" {
        return Err(SurfaceError::MissingRoot);
    }
    Ok(())
}

impl RenderSurface for SvgSurface {
    fn glyphs(&self) -> Vec<Glyph> {
        let Some(doc) = self.parse() else {
            return Vec::new();
        };
        doc.root_element()
            .descendants()
            .filter(|n| n.is_element())
            .filter_map(|node| {
                let classes = node.attribute("class")?;
                let bbox = element_bounds(node)?;
                Some(Glyph::new(classes, bbox.translated(self.origin.left, self.origin.top)))
            })
            .collect()
    }

    fn origin(&self) -> Point {
        self.origin
    }

    fn ensure_positioned(&mut self) {
        // Diagrams above the first staff may fall outside the viewBox.
        let insert_at = {
            let Some(doc) = self.parse() else {
                return;
            };
            let root = doc.root_element();
            if root.has_attribute("overflow") {
                return;
            }
            let start = root.range().start;
            let tag_len = self.markup[start + 1..]
                .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .unwrap_or(0);
            start + 1 + tag_len
        };
        self.markup.insert_str(insert_at, r#" overflow="visible""#);
    }

    fn remove_layer(&mut self, id: &str) -> bool {
        let range = {
            let Some(doc) = self.parse() else {
                return false;
            };
            // The root is the score itself, never a layer.
            match doc
                .root_element()
                .descendants()
                .skip(1)
                .find(|n| n.is_element() && n.attribute("id") == Some(id))
            {
                Some(node) => node.range(),
                None => return false,
            }
        };
        self.markup.replace_range(range, "");
        true
    }

    fn attach_layer(&mut self, layer: &OverlayLayer) {
        let fragment = layer.to_svg();
        let root_range = {
            let Some(doc) = self.parse() else {
                return;
            };
            doc.root_element().range()
        };
        let root_text = &self.markup[root_range.clone()];
        if root_text.ends_with("/>") {
            // Self-closing root: reopen it around the layer.
            let close_at = root_range.end - 2;
            let tag_end = root_text
                .trim_start_matches('<')
                .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
                .unwrap_or(0);
            let tag = root_text[1..1 + tag_end].to_string();
            self.markup
                .replace_range(close_at..root_range.end, &format!(">{fragment}</{tag}>"));
        } else if let Some(close) = root_text.rfind("</") {
            self.markup.insert_str(root_range.start + close, &fragment);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Element geometry
// ═══════════════════════════════════════════════════════════════════════

/// Accumulated transform from the document root down to `node`.
fn current_transform(node: Node) -> Transform {
    let mut chain: Vec<Transform> = node
        .ancestors()
        .filter(|n| n.is_element())
        .filter_map(|n| n.attribute("transform"))
        .map(Transform::parse)
        .collect();
    chain.reverse();
    chain
        .iter()
        .fold(Transform::identity(), |acc, t| acc.then(t))
}

fn number(node: Node, attr: &str) -> f64 {
    node.attribute(attr)
        .and_then(|v| v.trim().trim_end_matches("px").parse().ok())
        .unwrap_or(0.0)
}

/// Bounds of a single shape element in its own user space.
fn shape_bounds(node: Node) -> Option<BoundingBox> {
    match node.tag_name().name() {
        "rect" | "image" | "use" if node.has_attribute("width") => Some(BoundingBox::new(
            number(node, "x"),
            number(node, "y"),
            number(node, "width"),
            number(node, "height"),
        )),
        "circle" => {
            let r = number(node, "r");
            Some(BoundingBox::new(number(node, "cx") - r, number(node, "cy") - r, 2.0 * r, 2.0 * r))
        }
        "ellipse" => {
            let (rx, ry) = (number(node, "rx"), number(node, "ry"));
            Some(BoundingBox::new(number(node, "cx") - rx, number(node, "cy") - ry, 2.0 * rx, 2.0 * ry))
        }
        "line" => {
            let (x1, y1) = (number(node, "x1"), number(node, "y1"));
            let (x2, y2) = (number(node, "x2"), number(node, "y2"));
            Some(BoundingBox::new(x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs()))
        }
        "polyline" | "polygon" => points_bounds(node.attribute("points")?),
        "path" => path_bounds(node.attribute("d")?),
        _ => None,
    }
}

/// Union of the shapes in `node`'s subtree, in document coordinates.
fn element_bounds(node: Node) -> Option<BoundingBox> {
    node.descendants()
        .filter(|n| n.is_element())
        .filter_map(|n| shape_bounds(n).map(|b| current_transform(n).map_box(&b)))
        .reduce(|acc, b| acc.union(&b))
}
