//! Bounding boxes for SVG shapes, paths and transforms.
//!
//! Path data and transform lists are parsed with `svgtypes`. Arcs come back
//! as cubic segments, and every curve is bounded by its true extrema rather
//! than its control polygon.

use std::str::FromStr;

use svgtypes::{PointsParser, SimplePathSegment, SimplifyingPathParser};

use crate::model::BoundingBox;

// ═══════════════════════════════════════════════════════════════════════
// Affine transforms
// ═══════════════════════════════════════════════════════════════════════

/// SVG 2D affine matrix in `matrix(a b c d e f)` form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<svgtypes::Transform> for Transform {
    fn from(t: svgtypes::Transform) -> Self {
        Self { a: t.a, b: t.b, c: t.c, d: t.d, e: t.e, f: t.f }
    }
}

impl Transform {
    pub const fn identity() -> Self {
        Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 }
    }

    /// `self` applied after `inner`.
    pub fn then(&self, inner: &Transform) -> Transform {
        Transform {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }

    pub fn map_box(&self, bbox: &BoundingBox) -> BoundingBox {
        let corners = [
            self.apply(bbox.left, bbox.top),
            self.apply(bbox.right(), bbox.top),
            self.apply(bbox.left, bbox.bottom()),
            self.apply(bbox.right(), bbox.bottom()),
        ];
        let mut acc = Extent::default();
        for (x, y) in corners {
            acc.add(x, y);
        }
        acc.finish().unwrap_or(*bbox)
    }

    /// Parse an SVG `transform` attribute. A malformed list reads as identity.
    pub fn parse(attr: &str) -> Transform {
        match svgtypes::Transform::from_str(attr) {
            Ok(t) => t.into(),
            Err(e) => {
                log::debug!("Ignoring transform '{attr}': {e}");
                Transform::identity()
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Extent accumulator
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
struct Extent {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }
}

impl Extent {
    fn add(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn finish(self) -> Option<BoundingBox> {
        if self.min_x > self.max_x || self.min_y > self.max_y {
            return None;
        }
        Some(BoundingBox::new(self.min_x, self.min_y, self.max_x - self.min_x, self.max_y - self.min_y))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Curve extrema
// ═══════════════════════════════════════════════════════════════════════

/// Parameters in (0, 1) where one coordinate of a cubic Bezier turns.
fn cubic_turns(p0: f64, p1: f64, p2: f64, p3: f64) -> Vec<f64> {
    // B'(t) / 3 = a t² + b t + c
    let a = p3 - 3.0 * p2 + 3.0 * p1 - p0;
    let b = 2.0 * (p2 - 2.0 * p1 + p0);
    let c = p1 - p0;
    let roots = if a.abs() < 1e-12 {
        if b.abs() < 1e-12 {
            Vec::new()
        } else {
            vec![-c / b]
        }
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            Vec::new()
        } else {
            let sq = disc.sqrt();
            vec![(-b + sq) / (2.0 * a), (-b - sq) / (2.0 * a)]
        }
    };
    roots.into_iter().filter(|t| *t > 0.0 && *t < 1.0).collect()
}

fn cubic_at(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    mt * mt * mt * p0 + 3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t * p3
}

fn add_cubic(extent: &mut Extent, from: (f64, f64), c1: (f64, f64), c2: (f64, f64), to: (f64, f64)) {
    extent.add(to.0, to.1);
    for t in cubic_turns(from.0, c1.0, c2.0, to.0) {
        let x = cubic_at(from.0, c1.0, c2.0, to.0, t);
        extent.add(x, cubic_at(from.1, c1.1, c2.1, to.1, t));
    }
    for t in cubic_turns(from.1, c1.1, c2.1, to.1) {
        let y = cubic_at(from.1, c1.1, c2.1, to.1, t);
        extent.add(cubic_at(from.0, c1.0, c2.0, to.0, t), y);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Path data
// ═══════════════════════════════════════════════════════════════════════

/// Bounds of an SVG path `d` attribute in its own user space.
///
/// Like a renderer, this stops at the first malformed segment and keeps
/// what was read before it.
pub fn path_bounds(d: &str) -> Option<BoundingBox> {
    let mut extent = Extent::default();
    let mut current = (0.0_f64, 0.0_f64);
    let mut start = current;

    for segment in SimplifyingPathParser::from(d) {
        let segment = match segment {
            Ok(s) => s,
            Err(e) => {
                log::debug!("Path data truncated at error: {e}");
                break;
            }
        };
        match segment {
            SimplePathSegment::MoveTo { x, y } => {
                current = (x, y);
                start = current;
                extent.add(x, y);
            }
            SimplePathSegment::LineTo { x, y } => {
                current = (x, y);
                extent.add(x, y);
            }
            SimplePathSegment::CurveTo { x1, y1, x2, y2, x, y } => {
                add_cubic(&mut extent, current, (x1, y1), (x2, y2), (x, y));
                current = (x, y);
            }
            SimplePathSegment::Quadratic { x1, y1, x, y } => {
                // Degree-elevate to a cubic
                let c1 = (current.0 + 2.0 / 3.0 * (x1 - current.0), current.1 + 2.0 / 3.0 * (y1 - current.1));
                let c2 = (x + 2.0 / 3.0 * (x1 - x), y + 2.0 / 3.0 * (y1 - y));
                add_cubic(&mut extent, current, c1, c2, (x, y));
                current = (x, y);
            }
            SimplePathSegment::ClosePath => current = start,
        }
    }

    extent.finish()
}

/// Bounds of a `points` list (polyline/polygon).
pub(crate) fn points_bounds(points: &str) -> Option<BoundingBox> {
    let mut extent = Extent::default();
    for (x, y) in PointsParser::from(points) {
        extent.add(x, y);
    }
    extent.finish()
}
