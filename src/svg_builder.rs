//! SVG builder — accumulates SVG elements and produces markup.
//!
//! Used to draw fingering diagrams and to serialize the overlay layer.

// ═══════════════════════════════════════════════════════════════════════
// SvgBuilder
// ═══════════════════════════════════════════════════════════════════════

pub(crate) struct SvgBuilder {
    pub(crate) elements: Vec<String>,
}

impl SvgBuilder {
    pub(crate) fn new() -> Self {
        Self { elements: Vec::new() }
    }

    /// Concatenate the elements into a fragment with no enclosing `<svg>`.
    pub(crate) fn build_fragment(self) -> String {
        self.elements.concat()
    }

    /// Wrap the elements in `<g>` with the given attributes.
    pub(crate) fn build_group(self, attrs: &[(&str, String)]) -> String {
        let mut g = String::from("<g");
        for (name, value) in attrs {
            g.push_str(&format!(r#" {}="{}""#, name, escape_xml(value)));
        }
        g.push('>');
        for el in &self.elements {
            g.push_str(el);
        }
        g.push_str("</g>");
        g
    }

    pub(crate) fn raw(&mut self, markup: String) {
        self.elements.push(markup);
    }

    pub(crate) fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: &str, width: f64) {
        self.elements.push(format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{:.1}" stroke-linecap="round"/>"#,
            x1, y1, x2, y2, escape_xml(color), width
        ));
    }

    pub(crate) fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: &str, stroke_width: f64) {
        if stroke_width > 0.0 {
            self.elements.push(format!(
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="2" fill="{}" stroke="{}" stroke-width="{:.1}"/>"#,
                x, y, w, h, escape_xml(fill), escape_xml(stroke), stroke_width
            ));
        } else {
            self.elements.push(format!(
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                x, y, w, h, escape_xml(fill)
            ));
        }
    }

    pub(crate) fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, stroke: &str, stroke_width: f64) {
        self.elements.push(format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}" stroke="{}" stroke-width="{:.1}"/>"#,
            cx, cy, r, escape_xml(fill), escape_xml(stroke), stroke_width
        ));
    }

    /// Left half of a circle, filled. Drawn over an open circle for half-holes.
    pub(crate) fn half_disc(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        self.elements.push(format!(
            r#"<path d="M{:.1},{:.1} A{:.1},{:.1} 0 0 0 {:.1},{:.1} Z" fill="{}"/>"#,
            cx, cy - r, r, r, cx, cy + r, escape_xml(fill)
        ));
    }

    pub(crate) fn text(&mut self, x: f64, y: f64, content: &str, size: f64, weight: &str, fill: &str, anchor: &str) {
        self.elements.push(format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="{:.0}" font-weight="{}" fill="{}" text-anchor="{}">{}</text>"#,
            x, y, size, escape_xml(weight), escape_xml(fill), escape_xml(anchor), escape_xml(content)
        ));
    }
}

pub(crate) fn escape_xml(content: &str) -> String {
    content
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
