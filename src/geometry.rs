//! Geometry extraction — finds pitched note glyphs on a render surface.

use crate::config::GlyphMarkers;
use crate::model::RenderedNote;
use crate::surface::{Glyph, RenderSurface};

/// Read every pitched note glyph from the surface.
///
/// See [`extract_from_glyphs`].
pub fn extract<S: RenderSurface + ?Sized>(surface: &S, markers: &GlyphMarkers) -> Vec<RenderedNote> {
    extract_from_glyphs(&surface.glyphs(), markers)
}

/// Turn render-order glyphs into rendered notes.
///
/// Glyphs tagged as notes or rests form the note-bearing sequence that
/// numbers `render_index`; rests then drop out, leaving gaps. Clefs, key
/// and time signatures and tempo marks never count. A glyph without a
/// staff-line marker cannot be anchored and is skipped; a missing measure
/// marker reads as measure 0.
pub fn extract_from_glyphs(glyphs: &[Glyph], markers: &GlyphMarkers) -> Vec<RenderedNote> {
    let mut notes = Vec::new();
    let mut render_index = 0usize;

    for glyph in glyphs {
        if markers.non_pitched.iter().any(|role| glyph.has_class(role)) {
            continue;
        }
        let is_rest = glyph.has_class(&markers.rest);
        if !is_rest && !glyph.has_class(&markers.note) {
            continue;
        }
        let index = render_index;
        render_index += 1;
        if is_rest {
            continue;
        }

        let Some(staff_line) = glyph.class_index(&markers.line_prefix) else {
            log::debug!("Note glyph {index} has no staff-line marker; skipped");
            continue;
        };
        let measure = glyph.class_index(&markers.measure_prefix).unwrap_or(0);

        notes.push(RenderedNote {
            render_index: index,
            staff_line,
            measure,
            bbox: glyph.bbox,
        });
    }

    notes
}
