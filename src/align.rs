//! Note data alignment — joins rendered notes with parser output by index.
//!
//! The renderer and the parser produce their sequences independently; the
//! only link between them is position. Both must come from the same
//! render pass. When they visibly disagree the mismatch is logged and
//! reported, but never treated as an error.

use std::collections::HashMap;

use crate::model::{AlignedNote, RenderedNote, SemanticEntry, SemanticNote};

/// Result of aligning one render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    /// Matched notes, in the order of the rendered input
    pub notes: Vec<AlignedNote>,
    /// Render indices that had no semantic counterpart
    pub unmatched: Vec<usize>,
}

impl Alignment {
    pub fn is_consistent(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Index → normalized semantic note. Holes (`null` entries) are absent.
pub fn semantic_lookup(semantic: &[SemanticEntry]) -> HashMap<usize, SemanticNote> {
    semantic
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| entry.normalize().map(|note| (i, note)))
        .collect()
}

/// Join `rendered` with `semantic` by `render_index`.
///
/// Suppressed notes are kept here; placement is where they drop out.
pub fn align(rendered: &[RenderedNote], semantic: &[SemanticEntry]) -> Alignment {
    let lookup = semantic_lookup(semantic);
    let mut alignment = Alignment::default();

    for note in rendered {
        match lookup.get(&note.render_index) {
            Some(semantic) => alignment.notes.push(AlignedNote {
                rendered: note.clone(),
                semantic: semantic.clone(),
            }),
            None => alignment.unmatched.push(note.render_index),
        }
    }

    let rendered_span = rendered.iter().map(|n| n.render_index + 1).max().unwrap_or(0);
    if !alignment.unmatched.is_empty() {
        log::warn!(
            "{} rendered notes have no semantic entry (first at index {}); {} rendered index slots vs {} semantic entries",
            alignment.unmatched.len(),
            alignment.unmatched[0],
            rendered_span,
            semantic.len()
        );
    } else if rendered_span > 0 && semantic.len() > rendered_span {
        log::debug!(
            "Parser produced {} entries but only {} rendered index slots",
            semantic.len(),
            rendered_span
        );
    }

    alignment
}
