//! Staff layout grouping — collects aligned notes per physical staff line.

use std::collections::BTreeMap;

use crate::model::{AlignedNote, StaffLine};
use crate::surface::StaffAnchors;

/// Group notes by staff line, ordered by staff-line id.
///
/// Notes within a line are sorted by their left edge; equal edges keep
/// render-index order. A line whose anchor cannot be resolved is dropped
/// with all of its notes.
pub fn group<A: StaffAnchors + ?Sized>(aligned: Vec<AlignedNote>, anchors: &A) -> Vec<StaffLine> {
    let mut by_line: BTreeMap<usize, Vec<AlignedNote>> = BTreeMap::new();
    for note in aligned {
        by_line.entry(note.rendered.staff_line).or_default().push(note);
    }

    by_line
        .into_iter()
        .filter_map(|(staff_line, mut notes)| {
            let Some(anchor_top) = anchors.anchor_top(staff_line) else {
                log::debug!("Staff line {staff_line} has no anchor; dropping {} notes", notes.len());
                return None;
            };
            notes.sort_by(|a, b| {
                a.bbox()
                    .left
                    .total_cmp(&b.bbox().left)
                    .then(a.render_index().cmp(&b.render_index()))
            });
            Some(StaffLine { staff_line, anchor_top, notes })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, RenderedNote, SemanticNote};
    use pretty_assertions::assert_eq;

    fn note(index: usize, line: usize, left: f64, pitch: &str) -> AlignedNote {
        AlignedNote {
            rendered: RenderedNote {
                render_index: index,
                staff_line: line,
                measure: 0,
                bbox: BoundingBox::new(left, 60.0, 8.0, 6.0),
            },
            semantic: SemanticNote::new(pitch),
        }
    }

    fn anchors(line: usize) -> Option<f64> {
        match line {
            0 => Some(40.0),
            1 => Some(140.0),
            _ => None,
        }
    }

    #[test]
    fn sorts_each_line_left_to_right() {
        let lines = group(
            vec![note(0, 0, 50.0, "C"), note(1, 0, 10.0, "D"), note(2, 0, 30.0, "E")],
            &anchors,
        );
        assert_eq!(lines.len(), 1);
        let order: Vec<&str> = lines[0].notes.iter().map(|n| n.pitch_name()).collect();
        assert_eq!(order, vec!["D", "E", "C"]);
        assert_eq!(lines[0].anchor_top, 40.0);
    }

    #[test]
    fn equal_left_edges_keep_render_order() {
        let lines = group(
            vec![note(7, 0, 20.0, "B"), note(3, 0, 20.0, "A"), note(5, 0, 20.0, "G")],
            &anchors,
        );
        let indices: Vec<usize> = lines[0].notes.iter().map(|n| n.render_index()).collect();
        assert_eq!(indices, vec![3, 5, 7]);
    }

    #[test]
    fn lines_are_separated_and_ordered() {
        let lines = group(
            vec![note(0, 1, 10.0, "G"), note(1, 0, 90.0, "A"), note(2, 1, 5.0, "B")],
            &anchors,
        );
        let ids: Vec<usize> = lines.iter().map(|l| l.staff_line).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(lines[1].notes.len(), 2);
        assert_eq!(lines[1].notes[0].pitch_name(), "B");
        assert_eq!(lines[1].anchor_top, 140.0);
    }

    #[test]
    fn unanchored_line_is_dropped() {
        let lines = group(vec![note(0, 2, 10.0, "C"), note(1, 0, 10.0, "D")], &anchors);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].staff_line, 0);
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(group(Vec::new(), &anchors).is_empty());
    }
}
