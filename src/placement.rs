//! Diagram placement — computes where each fingering diagram goes.
//!
//! Coordinates are relative to the render surface origin rather than the
//! viewport, so a scrolled surface yields the same placement.

use crate::config::OverlayConfig;
use crate::fingering::FingeringProvider;
use crate::model::{Placement, Point, PositionedDiagram, StaffLine};

/// Place one diagram per note, walking staff lines and notes in order.
///
/// Suppressed notes and pitches the provider has no diagram for are
/// skipped. Every diagram on a staff line shares the same vertical anchor,
/// `vertical_offset` above the top of the staff.
pub fn place<F: FingeringProvider + ?Sized>(
    staff_lines: &[StaffLine],
    provider: &F,
    container_origin: Point,
    config: &OverlayConfig,
) -> Vec<PositionedDiagram> {
    let mut placed = Vec::new();

    for line in staff_lines {
        let top = match config.placement {
            Placement::Above => line.anchor_top - container_origin.top - config.vertical_offset,
        };

        for note in &line.notes {
            if note.semantic.suppress_diagram {
                continue;
            }
            let Some(diagram) = provider.lookup(note.pitch_name()) else {
                log::debug!(
                    "No fingering for '{}' (note {}); skipped",
                    note.pitch_name(),
                    note.render_index()
                );
                continue;
            };
            placed.push(PositionedDiagram {
                diagram,
                left: note.bbox().center_x() - container_origin.left,
                top,
                scale: config.scale,
            });
        }
    }

    placed
}
