//! Hole charts — fingerings for simple-system wind instruments, drawn as
//! a column of open/covered holes.
//!
//! Charts are plain data and load from JSON:
//!
//! ```json
//! { "name": "Low G whistle", "holes": 6,
//!   "fingerings": { "G": "xxx xxx", "A": "xxx xxo", "g": "xxx xxx+" } }
//! ```
//!
//! Pattern characters: `x` covered, `o` open, `h` half-covered, and a
//! trailing `+` for the second register (blow harder). Spaces are ignored.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::FingeringProvider;
use crate::error::ConfigError;
use crate::model::FingeringDiagram;
use crate::svg_builder::SvgBuilder;

// ── Diagram dimensions (diagram user units) ─────────────────────────
const HOLE_RADIUS: f64 = 4.5;
const HOLE_SPACING: f64 = 11.0;
const HAND_GAP: f64 = 6.0;
const PADDING: f64 = 3.0;
const REGISTER_ROW: f64 = 10.0;
const DIAGRAM_WIDTH: f64 = 2.0 * (HOLE_RADIUS + PADDING) + 2.0;

// ── Colors ──────────────────────────────────────────────────────────
const BODY_FILL: &str = "#fdfcf8";
const BODY_STROKE: &str = "#8a8a8a";
const HOLE_COLOR: &str = "#1a1a1a";
const OPEN_FILL: &str = "white";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hole {
    Covered,
    Open,
    Half,
}

/// Parsed fingering: hole states top to bottom, plus register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolePattern {
    pub holes: Vec<Hole>,
    pub overblown: bool,
}

impl HolePattern {
    pub fn parse(pattern: &str) -> Option<Self> {
        let mut holes = Vec::new();
        let mut overblown = false;
        for ch in pattern.chars().filter(|c| !c.is_whitespace()) {
            if overblown {
                // Nothing may follow the register marker.
                return None;
            }
            match ch {
                'x' | 'X' => holes.push(Hole::Covered),
                'o' | 'O' | '-' => holes.push(Hole::Open),
                'h' | 'H' => holes.push(Hole::Half),
                '+' => overblown = true,
                _ => return None,
            }
        }
        Some(Self { holes, overblown })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleChart {
    pub name: String,
    pub holes: usize,
    /// Pitch name (ABC spelling) → hole pattern
    pub fingerings: BTreeMap<String, String>,
}

impl HoleChart {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let chart: HoleChart = serde_json::from_str(json)?;
        chart.validate()?;
        Ok(chart)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Six-hole tin whistle in D, pitches spelled with explicit accidentals.
    pub fn d_whistle() -> Self {
        let table: &[(&str, &str)] = &[
            ("D", "xxx xxx"),
            ("^D", "xxx xxh"),
            ("_E", "xxx xxh"),
            ("E", "xxx xxo"),
            ("F", "xxx xho"),
            ("^F", "xxx xoo"),
            ("G", "xxx ooo"),
            ("^G", "xxh ooo"),
            ("_A", "xxh ooo"),
            ("A", "xxo ooo"),
            ("^A", "xho ooo"),
            ("_B", "xho ooo"),
            ("B", "xoo ooo"),
            ("c", "oxx ooo"),
            ("^c", "ooo ooo"),
            ("_d", "ooo ooo"),
            ("d", "oxx xxx"),
            ("^d", "xxx xxh+"),
            ("_e", "xxx xxh+"),
            ("e", "xxx xxo+"),
            ("f", "xxx xho+"),
            ("^f", "xxx xoo+"),
            ("g", "xxx ooo+"),
            ("^g", "xxh ooo+"),
            ("_a", "xxh ooo+"),
            ("a", "xxo ooo+"),
            ("^a", "xho ooo+"),
            ("_b", "xho ooo+"),
            ("b", "xoo ooo+"),
            ("c'", "oxx ooo+"),
            ("^c'", "ooo ooo+"),
            ("d'", "oxx xxx+"),
        ];
        Self {
            name: "D whistle".to_string(),
            holes: 6,
            fingerings: table
                .iter()
                .map(|(pitch, pattern)| (pitch.to_string(), pattern.to_string()))
                .collect(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.holes == 0 {
            return Err(ConfigError::Invalid(format!("chart '{}' has no holes", self.name)));
        }
        for (pitch, pattern) in &self.fingerings {
            let parsed = HolePattern::parse(pattern).ok_or_else(|| {
                ConfigError::Invalid(format!("bad pattern '{pattern}' for {pitch}"))
            })?;
            if parsed.holes.len() != self.holes {
                return Err(ConfigError::Invalid(format!(
                    "pattern for {pitch} has {} holes, chart '{}' has {}",
                    parsed.holes.len(),
                    self.name,
                    self.holes
                )));
            }
        }
        Ok(())
    }

    /// Pattern for a pitch. A natural sign is the same as no accidental.
    pub fn pattern(&self, pitch_name: &str) -> Option<HolePattern> {
        let key = pitch_name.strip_prefix('=').unwrap_or(pitch_name);
        HolePattern::parse(self.fingerings.get(key)?)
    }

    fn diagram_height(&self) -> f64 {
        let split = if self.holes > 1 { HAND_GAP } else { 0.0 };
        2.0 * PADDING + REGISTER_ROW + 2.0 * HOLE_RADIUS + (self.holes as f64 - 1.0) * HOLE_SPACING + split
    }

    fn draw(&self, pattern: &HolePattern) -> String {
        let height = self.diagram_height();
        let cx = DIAGRAM_WIDTH / 2.0;
        let mut svg = SvgBuilder::new();

        svg.rect(0.5, REGISTER_ROW, DIAGRAM_WIDTH - 1.0, height - REGISTER_ROW - 0.5, BODY_FILL, BODY_STROKE, 0.8);
        if pattern.overblown {
            svg.text(cx, REGISTER_ROW - 2.0, "+", 10.0, "bold", HOLE_COLOR, "middle");
        }

        let upper_hand = self.holes / 2;
        let first_y = REGISTER_ROW + PADDING + HOLE_RADIUS;
        for (i, hole) in pattern.holes.iter().enumerate() {
            let gap = if i >= upper_hand && self.holes > 1 { HAND_GAP } else { 0.0 };
            let cy = first_y + i as f64 * HOLE_SPACING + gap;
            match hole {
                Hole::Covered => svg.circle(cx, cy, HOLE_RADIUS, HOLE_COLOR, HOLE_COLOR, 1.0),
                Hole::Open => svg.circle(cx, cy, HOLE_RADIUS, OPEN_FILL, HOLE_COLOR, 1.0),
                Hole::Half => {
                    svg.circle(cx, cy, HOLE_RADIUS, OPEN_FILL, HOLE_COLOR, 1.0);
                    svg.half_disc(cx, cy, HOLE_RADIUS, HOLE_COLOR);
                }
            }
        }

        if self.holes > 1 {
            let split_y = first_y + (upper_hand as f64 - 0.5) * HOLE_SPACING + HAND_GAP / 2.0;
            svg.line(2.0, split_y, DIAGRAM_WIDTH - 2.0, split_y, BODY_STROKE, 0.6);
        }

        svg.build_fragment()
    }
}

impl FingeringProvider for HoleChart {
    fn lookup(&self, pitch_name: &str) -> Option<FingeringDiagram> {
        let pattern = self.pattern(pitch_name)?;
        Some(FingeringDiagram {
            pitch_name: pitch_name.to_string(),
            width: DIAGRAM_WIDTH,
            height: self.diagram_height(),
            markup: self.draw(&pattern),
        })
    }
}
