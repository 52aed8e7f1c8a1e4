//! ABC tune books — acceptance checks, splitting and header fields.
//!
//! A tune book is plain ABC text holding one or more tunes. Each tune
//! starts at an `X:` reference line; the fields the engine cares about are
//! read from the header lines that follow it.

use serde::Serialize;

use crate::error::{LoadError, RenderError};
use crate::render::{RenderedTune, TuneMetadata};

/// Reject text that cannot be an ABC tune.
///
/// A usable source has a tune header (`X:`) and a key field (`K:`), each at
/// the start of a line.
pub fn validate_source(source: &str) -> Result<(), LoadError> {
    if !has_field(source, 'X') {
        return Err(LoadError::InvalidFormat("tune header (X:)"));
    }
    if !has_field(source, 'K') {
        return Err(LoadError::InvalidFormat("key field (K:)"));
    }
    Ok(())
}

/// First `T:` value in `source`, trimmed.
pub fn extract_title(source: &str) -> Option<String> {
    field_values(source, 'T').next().map(str::to_string)
}

fn has_field(source: &str, field: char) -> bool {
    field_values(source, field).next().is_some()
}

/// Values of every `<field>:` line, in order.
fn field_values(source: &str, field: char) -> impl Iterator<Item = &str> {
    source.lines().filter_map(move |line| {
        let rest = line.trim_start_matches('\u{feff}').strip_prefix(field)?;
        Some(rest.strip_prefix(':')?.trim())
    })
}

/// One tune of a tune book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tune {
    /// Value of the `X:` line
    pub reference: String,
    pub title: Option<String>,
    pub meter: Option<String>,
    /// Quarter-note beats per minute from `Q:`
    pub tempo_bpm: Option<f64>,
    pub key: Option<String>,
    /// Full tune text, header included
    pub text: String,
}

impl Tune {
    fn from_text(text: String) -> Self {
        let header = || text.lines().take_while(|l| !l.trim().is_empty());
        let field = |f: char| {
            header().find_map(|line| {
                line.strip_prefix(f)
                    .and_then(|r| r.strip_prefix(':'))
                    .map(|r| r.trim().to_string())
            })
        };
        let reference = field('X').unwrap_or_default();
        let title = field('T').filter(|t| !t.is_empty());
        let meter = field('M').filter(|m| !m.is_empty());
        let key = field('K').filter(|k| !k.is_empty());
        let tempo_bpm = field('Q').and_then(|q| parse_tempo(&q));
        Self { reference, title, meter, tempo_bpm, key, text }
    }
}

impl RenderedTune for Tune {
    fn metadata(&self) -> TuneMetadata {
        TuneMetadata {
            title: self.title.clone(),
            tempo_bpm: self.tempo_bpm,
            meter: self.meter.clone(),
        }
    }
}

/// Read the beat rate out of a `Q:` value such as `1/4=120`,
/// `"Allegro" 3/8=100` or a bare `120`.
fn parse_tempo(value: &str) -> Option<f64> {
    let rate = match value.rfind('=') {
        Some(eq) => &value[eq + 1..],
        None => value,
    };
    let digits: String = rate
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok().filter(|bpm| *bpm > 0.0)
}

/// An ordered collection of tunes parsed from one source.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TuneBook {
    pub tunes: Vec<Tune>,
}

impl TuneBook {
    /// Split `source` into tunes. Text before the first `X:` line (the
    /// file header) is not a tune and is dropped.
    pub fn parse(source: &str) -> Result<Self, LoadError> {
        validate_source(source)?;

        let mut tunes = Vec::new();
        let mut current: Option<String> = None;
        for line in source.lines() {
            if line.trim_start_matches('\u{feff}').starts_with("X:") {
                if let Some(text) = current.take() {
                    tunes.push(Tune::from_text(text));
                }
                current = Some(String::new());
            }
            if let Some(text) = current.as_mut() {
                text.push_str(line.trim_start_matches('\u{feff}'));
                text.push('\n');
            }
        }
        if let Some(text) = current {
            tunes.push(Tune::from_text(text));
        }

        log::debug!("Parsed tune book with {} tunes", tunes.len());
        Ok(Self { tunes })
    }

    pub fn len(&self) -> usize {
        self.tunes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tunes.is_empty()
    }

    /// Tune shown for a render's `starting_index`.
    pub fn select(&self, starting_index: usize) -> Result<&Tune, RenderError> {
        self.tunes.get(starting_index).ok_or(RenderError::TuneIndexOutOfRange {
            index: starting_index,
            available: self.tunes.len(),
        })
    }

    pub fn titles(&self) -> Vec<Option<&str>> {
        self.tunes.iter().map(|t| t.title.as_deref()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BOOK: &str = "%abc-2.1\n%%scale 0.8\n\nX:1\nT:The Kesh\nM:6/8\nQ:3/8=116\nK:G\nGAG GAB|\n\nX:2\nT:Out on the Ocean\nM:6/8\nK:G\nDEG G2A|\n";

    #[test]
    fn accepts_and_rejects_sources() {
        assert!(validate_source("X:1\nK:D\nd2").is_ok());
        assert!(matches!(validate_source("T:No header\nK:D\n"), Err(LoadError::InvalidFormat(_))));
        assert!(matches!(validate_source("X:1\nT:No key\n"), Err(LoadError::InvalidFormat(_))));
        // Markers must start a line
        assert!(validate_source("text X:1 and K:D").is_err());
    }

    #[test]
    fn splits_tunes_and_reads_headers() {
        let book = TuneBook::parse(BOOK).unwrap();
        assert_eq!(book.titles(), vec![Some("The Kesh"), Some("Out on the Ocean")]);

        let kesh = book.select(0).unwrap();
        assert_eq!(kesh.reference, "1");
        assert_eq!(kesh.key.as_deref(), Some("G"));
        assert!(kesh.text.starts_with("X:1\n"));
        assert!(!kesh.text.contains("%%scale"));
        assert_eq!(
            kesh.metadata(),
            TuneMetadata { title: Some("The Kesh".into()), tempo_bpm: Some(116.0), meter: Some("6/8".into()) }
        );
    }

    #[test]
    fn starting_index_out_of_range() {
        let book = TuneBook::parse(BOOK).unwrap();
        assert_eq!(
            book.select(2).unwrap_err(),
            RenderError::TuneIndexOutOfRange { index: 2, available: 2 }
        );
    }

    #[test]
    fn tempo_forms() {
        assert_eq!(parse_tempo("1/4=120"), Some(120.0));
        assert_eq!(parse_tempo("\"Allegro\" 1/4= 132"), Some(132.0));
        assert_eq!(parse_tempo("96"), Some(96.0));
        assert_eq!(parse_tempo("\"Slow\""), None);
    }

    #[test]
    fn title_is_first_t_field() {
        assert_eq!(extract_title("X:1\nT: Drowsy Maggie \nT:Alt\nK:D"), Some("Drowsy Maggie".into()));
        assert_eq!(extract_title("X:1\nK:D"), None);
    }
}
