//! End-to-end render passes through the coordinator, using a fixture
//! renderer that hands back prepared SVG for each tune.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use fingerlib::coordinator::{LayoutSettle, PipelineState};
use fingerlib::error::PlaybackError;
use fingerlib::playback::PlaybackControl;
use fingerlib::render::{NotationRenderer, RenderOptions};
use fingerlib::{
    compute_overlay, CoordinatorError, FingeringDiagram, FingeringTable, OverlayConfig, PassOutcome,
    Point, RenderCoordinator, RenderError, RenderRequest, SemanticEntry, SemanticNote, SvgSurface,
    Tune, TuneBook,
};
use pretty_assertions::assert_eq;

const TWO_LINES: &str = include_str!("fixtures/two_lines.svg");
const SESSION: &str = include_str!("fixtures/session.abc");

const THREE_NOTES: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
<path class="abcjs-staff abcjs-l0" d="M0 40 H200 M0 72 H200"/>
<rect class="abcjs-note abcjs-l0 abcjs-m0" x="50" y="60" width="8" height="6"/>
<rect class="abcjs-note abcjs-l0 abcjs-m0" x="10" y="56" width="8" height="6"/>
<rect class="abcjs-note abcjs-l0 abcjs-m0" x="30" y="52" width="8" height="6"/>
<rect class="abcjs-rest abcjs-l0 abcjs-m1" x="80" y="48" width="6" height="14"/>
</svg>"#;

// ═══════════════════════════════════════════════════════════════════════
// Fixture collaborators
// ═══════════════════════════════════════════════════════════════════════

/// Renders a tune by looking up prepared markup under its title.
struct FixtureRenderer {
    scores: HashMap<&'static str, &'static str>,
}

impl FixtureRenderer {
    fn new() -> Self {
        let scores = HashMap::from([("The Kesh", TWO_LINES), ("Three Notes", THREE_NOTES)]);
        Self { scores }
    }
}

impl NotationRenderer<SvgSurface> for FixtureRenderer {
    type Tune = Tune;

    fn render(&mut self, surface: &mut SvgSurface, source: &str, options: &RenderOptions) -> Result<Tune, RenderError> {
        let book = TuneBook::parse(source).map_err(|e| RenderError::InvalidSource(e.to_string()))?;
        let tune = book.select(options.starting_index)?.clone();
        let title = tune.title.as_deref().unwrap_or_default();
        let markup = self
            .scores
            .get(title)
            .ok_or_else(|| RenderError::Engine(format!("no score for '{title}'")))?;
        surface.set_markup(*markup)?;
        Ok(tune)
    }

    fn commits_layout_synchronously(&self) -> bool {
        true
    }
}

fn semantic_notes(tune: &Tune) -> Vec<SemanticEntry> {
    match tune.title.as_deref() {
        Some("The Kesh") => serde_json::from_str(r#"["D", "E", null, "^F", "G", "A", "B"]"#).unwrap(),
        Some("Three Notes") => vec!["C".into(), "D".into(), "E".into(), SemanticEntry::Missing],
        _ => Vec::new(),
    }
}

fn diagrams(pitches: &[&str]) -> FingeringTable {
    pitches
        .iter()
        .map(|p| FingeringDiagram {
            pitch_name: p.to_string(),
            width: 12.0,
            height: 40.0,
            markup: r#"<rect width="12" height="40"/>"#.to_string(),
        })
        .collect()
}

type Parser = fn(&Tune) -> Vec<SemanticEntry>;

fn coordinator() -> RenderCoordinator<SvgSurface, FixtureRenderer, Parser, FingeringTable> {
    RenderCoordinator::new(
        SvgSurface::blank(),
        FixtureRenderer::new(),
        semantic_notes as Parser,
        diagrams(&["C", "D", "E", "^F", "G", "A", "B"]),
        OverlayConfig::default(),
    )
}

fn kesh() -> RenderRequest {
    RenderRequest::new(SESSION)
}

fn three_notes() -> RenderRequest {
    RenderRequest::new(SESSION).with_options(RenderOptions { starting_index: 1, ..RenderOptions::default() })
}

/// `(pitch, left, top)` of every placed diagram, in placement order.
fn placements<B: PlaybackControl<Tune>>(
    c: &RenderCoordinator<SvgSurface, FixtureRenderer, Parser, FingeringTable, B>,
) -> Vec<(String, f64, f64)> {
    let config = c.config();
    let tune = c.tune().unwrap();
    compute_overlay(c.surface(), &semantic_notes(tune), &diagrams(&["C", "D", "E", "^F", "G", "A", "B"]), config)
        .into_iter()
        .map(|p| (p.diagram.pitch_name, p.left, p.top))
        .collect()
}

fn overlay_count(markup: &str) -> usize {
    markup.matches(r#"id="fingering-overlay""#).count()
}

// ═══════════════════════════════════════════════════════════════════════
// Placement
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn two_staff_lines_are_anchored_separately() {
    let mut c = coordinator();
    let outcome = c.run_pass(kesh()).unwrap();
    assert_eq!(outcome, PassOutcome::Applied { diagrams: 6 });

    assert_eq!(
        placements(&c),
        vec![
            ("D".to_string(), 80.0, 30.0),
            ("E".to_string(), 130.0, 30.0),
            ("^F".to_string(), 260.0, 30.0),
            ("G".to_string(), 80.0, 130.0),
            ("A".to_string(), 140.0, 130.0),
            ("B".to_string(), 220.0, 130.0),
        ]
    );

    let markup = c.surface().markup();
    assert_eq!(overlay_count(markup), 1);
    assert_eq!(markup.matches(r#"class="fingering-diagram""#).count(), 6);
    assert!(markup.contains(r#"overflow="visible""#));
}

#[test]
fn sorted_by_left_edge_within_a_line() {
    let mut c = coordinator();
    c.run_pass(three_notes()).unwrap();
    let order: Vec<String> = placements(&c).into_iter().map(|(p, _, _)| p).collect();
    assert_eq!(order, vec!["D", "E", "C"]);
}

#[test]
fn suppressed_note_gets_no_diagram() {
    let surface = SvgSurface::new(THREE_NOTES).unwrap();
    let semantic = vec![
        SemanticEntry::from("C"),
        SemanticEntry::from(SemanticNote::suppressed("D")),
        SemanticEntry::from("E"),
    ];
    let placed = compute_overlay(&surface, &semantic, &diagrams(&["C", "D", "E"]), &OverlayConfig::default());
    let order: Vec<&str> = placed.iter().map(|p| p.diagram.pitch_name.as_str()).collect();
    assert_eq!(order, vec!["E", "C"]);
}

#[test]
fn scrolled_surface_places_identically() {
    let semantic = semantic_notes(&TuneBook::parse(SESSION).unwrap().tunes[0]);
    let provider = diagrams(&["D", "E", "^F", "G", "A", "B"]);
    let config = OverlayConfig::default();

    let still = SvgSurface::new(TWO_LINES).unwrap();
    let scrolled = SvgSurface::new(TWO_LINES).unwrap().with_origin(Point::new(-15.0, -420.0));
    assert_eq!(
        compute_overlay(&still, &semantic, &provider, &config),
        compute_overlay(&scrolled, &semantic, &provider, &config)
    );
}

#[test]
fn arc_and_curve_noteheads_centre_on_their_outline() {
    // Noteheads drawn as two half-ellipse arcs, one with packed flags, and
    // as cubic curves whose control points reach far past the outline.
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100">
<path class="abcjs-staff abcjs-l0" d="M0 40 H200 M0 72 H200"/>
<path class="abcjs-note abcjs-l0 abcjs-m0" d="M46 60 a4 3 0 1 0 8 0 a4 3 0 1 0 -8 0 Z"/>
<path class="abcjs-note abcjs-l0 abcjs-m0" d="M96 56a4 3 0 1010 0a4 3 0 10-10 0z"/>
<path class="abcjs-note abcjs-l0 abcjs-m1" d="M140 64 C140 40 160 40 160 64 C160 88 140 88 140 64 Z"/>
</svg>"#;
    let surface = SvgSurface::new(svg).unwrap();
    let semantic: Vec<SemanticEntry> = vec!["D".into(), "E".into(), "G".into()];

    let placed: Vec<(String, f64, f64)> =
        compute_overlay(&surface, &semantic, &diagrams(&["D", "E", "G"]), &OverlayConfig::default())
            .into_iter()
            .map(|p| (p.diagram.pitch_name, (p.left * 1000.0).round() / 1000.0, p.top))
            .collect();
    assert_eq!(
        placed,
        vec![("D".to_string(), 50.0, 30.0), ("E".to_string(), 101.0, 30.0), ("G".to_string(), 150.0, 30.0)]
    );
}

#[test]
fn repeated_passes_are_idempotent() {
    let mut c = coordinator();
    c.run_pass(kesh()).unwrap();
    let first = placements(&c);
    let first_markup = c.surface().markup().to_string();

    c.run_pass(kesh()).unwrap();
    assert_eq!(placements(&c), first);
    assert_eq!(c.surface().markup(), first_markup);
    assert_eq!(overlay_count(c.surface().markup()), 1);
}

// ═══════════════════════════════════════════════════════════════════════
// Pass lifecycle
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn newer_request_supersedes_pending_pass() {
    let mut c = coordinator();
    let a = c.request_render(kesh()).unwrap();
    let b = c.request_render(three_notes()).unwrap();
    assert_eq!(b.settle, LayoutSettle::Immediate);

    assert_eq!(c.layout_complete(a), PassOutcome::Discarded);
    assert_eq!(overlay_count(c.surface().markup()), 0);
    assert_eq!(c.layout_complete(b), PassOutcome::Applied { diagrams: 3 });

    let markup = c.surface().markup();
    assert!(markup.contains(r#"data-pitch="C""#));
    assert!(!markup.contains(r#"data-pitch="^F""#));
    assert_eq!(c.metadata().unwrap().title.as_deref(), Some("Three Notes"));
}

#[test]
fn render_failure_clears_overlay_and_recovers() {
    let mut c = coordinator();
    c.run_pass(kesh()).unwrap();
    assert_eq!(overlay_count(c.surface().markup()), 1);

    let err = c.run_pass(RenderRequest::new("X:1\nT:Missing key\n")).unwrap_err();
    assert!(matches!(err, CoordinatorError::Render(RenderError::InvalidSource(_))));
    assert_eq!(c.state(), PipelineState::Idle);
    assert_eq!(overlay_count(c.surface().markup()), 0);
    assert!(c.tune().is_none());

    assert_eq!(c.run_pass(three_notes()).unwrap(), PassOutcome::Applied { diagrams: 3 });
}

#[test]
fn out_of_range_tune_is_a_render_failure() {
    let mut c = coordinator();
    let request = RenderRequest::new(SESSION).with_options(RenderOptions { starting_index: 5, ..RenderOptions::default() });
    assert_eq!(
        c.run_pass(request).unwrap_err(),
        CoordinatorError::Render(RenderError::TuneIndexOutOfRange { index: 5, available: 2 })
    );
}

#[test]
fn hiding_fingerings_clears_on_next_pass() {
    let mut c = coordinator();
    c.run_pass(kesh()).unwrap();
    c.set_show_fingerings(false);
    // Nothing changes until a pass runs
    assert_eq!(overlay_count(c.surface().markup()), 1);

    let ticket = c.rerender().unwrap();
    assert_eq!(c.layout_complete(ticket), PassOutcome::Cleared);
    assert_eq!(overlay_count(c.surface().markup()), 0);

    c.set_show_fingerings(true);
    let ticket = c.rerender().unwrap();
    assert_eq!(c.layout_complete(ticket), PassOutcome::Applied { diagrams: 6 });
}

// ═══════════════════════════════════════════════════════════════════════
// Playback
// ═══════════════════════════════════════════════════════════════════════

#[derive(Default, Clone)]
struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
    playing: bool,
    fail_loads: bool,
}

impl PlaybackControl<Tune> for Recorder {
    fn load(&mut self, tune: &Tune) -> Result<(), PlaybackError> {
        self.events.borrow_mut().push(format!("load {}", tune.title.as_deref().unwrap_or("?")));
        if self.fail_loads {
            return Err(PlaybackError("no audio device".into()));
        }
        Ok(())
    }

    fn play(&mut self, _from_ms: f64) {
        self.playing = true;
        self.events.borrow_mut().push("play".into());
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.events.borrow_mut().push("stop".into());
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

#[test]
fn playback_stops_before_rerender_and_reloads() {
    let recorder = Recorder::default();
    let events = Rc::clone(&recorder.events);
    let mut c = coordinator().with_playback(recorder);

    c.run_pass(kesh()).unwrap();
    c.playback_mut().play(0.0);
    c.run_pass(three_notes()).unwrap();

    assert!(!c.playback().is_playing());
    assert_eq!(
        *events.borrow(),
        vec!["load The Kesh", "play", "stop", "load Three Notes"]
    );
}

#[test]
fn playback_failure_does_not_fail_the_pass() {
    let recorder = Recorder { fail_loads: true, ..Recorder::default() };
    let mut c = coordinator().with_playback(recorder);
    assert_eq!(c.run_pass(kesh()).unwrap(), PassOutcome::Applied { diagrams: 6 });
}
