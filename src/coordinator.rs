//! Render pipeline coordination.
//!
//! A render pass moves through `Idle → Rendering → AwaitingLayout →
//! Placing → Idle`. Layout commit is asynchronous in typical hosts, so a
//! pass stops after rendering and hands the host a [`PassTicket`]; the host
//! calls [`RenderCoordinator::layout_complete`] once the wait it names has
//! elapsed (or the renderer has signalled). Scheduling is single-threaded.
//!
//! Last request wins: every request bumps a generation counter, and a
//! ticket from an older generation never touches the overlay.

use std::time::Duration;

use crate::align::align;
use crate::config::OverlayConfig;
use crate::error::{CoordinatorError, RenderError};
use crate::fingering::FingeringProvider;
use crate::geometry::extract_from_glyphs;
use crate::model::{PositionedDiagram, SemanticEntry};
use crate::overlay::OverlayManager;
use crate::placement::place;
use crate::playback::{NoPlayback, PlaybackControl};
use crate::render::{NotationParser, NotationRenderer, RenderOptions, RenderedTune, TuneMetadata};
use crate::staff::group;
use crate::surface::{RenderSurface, StaffAnchorMap};

/// Run extraction, alignment, grouping and placement against a surface.
///
/// Pure with respect to the surface: nothing is written.
pub fn compute_overlay<S, F>(
    surface: &S,
    semantic: &[SemanticEntry],
    provider: &F,
    config: &OverlayConfig,
) -> Vec<PositionedDiagram>
where
    S: RenderSurface + ?Sized,
    F: FingeringProvider + ?Sized,
{
    let glyphs = surface.glyphs();
    let rendered = extract_from_glyphs(&glyphs, &config.markers);
    let anchors = StaffAnchorMap::from_glyphs(&glyphs, &config.markers);
    let alignment = align(&rendered, semantic);
    let lines = group(alignment.notes, &anchors);
    place(&lines, provider, surface.origin(), config)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Rendering,
    AwaitingLayout,
    Placing,
}

/// How long the host should wait before completing a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSettle {
    /// Geometry is readable now
    Immediate,
    /// Fixed settle delay
    After(Duration),
}

/// Handle for one render pass awaiting layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket {
    generation: u64,
    pub settle: LayoutSettle,
}

impl PassTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// A fresh overlay with this many diagrams was attached
    Applied { diagrams: usize },
    /// Fingering display is off; any overlay was removed
    Cleared,
    /// The pass was superseded and its output dropped
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub source: String,
    pub options: RenderOptions,
}

impl RenderRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into(), options: RenderOptions::default() }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

struct PendingPass {
    generation: u64,
    semantic: Vec<SemanticEntry>,
}

pub struct RenderCoordinator<S, R, P, F, B = NoPlayback>
where
    S: RenderSurface,
    R: NotationRenderer<S>,
{
    surface: S,
    renderer: R,
    parser: P,
    fingering: F,
    playback: B,
    config: OverlayConfig,
    overlay: OverlayManager,
    state: PipelineState,
    generation: u64,
    pending: Option<PendingPass>,
    tune: Option<R::Tune>,
    last_request: Option<RenderRequest>,
}

impl<S, R, P, F> RenderCoordinator<S, R, P, F, NoPlayback>
where
    S: RenderSurface,
    R: NotationRenderer<S>,
    P: NotationParser<R::Tune>,
    F: FingeringProvider,
{
    pub fn new(surface: S, renderer: R, parser: P, fingering: F, config: OverlayConfig) -> Self {
        Self {
            surface,
            renderer,
            parser,
            fingering,
            playback: NoPlayback,
            overlay: OverlayManager::new(config.overlay_id.clone()),
            config,
            state: PipelineState::Idle,
            generation: 0,
            pending: None,
            tune: None,
            last_request: None,
        }
    }

    pub fn with_playback<B: PlaybackControl<R::Tune>>(self, playback: B) -> RenderCoordinator<S, R, P, F, B> {
        RenderCoordinator {
            surface: self.surface,
            renderer: self.renderer,
            parser: self.parser,
            fingering: self.fingering,
            playback,
            config: self.config,
            overlay: self.overlay,
            state: self.state,
            generation: self.generation,
            pending: self.pending,
            tune: self.tune,
            last_request: self.last_request,
        }
    }
}

impl<S, R, P, F, B> RenderCoordinator<S, R, P, F, B>
where
    S: RenderSurface,
    R: NotationRenderer<S>,
    P: NotationParser<R::Tune>,
    F: FingeringProvider,
    B: PlaybackControl<R::Tune>,
{
    // ═══════════════════════════════════════════════════════════════════
    // Pass lifecycle
    // ═══════════════════════════════════════════════════════════════════

    /// Start a render pass, superseding any pass still in flight.
    ///
    /// On renderer failure the overlay is cleared, the pipeline returns to
    /// idle and the error is handed back; the next request runs normally.
    pub fn request_render(&mut self, request: RenderRequest) -> Result<PassTicket, CoordinatorError> {
        self.generation += 1;
        let generation = self.generation;
        if self.state != PipelineState::Idle {
            log::debug!("Pass {generation} supersedes a pass in {:?}", self.state);
        }
        self.pending = None;
        self.transition(PipelineState::Rendering);

        if self.playback.is_playing() {
            self.playback.stop();
        }

        let result = self.renderer.render(&mut self.surface, &request.source, &request.options);
        self.last_request = Some(request);

        let tune = match result {
            Ok(tune) => tune,
            Err(e) => return Err(self.fail(e)),
        };

        let semantic = self.parser.semantic_notes(&tune);
        let metadata = tune.metadata();
        log::info!(
            "Rendered '{}' ({} semantic notes)",
            metadata.title.as_deref().unwrap_or("untitled"),
            semantic.len()
        );
        if let Err(e) = self.playback.load(&tune) {
            log::warn!("{e}; continuing without audio");
        }
        self.tune = Some(tune);
        self.pending = Some(PendingPass { generation, semantic });
        self.transition(PipelineState::AwaitingLayout);

        let settle = if self.renderer.commits_layout_synchronously() {
            LayoutSettle::Immediate
        } else {
            LayoutSettle::After(self.config.layout_settle())
        };
        Ok(PassTicket { generation, settle })
    }

    /// Finish a pass once its layout has settled.
    pub fn layout_complete(&mut self, ticket: PassTicket) -> PassOutcome {
        let pending = match self.pending.take() {
            Some(p) if p.generation == ticket.generation && ticket.generation == self.generation => p,
            other => {
                self.pending = other;
                log::debug!("Dropping stale pass {} (current {})", ticket.generation, self.generation);
                return PassOutcome::Discarded;
            }
        };

        self.transition(PipelineState::Placing);

        if !self.config.show_fingerings {
            self.overlay.clear(&mut self.surface);
            self.transition(PipelineState::Idle);
            return PassOutcome::Cleared;
        }

        let diagrams = compute_overlay(&self.surface, &pending.semantic, &self.fingering, &self.config);
        let count = diagrams.len();
        self.overlay.replace(&mut self.surface, diagrams);
        self.transition(PipelineState::Idle);
        PassOutcome::Applied { diagrams: count }
    }

    /// Render and place in one go, for hosts whose layout is synchronous.
    pub fn run_pass(&mut self, request: RenderRequest) -> Result<PassOutcome, CoordinatorError> {
        let ticket = self.request_render(request)?;
        Ok(self.layout_complete(ticket))
    }

    /// Repeat the last request, e.g. after a settings change.
    pub fn rerender(&mut self) -> Result<PassTicket, CoordinatorError> {
        let request = self.last_request.clone().ok_or(CoordinatorError::NothingToRerender)?;
        self.request_render(request)
    }

    fn fail(&mut self, error: RenderError) -> CoordinatorError {
        log::error!("Render failed: {error}");
        self.tune = None;
        self.overlay.clear(&mut self.surface);
        self.transition(PipelineState::Idle);
        CoordinatorError::Render(error)
    }

    fn transition(&mut self, next: PipelineState) {
        log::debug!("Pipeline {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    // ═══════════════════════════════════════════════════════════════════
    // Settings & accessors
    // ═══════════════════════════════════════════════════════════════════

    /// Takes effect on the next completed pass.
    pub fn set_show_fingerings(&mut self, show: bool) {
        self.config.show_fingerings = show;
    }

    /// Replace the configuration. A changed overlay id clears the old layer.
    pub fn set_config(&mut self, config: OverlayConfig) {
        if config.overlay_id != self.overlay.layer_id() {
            self.overlay.clear(&mut self.surface);
            self.overlay = OverlayManager::new(config.overlay_id.clone());
        }
        self.config = config;
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for host-side changes such as scrolling.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The most recently rendered tune, if the last render succeeded.
    pub fn tune(&self) -> Option<&R::Tune> {
        self.tune.as_ref()
    }

    pub fn metadata(&self) -> Option<TuneMetadata> {
        self.tune.as_ref().map(RenderedTune::metadata)
    }

    pub fn playback(&self) -> &B {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut B {
        &mut self.playback
    }
}
