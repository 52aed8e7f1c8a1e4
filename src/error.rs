//! Error types for the overlay engine and its loaders.
//!
//! Only the outer surfaces fail loudly. Missing geometry, missing
//! fingerings and stale passes are not errors; they degrade to "no
//! diagram" inside the pipeline.

use thiserror::Error;

/// Failure reported by an external notation renderer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Renderer rejected source: {0}")]
    InvalidSource(String),

    #[error("No tune at index {index} (source has {available})")]
    TuneIndexOutOfRange { index: usize, available: usize },

    #[error("Renderer failed: {0}")]
    Engine(String),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Problems reading or mutating a render surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("Malformed SVG markup: {0}")]
    Markup(String),

    #[error("SVG markup has no <svg> root element")]
    MissingRoot,
}

/// Problems loading tune sources, archives or catalogs.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid ABC format: missing {0}")]
    InvalidFormat(&'static str),

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open tune archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Tune source is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("No .abc files found in archive")]
    EmptyArchive,
}

/// Problems loading configuration or fingering charts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Failure from the playback collaborator. Never fatal to a render pass.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Playback error: {0}")]
pub struct PlaybackError(pub String);

/// Errors surfaced by the render pipeline coordinator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinatorError {
    #[error("Render pass failed: {0}")]
    Render(#[from] RenderError),

    #[error("No render has been requested yet")]
    NothingToRerender,
}

/// Errors from the one-shot `overlay_svg` entry point.
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("Invalid semantic note JSON: {0}")]
    SemanticNotes(serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
