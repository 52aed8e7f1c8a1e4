//! fingerlib — fingering-chart overlays for rendered ABC notation.
//!
//! An external renderer draws a tune into a render surface (usually SVG).
//! This crate reads note geometry back off that surface, pairs it with the
//! parser's semantic notes, and places one fingering diagram above the
//! staff for every note, as a single overlay layer on the surface.
//!
//! # Example
//! ```no_run
//! let svg = std::fs::read_to_string("kesh.svg").unwrap();
//! let notes = r#"["G", "A", "G", {"pitchName": "B", "suppressDiagram": true}]"#;
//! let annotated = fingerlib::overlay_svg(&svg, notes, None).unwrap();
//! println!("{annotated}");
//! ```

pub mod align;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fingering;
pub mod geometry;
pub mod model;
pub mod overlay;
pub mod placement;
pub mod playback;
pub mod render;
pub mod staff;
pub mod surface;
mod svg_builder;
pub mod tunebook;

#[cfg(target_os = "android")]
pub mod android;

pub use config::{GlyphMarkers, OverlayConfig};
pub use coordinator::{compute_overlay, PassOutcome, PassTicket, RenderCoordinator, RenderRequest};
pub use error::*;
pub use fingering::{FingeringProvider, FingeringTable, HoleChart};
pub use model::*;
pub use overlay::{OverlayLayer, OverlayManager};
pub use surface::{RenderSurface, SvgSurface};
pub use tunebook::{Tune, TuneBook};

/// Annotate rendered SVG with D-whistle fingering diagrams.
///
/// `semantic_json` is the parser's note list: an array whose entries are
/// pitch strings, `{ "pitchName", "suppressDiagram" }` objects, or `null`
/// for positions without a note. `config_json` overrides
/// [`OverlayConfig`] defaults; `None` keeps them all.
pub fn overlay_svg(svg: &str, semantic_json: &str, config_json: Option<&str>) -> Result<String, OverlayError> {
    let config = match config_json {
        Some(json) => OverlayConfig::from_json(json)?,
        None => OverlayConfig::default(),
    };
    let semantic: Vec<SemanticEntry> =
        serde_json::from_str(semantic_json).map_err(OverlayError::SemanticNotes)?;
    overlay_svg_with(svg, &semantic, &HoleChart::d_whistle(), &config)
}

/// Annotate rendered SVG using any fingering provider.
///
/// Any overlay already in the markup is replaced; with fingerings switched
/// off it is only removed.
pub fn overlay_svg_with<F: FingeringProvider + ?Sized>(
    svg: &str,
    semantic: &[SemanticEntry],
    provider: &F,
    config: &OverlayConfig,
) -> Result<String, OverlayError> {
    let mut surface = SvgSurface::new(svg)?;
    let overlay = OverlayManager::new(config.overlay_id.clone());

    if config.show_fingerings {
        let diagrams = compute_overlay(&surface, semantic, provider, config);
        overlay.replace(&mut surface, diagrams);
    } else {
        overlay.clear(&mut surface);
    }
    Ok(surface.into_markup())
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — for iOS (static library) and Android (JNI)
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).map(CString::into_raw).unwrap_or(std::ptr::null_mut())
}

/// Annotate SVG markup with fingering diagrams and return the new markup.
/// The caller must free the returned string with `fingerlib_free_string`.
///
/// Returns null if the markup or note JSON is invalid.
///
/// # Safety
/// `svg` and `semantic_json` must be valid null-terminated UTF-8 C strings.
/// `config_json` may be null.
#[no_mangle]
pub unsafe extern "C" fn fingerlib_overlay_svg(
    svg: *const c_char,
    semantic_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    let (Some(svg), Some(semantic)) = (unsafe { str_arg(svg) }, unsafe { str_arg(semantic_json) }) else {
        return std::ptr::null_mut();
    };
    let config = unsafe { str_arg(config_json) };

    match overlay_svg(svg, semantic, config) {
        Ok(markup) => into_c_string(markup),
        Err(e) => {
            log::error!("{e}");
            std::ptr::null_mut()
        }
    }
}

/// Scan a directory of `.abc` files and return the catalog as JSON.
/// The caller must free the returned string with `fingerlib_free_string`.
///
/// # Safety
/// `root` must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn fingerlib_catalog(root: *const c_char) -> *mut c_char {
    let Some(root) = (unsafe { str_arg(root) }) else {
        return std::ptr::null_mut();
    };
    let json = catalog::scan(root)
        .map_err(|e| e.to_string())
        .and_then(|entries| catalog::catalog_to_json(&entries).map_err(|e| e.to_string()));
    match json {
        Ok(json) => into_c_string(json),
        Err(e) => {
            log::error!("{e}");
            std::ptr::null_mut()
        }
    }
}

/// Free a string previously returned by fingerlib functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a fingerlib function, or null.
#[no_mangle]
pub unsafe extern "C" fn fingerlib_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
