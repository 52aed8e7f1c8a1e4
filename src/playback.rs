//! Playback boundary.
//!
//! Audio synthesis lives outside this crate. The coordinator only tells
//! the playback side about each freshly rendered tune and stops it before
//! a re-render; it never owns playback state.

use crate::error::PlaybackError;

pub trait PlaybackControl<T> {
    /// Prepare audio for a newly rendered tune.
    fn load(&mut self, tune: &T) -> Result<(), PlaybackError>;
    fn play(&mut self, from_ms: f64);
    fn pause(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
}

/// Stand-in for hosts without audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPlayback;

impl<T> PlaybackControl<T> for NoPlayback {
    fn load(&mut self, _tune: &T) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn play(&mut self, _from_ms: f64) {}

    fn pause(&mut self) {}

    fn stop(&mut self) {}

    fn is_playing(&self) -> bool {
        false
    }
}
