pub mod decoder;
pub mod engine;
pub mod resample;

use crate::error::PlaybackError;
use crate::models::PlaybackState;

pub use decoder::TrackDecoder;
pub use engine::CpalPlayer;
pub use resample::{remap_channels, LinearResampler};

/// Playback collaborator: plays whatever an opaque track location points at.
///
/// The session never depends on a player being available; the controller
/// reports player failures as notifications.
pub trait MediaPlayer {
    /// Load a location and start playing it from the beginning
    fn load(&mut self, location: &str) -> Result<(), PlaybackError>;

    /// Start or resume. A track that has played to its end restarts from zero.
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self) -> Result<(), PlaybackError>;

    /// Stop and rewind to the start
    fn stop(&mut self) -> Result<(), PlaybackError>;

    /// Jump to a fraction (0.0-1.0) of the track
    fn seek_fraction(&mut self, fraction: f64) -> Result<(), PlaybackError>;

    /// Fraction of the track played so far (0.0-1.0)
    fn progress(&self) -> f64;

    fn state(&self) -> PlaybackState;

    fn set_volume(&mut self, volume: f32);

    fn volume(&self) -> f32;
}
