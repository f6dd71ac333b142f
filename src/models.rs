use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

use crate::error::TrackError;

/// A playable track: a display title and an opaque location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    title: String,
    location: String,
}

impl Track {
    /// Create a track. The title is the sort and search key and must not be empty.
    pub fn new(title: impl Into<String>, location: impl Into<String>) -> Result<Self, TrackError> {
        let title = title.into();
        if title.is_empty() {
            return Err(TrackError::EmptyTitle);
        }

        Ok(Self {
            title,
            location: location.into(),
        })
    }

    /// Build a track from a file path: the title is the file name without its
    /// last extension, the location is the path as given.
    pub fn from_path(path: &Path) -> Result<Self, TrackError> {
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| TrackError::UnreadableName {
                path: path.to_string_lossy().to_string(),
            })?;

        Self::new(title, path.to_string_lossy())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Ordinal (codepoint, case-sensitive) comparison of titles
    pub fn cmp_title(&self, title: &str) -> Ordering {
        self.title.as_str().cmp(title)
    }

    /// Case-insensitive title equality
    pub fn title_matches(&self, query: &str) -> bool {
        let mut lhs = self.title.chars().flat_map(char::to_lowercase);
        let mut rhs = query.chars().flat_map(char::to_lowercase);
        loop {
            match (lhs.next(), rhs.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if a == b => continue,
                _ => return false,
            }
        }
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Current player status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub state: PlaybackState,
    pub current_track: Option<Track>,
    pub position: Option<usize>,
    pub track_count: usize,
    pub progress: f64,
    pub volume: f32,
}

impl PlayerStatus {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Stopped,
            current_track: None,
            position: None,
            track_count: 0,
            progress: 0.0,
            volume: 1.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, PlaybackState::Playing)
    }

    /// Progress as a whole percentage (0-100)
    pub fn progress_percent(&self) -> u8 {
        (self.progress.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Playback state enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    /// Get a human-readable string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_track_creation() {
        let track = Track::new("Test Song", "/music/test.mp3").unwrap();
        assert_eq!(track.title(), "Test Song");
        assert_eq!(track.location(), "/music/test.mp3");
    }

    #[test]
    fn test_track_rejects_empty_title() {
        let result = Track::new("", "/music/.mp3");
        assert!(matches!(result, Err(TrackError::EmptyTitle)));
    }

    #[test]
    fn test_track_from_path_strips_last_extension() {
        let track = Track::from_path(&PathBuf::from("/music/My.Song.mp3")).unwrap();
        assert_eq!(track.title(), "My.Song");
        assert_eq!(track.location(), "/music/My.Song.mp3");
    }

    #[test]
    fn test_track_from_path_without_name() {
        assert!(Track::from_path(&PathBuf::from("/")).is_err());
    }

    #[test]
    fn test_cmp_title_is_ordinal() {
        let track = Track::new("apple", "x").unwrap();
        // Uppercase letters sort before lowercase ones
        assert_eq!(track.cmp_title("Banana"), Ordering::Greater);
        assert_eq!(track.cmp_title("banana"), Ordering::Less);
        assert_eq!(track.cmp_title("apple"), Ordering::Equal);
    }

    #[test]
    fn test_title_matches_ignores_case() {
        let track = Track::new("Hey Jude", "x").unwrap();
        assert!(track.title_matches("hey jude"));
        assert!(track.title_matches("HEY JUDE"));
        assert!(!track.title_matches("hey jud"));
        assert!(!track.title_matches("hey judes"));

        let track = Track::new("Ärger", "x").unwrap();
        assert!(track.title_matches("äRGER"));
    }

    #[test]
    fn test_player_status_defaults() {
        let status = PlayerStatus::default();
        assert_eq!(status.state, PlaybackState::Stopped);
        assert!(status.current_track.is_none());
        assert!(!status.is_playing());
        assert_eq!(status.progress_percent(), 0);
    }

    #[test]
    fn test_progress_percent_clamps() {
        let mut status = PlayerStatus::new();
        status.progress = 0.456;
        assert_eq!(status.progress_percent(), 46);
        status.progress = 1.7;
        assert_eq!(status.progress_percent(), 100);
    }

    #[test]
    fn test_playback_state_display() {
        assert_eq!(PlaybackState::Playing.to_string(), "Playing");
        assert_eq!(PlaybackState::Paused.as_str(), "Paused");
    }

    #[test]
    fn test_track_serialization() {
        let track = Track::new("Song", "/a/Song.flac").unwrap();
        let serialized = serde_json::to_string(&track).expect("Failed to serialize Track");
        let deserialized: Track = serde_json::from_str(&serialized).expect("Failed to deserialize Track");
        assert_eq!(track, deserialized);
    }
}
