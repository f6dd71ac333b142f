//! Track-list export.
//!
//! Writes `Title,URL,MD5 URL` followed by one row per track, in the order the
//! tracks are given. Fields are never quoted.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};

use crate::error::ExportError;
use crate::models::Track;

pub const HEADER: [&str; 3] = ["Title", "URL", "MD5 URL"];

/// Lowercase hexadecimal MD5 of a location string
pub fn location_digest(location: &str) -> String {
    format!("{:x}", md5::compute(location.as_bytes()))
}

/// Writes track lists as comma-separated text
pub struct TrackListExporter;

impl TrackListExporter {
    pub fn new() -> Self {
        Self
    }

    /// Write to any sink. Refuses an empty track list.
    pub fn write_to<W: Write>(&self, writer: W, tracks: &[Track]) -> Result<(), ExportError> {
        if tracks.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        let mut csv_writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .from_writer(writer);

        csv_writer.write_record(HEADER)?;
        for track in tracks {
            let digest = location_digest(track.location());
            csv_writer.write_record([track.title(), track.location(), digest.as_str()])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Create or overwrite `path`
    pub fn export(&self, path: &Path, tracks: &[Track]) -> Result<(), ExportError> {
        if tracks.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        let file = File::create(path)?;
        self.write_to(file, tracks)?;
        log::info!("Exported {} tracks to {}", tracks.len(), path.display());
        Ok(())
    }
}

impl Default for TrackListExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tracks() -> Vec<Track> {
        vec![
            Track::new("Apple", "/music/Apple.mp3").unwrap(),
            Track::new("Banana", "/music/Banana.mp3").unwrap(),
        ]
    }

    #[test]
    fn test_location_digest_is_lowercase_hex() {
        assert_eq!(location_digest(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(location_digest("abc"), "900150983cd24fb0d6963f7d28e17f72");

        let digest = location_digest("/music/Apple.mp3");
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_write_header_and_rows() {
        let mut buffer = Vec::new();
        TrackListExporter::new().write_to(&mut buffer, &tracks()).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Title,URL,MD5 URL");
        assert_eq!(
            lines[1],
            format!("Apple,/music/Apple.mp3,{}", location_digest("/music/Apple.mp3"))
        );
        assert!(lines[2].starts_with("Banana,/music/Banana.mp3,"));
    }

    #[test]
    fn test_fields_are_not_quoted() {
        let tracks = vec![Track::new("Hello, Goodbye", "/m/Hello, Goodbye.mp3").unwrap()];
        let mut buffer = Vec::new();
        TrackListExporter::new().write_to(&mut buffer, &tracks).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(!text.contains('"'));
        assert!(text.contains("Hello, Goodbye,/m/Hello, Goodbye.mp3,"));
    }

    #[test]
    fn test_empty_export_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("trackList.csv");

        let result = TrackListExporter::new().export(&path, &[]);
        assert!(matches!(result, Err(ExportError::NothingToExport)));
        assert!(!path.exists());
    }

    #[test]
    fn test_export_overwrites_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("trackList.csv");
        std::fs::write(&path, "stale content that is longer than anything else\n".repeat(10)).unwrap();

        TrackListExporter::new().export(&path, &tracks()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("stale"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("trackList.csv");
        let result = TrackListExporter::new().export(&path, &tracks());
        assert!(matches!(result, Err(ExportError::Io(_))));
    }
}
