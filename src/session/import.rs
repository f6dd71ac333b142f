use std::fs;
use std::path::{Path, PathBuf};

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, MetadataRevision, StandardTagKey};
use symphonia::core::probe::Hint;
use symphonia::default::get_probe;

use crate::config::PlayerConfig;
use crate::error::SessionError;
use crate::models::Track;

/// Turns files on disk into [`Track`] values
#[derive(Debug, Clone)]
pub struct TrackImporter {
    supported_extensions: Vec<String>,
    prefer_tag_titles: bool,
}

impl TrackImporter {
    pub fn new(supported_extensions: Vec<String>, prefer_tag_titles: bool) -> Self {
        Self {
            supported_extensions: supported_extensions
                .into_iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            prefer_tag_titles,
        }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self::new(config.supported_extensions.clone(), config.prefer_tag_titles)
    }

    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.supported_extensions.iter().any(|s| s.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// Build a track for one audio file. The location is the absolute path.
    pub fn import_file(&self, path: &Path) -> Result<Track, SessionError> {
        if !path.is_file() {
            return Err(SessionError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        if !self.is_supported(path) {
            return Err(SessionError::UnsupportedFormat {
                path: path.to_string_lossy().to_string(),
            });
        }

        let absolute = fs::canonicalize(path).map_err(|_| SessionError::FileNotFound {
            path: path.to_string_lossy().to_string(),
        })?;

        let tag_title = if self.prefer_tag_titles {
            Self::read_tag_title(&absolute)
        } else {
            None
        };

        let track = match tag_title {
            Some(title) => Track::new(title, absolute.to_string_lossy())?,
            None => {
                let from_name = Track::from_path(&absolute)?;
                log::trace!("Title from file name: {}", from_name.title());
                from_name
            }
        };

        Ok(track)
    }

    /// Recursively collect supported audio files, sorted by path
    pub fn scan_directory(&self, dir: &Path) -> Result<Vec<PathBuf>, SessionError> {
        let mut audio_files = Vec::new();

        if !dir.is_dir() {
            return Err(SessionError::FileNotFound {
                path: dir.to_string_lossy().to_string(),
            });
        }

        let entries = fs::read_dir(dir).map_err(|source| SessionError::DirectoryUnreadable {
            path: dir.to_string_lossy().to_string(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| SessionError::DirectoryUnreadable {
                path: dir.to_string_lossy().to_string(),
                source,
            })?;

            let path = entry.path();
            if path.is_dir() {
                let mut sub_files = self.scan_directory(&path)?;
                audio_files.append(&mut sub_files);
            } else if path.is_file() && self.is_supported(&path) {
                audio_files.push(path);
            }
        }

        audio_files.sort();
        Ok(audio_files)
    }

    /// Title tag of the file, if it can be probed and carries a non-empty one
    fn read_tag_title(path: &Path) -> Option<String> {
        let file = fs::File::open(path).ok()?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let mut probed = match get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        ) {
            Ok(probed) => probed,
            Err(e) => {
                log::debug!("Cannot probe {} for tags: {}", path.display(), e);
                return None;
            }
        };

        // Container metadata first, then tags found while probing (ID3)
        let container_title = probed
            .format
            .metadata()
            .current()
            .and_then(Self::title_from_revision);

        container_title.or_else(|| {
            probed
                .metadata
                .get()
                .and_then(|metadata| metadata.current().and_then(Self::title_from_revision))
        })
    }

    fn title_from_revision(revision: &MetadataRevision) -> Option<String> {
        revision
            .tags()
            .iter()
            .find(|tag| {
                tag.std_key == Some(StandardTagKey::TrackTitle)
                    || matches!(tag.key.as_str(), "TITLE" | "TIT2")
            })
            .map(|tag| tag.value.to_string().trim().to_string())
            .filter(|title| !title.is_empty())
    }
}

impl Default for TrackImporter {
    fn default() -> Self {
        Self::from_config(&PlayerConfig::default())
    }
}
