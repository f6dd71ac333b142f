use std::path::Path;

use crate::error::SessionError;
use crate::index::TitleIndex;
use crate::models::Track;

pub mod import;

pub use import::TrackImporter;

/// Outcome of importing a file or directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

impl ImportSummary {
    fn merge(&mut self, other: ImportSummary) {
        self.added += other.added;
        self.duplicates += other.duplicates;
        self.skipped += other.skipped;
    }
}

/// The tracks of one import session.
///
/// The title index is the source of truth; `tracks` is its in-order traversal,
/// refreshed after every import and used for display and navigation.
pub struct Session {
    index: TitleIndex,
    tracks: Vec<Track>,
    current: Option<usize>,
    importer: TrackImporter,
}

impl Session {
    pub fn new(importer: TrackImporter) -> Self {
        Self {
            index: TitleIndex::new(),
            tracks: Vec::new(),
            current: None,
            importer,
        }
    }

    /// Import a file, or every supported file under a directory
    pub fn add_path(&mut self, path: &Path) -> Result<ImportSummary, SessionError> {
        if path.is_dir() {
            self.add_directory(path)
        } else {
            self.add_file(path)
        }
    }

    pub fn add_file(&mut self, path: &Path) -> Result<ImportSummary, SessionError> {
        let track = self.importer.import_file(path)?;
        let summary = self.insert(track);
        self.refresh();
        Ok(summary)
    }

    /// Files that fail to import are skipped; the rest are still added.
    pub fn add_directory(&mut self, path: &Path) -> Result<ImportSummary, SessionError> {
        let audio_files = self.importer.scan_directory(path)?;
        let mut summary = ImportSummary::default();

        for file_path in audio_files {
            match self.importer.import_file(&file_path) {
                Ok(track) => summary.merge(self.insert(track)),
                Err(e) => {
                    log::warn!("Skipping {}: {}", file_path.display(), e);
                    summary.skipped += 1;
                }
            }
        }

        self.refresh();
        Ok(summary)
    }

    /// Import several paths, stopping at the first one that fails
    pub fn add_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<ImportSummary, SessionError> {
        let mut summary = ImportSummary::default();
        for path in paths {
            summary.merge(self.add_path(path.as_ref())?);
        }
        Ok(summary)
    }

    /// Insert an already built track
    pub fn add_track(&mut self, track: Track) -> bool {
        let added = self.insert(track).added == 1;
        self.refresh();
        added
    }

    fn insert(&mut self, track: Track) -> ImportSummary {
        let title = track.title().to_string();
        if self.index.insert(track) {
            log::debug!("Indexed '{}'", title);
            ImportSummary { added: 1, ..Default::default() }
        } else {
            log::debug!("Duplicate title '{}' ignored", title);
            ImportSummary { duplicates: 1, ..Default::default() }
        }
    }

    /// Re-materialise the sorted list, keeping the current track selected
    fn refresh(&mut self) {
        let current_title = self.current_track().map(|t| t.title().to_string());
        self.tracks = self.index.traverse();

        self.current = match current_title {
            Some(title) => self.position_of(&title),
            None if self.tracks.is_empty() => None,
            None => Some(0),
        };
    }

    fn position_of(&self, title: &str) -> Option<usize> {
        self.tracks.binary_search_by(|t| t.cmp_title(title)).ok()
    }

    /// Discard the tree and the list
    pub fn clear(&mut self) {
        self.index = TitleIndex::new();
        self.tracks.clear();
        self.current = None;
    }

    pub fn index(&self) -> &TitleIndex {
        &self.index
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn first(&mut self) -> Result<&Track, SessionError> {
        if self.tracks.is_empty() {
            return Err(SessionError::EmptySession);
        }
        self.select(0)
    }

    pub fn last(&mut self) -> Result<&Track, SessionError> {
        if self.tracks.is_empty() {
            return Err(SessionError::EmptySession);
        }
        self.select(self.tracks.len() - 1)
    }

    /// Step forward without wrapping
    pub fn next(&mut self) -> Result<&Track, SessionError> {
        let current = self.current.ok_or(SessionError::EmptySession)?;
        if current + 1 >= self.tracks.len() {
            return Err(SessionError::NoNextTrack);
        }
        self.select(current + 1)
    }

    /// Step back without wrapping
    pub fn previous(&mut self) -> Result<&Track, SessionError> {
        let current = self.current.ok_or(SessionError::EmptySession)?;
        if current == 0 {
            return Err(SessionError::NoPreviousTrack);
        }
        self.select(current - 1)
    }

    pub fn jump_to(&mut self, index: usize) -> Result<&Track, SessionError> {
        if index >= self.tracks.len() {
            return Err(SessionError::InvalidIndex { index });
        }
        self.select(index)
    }

    fn select(&mut self, index: usize) -> Result<&Track, SessionError> {
        if index >= self.tracks.len() {
            return Err(SessionError::InvalidIndex { index });
        }
        self.current = Some(index);
        Ok(&self.tracks[index])
    }

    /// Plain index lookup, no change of selection
    pub fn search(&self, query: &str) -> Option<&Track> {
        self.index.search(query)
    }

    /// Look the title up in the index and make the hit the current track
    pub fn search_and_select(&mut self, query: &str) -> Result<&Track, SessionError> {
        if self.tracks.is_empty() {
            return Err(SessionError::EmptySession);
        }
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }

        let not_found = || SessionError::TrackNotFound {
            title: query.to_string(),
        };
        let found_title = self.index.search(query).ok_or_else(not_found)?.title().to_string();
        let position = self.position_of(&found_title).ok_or_else(not_found)?;

        self.select(position)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(TrackImporter::default())
    }
}
