use crate::error::{ErrorSeverity, PlayerError, SessionError};
use crate::logging::{EventStatistics, SessionEvent};
use crate::models::{PlayerStatus, Track};

const BAR_WIDTH: usize = 40;

/// Events listed under the status box
pub const RECENT_EVENT_COUNT: usize = 5;

/// Status display formatter for the CLI
pub struct StatusDisplay;

impl StatusDisplay {
    /// Display player status with the selected track and progress bar
    pub fn display_full_status(status: &PlayerStatus) {
        print!("{}", Self::render_full_status(status));
    }

    pub fn render_full_status(status: &PlayerStatus) -> String {
        let mut out = String::new();
        out.push_str("┌─ Player Status ─────────────────────────────────────────┐\n");

        match &status.current_track {
            Some(track) => {
                out.push_str(&format!("│ Track: {}\n", Self::truncate(track.title(), 50)));
                if let Some(position) = status.position {
                    out.push_str(&format!("│ Position: {} of {}\n", position + 1, status.track_count));
                }
                out.push_str(&format!("│ Location: {}\n", Self::truncate(track.location(), 47)));
                out.push_str("│\n");
                out.push_str(&format!("│ Status: {}\n", status.state.as_str()));
                out.push_str(&format!(
                    "│ Progress: [{}] {}%\n",
                    Self::progress_bar(status.progress, BAR_WIDTH),
                    status.progress_percent()
                ));
            }
            None => {
                out.push_str("│ No track selected\n");
                out.push_str(&format!("│ Tracks: {}\n", status.track_count));
                out.push_str(&format!("│ Status: {}\n", status.state.as_str()));
            }
        }

        out.push_str("│\n");
        out.push_str(&format!("│ Volume: {}%\n", (status.volume * 100.0).round() as u8));
        out.push_str("└─────────────────────────────────────────────────────────┘\n");
        out
    }

    /// Event counts for this session followed by the latest events
    pub fn display_activity(stats: &EventStatistics, recent: &[SessionEvent]) {
        print!("{}", Self::render_activity(stats, recent));
    }

    pub fn render_activity(stats: &EventStatistics, recent: &[SessionEvent]) -> String {
        let mut out = format!(
            "Activity: {} imports, {} searches ({} missed), {} exports, {} errors\n",
            stats.imports,
            stats.search_hits + stats.search_misses,
            stats.search_misses,
            stats.exports,
            stats.errors
        );
        for event in recent {
            out.push_str(&format!(
                "  {} {:<15} {}\n",
                event.timestamp.format("%H:%M:%S"),
                event.event_type.as_str(),
                Self::truncate(&event.details, 50)
            ));
        }
        out
    }

    /// Numbered track list, with `>` beside the selected track
    pub fn display_track_list(tracks: &[Track], current: Option<usize>) {
        print!("{}", Self::render_track_list(tracks, current));
    }

    pub fn render_track_list(tracks: &[Track], current: Option<usize>) -> String {
        if tracks.is_empty() {
            return "No songs added\n".to_string();
        }

        let width = tracks.len().to_string().len();
        let mut out = String::new();
        for (i, track) in tracks.iter().enumerate() {
            let marker = if Some(i) == current { '>' } else { ' ' };
            out.push_str(&format!("{} {:>width$}. {}\n", marker, i + 1, track.title(), width = width));
        }
        out
    }

    /// Display error message with formatting and recovery suggestions
    pub fn display_error(error: &PlayerError) {
        eprint!("{}", Self::render_error(error));
    }

    pub fn render_error(error: &PlayerError) -> String {
        let severity = error.severity();
        let severity_icon = match severity {
            ErrorSeverity::Info => "ℹ",
            ErrorSeverity::Warning => "⚠",
            ErrorSeverity::Error => "✗",
            ErrorSeverity::Critical => "🔥",
        };

        let mut out = format!(
            "┌─ {} {} ─────────────────────────────────────────────────┐\n",
            severity_icon,
            severity.as_str()
        );

        for line in Self::wrap_text(&error.user_message(), 55) {
            out.push_str(&format!("│ {}\n", line));
        }

        let suggestions = error.recovery_suggestions();
        if !suggestions.is_empty() {
            out.push_str("│\n│ Suggestions:\n");
            for suggestion in suggestions.iter().take(3) {
                for line in Self::wrap_text(&format!("• {}", suggestion), 53) {
                    out.push_str(&format!("│   {}\n", line));
                }
            }
        }

        if let Some(hint) = Self::error_context(error) {
            out.push_str(&format!("│\n│ {}\n", hint));
        }

        out.push_str("└─────────────────────────────────────────────────────────┘\n");
        out
    }

    fn error_context(error: &PlayerError) -> Option<&'static str> {
        match error {
            PlayerError::Session(SessionError::EmptySession) => Some("Import music with 'add <path>'"),
            PlayerError::Session(SessionError::UnsupportedFormat { .. }) => {
                Some("Supported extensions are set in config.toml")
            }
            PlayerError::Config(_) => Some("Configuration will use default values"),
            _ => None,
        }
    }

    /// Short notification for one-shot commands
    pub fn display_simple_error(error: &PlayerError) {
        eprintln!("{}", Self::render_simple_error(error));
    }

    pub fn render_simple_error(error: &PlayerError) -> String {
        let mut out = format!("[{}] {}", error.severity().as_str(), error.user_message());
        if let Some(suggestion) = error.recovery_suggestions().first() {
            out.push_str(&format!("\nSuggestion: {}", suggestion));
        }
        out
    }

    /// Wrap text to fit within the given width
    fn wrap_text(text: &str, width: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current_line = String::new();

        for word in text.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.chars().count() + word.chars().count() < width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current_line));
                current_line = word.to_string();
            }
        }

        if !current_line.is_empty() {
            lines.push(current_line);
        }
        lines
    }

    pub fn progress_bar(progress: f64, width: usize) -> String {
        let filled = ((progress.clamp(0.0, 1.0) * width as f64) as usize).min(width);
        format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
    }

    /// Shorten to `max_len` characters, ending in an ellipsis
    pub fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len || max_len <= 3 {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len - 3).collect();
            format!("{}...", kept)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::logging::SessionLogger;
    use crate::models::PlaybackState;

    fn tracks() -> Vec<Track> {
        ["Apple", "Banana", "Cherry"]
            .iter()
            .map(|t| Track::new(*t, format!("/music/{}.mp3", t)).unwrap())
            .collect()
    }

    #[test]
    fn test_track_list_marks_selection() {
        let text = StatusDisplay::render_track_list(&tracks(), Some(1));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["  1. Apple", "> 2. Banana", "  3. Cherry"]);
    }

    #[test]
    fn test_empty_track_list() {
        assert_eq!(StatusDisplay::render_track_list(&[], None), "No songs added\n");
    }

    #[test]
    fn test_full_status_with_track() {
        let mut status = PlayerStatus::new();
        status.state = PlaybackState::Playing;
        status.current_track = Some(tracks().remove(2));
        status.position = Some(2);
        status.track_count = 3;
        status.progress = 0.5;

        let text = StatusDisplay::render_full_status(&status);
        assert!(text.contains("Track: Cherry"));
        assert!(text.contains("Position: 3 of 3"));
        assert!(text.contains("Status: Playing"));
        assert!(text.contains("50%"));
    }

    #[test]
    fn test_activity_lists_counts_and_events() {
        let logger = SessionLogger::new();
        logger.log_tracks_imported(3, 0, 1, std::time::Duration::from_millis(2));
        logger.log_search("kiwi", None);
        logger.log_search("apple", Some("Apple"));

        let text = StatusDisplay::render_activity(
            &logger.get_event_statistics(),
            &logger.get_recent_events(RECENT_EVENT_COUNT),
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Activity: 1 imports, 2 searches (1 missed), 0 exports, 0 errors");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("TRACKS_IMPORTED"));
        assert!(lines[3].contains("SEARCH_HIT"));
        assert!(lines[3].ends_with("'apple' matched 'Apple'"));
    }

    #[test]
    fn test_render_error_includes_suggestions() {
        let error = PlayerError::Export(ExportError::NothingToExport);
        let text = StatusDisplay::render_error(&error);
        assert!(text.contains("WARNING"));
        assert!(text.contains("Suggestions:"));

        let simple = StatusDisplay::render_simple_error(&PlayerError::Session(SessionError::EmptySession));
        assert!(simple.starts_with("[INFO] "));
        assert!(simple.contains("Suggestion: "));
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(StatusDisplay::progress_bar(0.0, 4), "░░░░");
        assert_eq!(StatusDisplay::progress_bar(0.5, 4), "██░░");
        assert_eq!(StatusDisplay::progress_bar(2.0, 4), "████");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(StatusDisplay::truncate("short", 10), "short");
        assert_eq!(StatusDisplay::truncate("Ünïcödé title", 8), "Ünïcö...");
    }

    #[test]
    fn test_wrap_text() {
        let lines = StatusDisplay::wrap_text("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }
}
