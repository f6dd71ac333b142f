use chrono::{DateTime, Utc};
use log::{debug, error, info, trace, warn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_EVENTS: usize = 1000;

/// Environment variable holding the log level
pub const LOG_LEVEL_VAR: &str = "TITLETREE_LOG_LEVEL";

/// Session event, listed by the `status` command
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: SessionEventType,
    pub duration: Option<Duration>,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEventType {
    TracksImported,
    SearchHit,
    SearchMiss,
    Navigation,
    Playback,
    Export,
    SessionCleared,
    Error,
}

impl SessionEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionEventType::TracksImported => "TRACKS_IMPORTED",
            SessionEventType::SearchHit => "SEARCH_HIT",
            SessionEventType::SearchMiss => "SEARCH_MISS",
            SessionEventType::Navigation => "NAVIGATION",
            SessionEventType::Playback => "PLAYBACK",
            SessionEventType::Export => "EXPORT",
            SessionEventType::SessionCleared => "SESSION_CLEARED",
            SessionEventType::Error => "ERROR",
        }
    }
}

/// Parse a level name, falling back to `default` for anything unrecognised
pub fn parse_level(value: &str, default: log::LevelFilter) -> log::LevelFilter {
    match value.trim().to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" | "warning" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "off" => log::LevelFilter::Off,
        _ => default,
    }
}

/// Bounded history of session events, mirrored to the `log` macros
#[derive(Clone)]
pub struct SessionLogger {
    events: Arc<Mutex<VecDeque<SessionEvent>>>,
    max_events: usize,
}

impl SessionLogger {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
            max_events: MAX_EVENTS,
        }
    }

    /// Install the env_logger backend. Level comes from `TITLETREE_LOG_LEVEL`
    /// and defaults to warn.
    pub fn init() -> Result<(), Box<dyn std::error::Error>> {
        let log_level = std::env::var(LOG_LEVEL_VAR).unwrap_or_else(|_| "warn".to_string());
        let filter = parse_level(&log_level, log::LevelFilter::Warn);

        let mut builder = env_logger::Builder::new();
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] [{}:{}] {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        });
        builder.filter_level(filter);
        builder.try_init()?;

        info!("Logging initialized with level: {}", filter);
        Ok(())
    }

    pub fn log_event(&self, event_type: SessionEventType, details: String, duration: Option<Duration>) {
        match event_type {
            SessionEventType::TracksImported
            | SessionEventType::Export
            | SessionEventType::SessionCleared => {
                info!("[{}] {}", event_type.as_str(), details);
            }
            SessionEventType::SearchHit
            | SessionEventType::SearchMiss
            | SessionEventType::Navigation
            | SessionEventType::Playback => {
                debug!("[{}] {}", event_type.as_str(), details);
            }
            SessionEventType::Error => {
                error!("[{}] {}", event_type.as_str(), details);
            }
        }

        let event = SessionEvent {
            timestamp: Utc::now(),
            event_type,
            duration,
            details,
        };

        if let Ok(mut events) = self.events.lock() {
            events.push_back(event);
            while events.len() > self.max_events {
                events.pop_front();
            }
        }
    }

    pub fn log_tracks_imported(&self, added: usize, duplicates: usize, skipped: usize, took: Duration) {
        self.log_event(
            SessionEventType::TracksImported,
            format!(
                "Imported {} tracks ({} duplicate titles, {} skipped)",
                added, duplicates, skipped
            ),
            Some(took),
        );
    }

    pub fn log_search(&self, query: &str, found: Option<&str>) {
        match found {
            Some(title) => self.log_event(
                SessionEventType::SearchHit,
                format!("'{}' matched '{}'", query, title),
                None,
            ),
            None => self.log_event(
                SessionEventType::SearchMiss,
                format!("No match for '{}'", query),
                None,
            ),
        }
    }

    pub fn log_navigation(&self, action: &str, position: usize, title: &str) {
        self.log_event(
            SessionEventType::Navigation,
            format!("{} -> #{} '{}'", action, position + 1, title),
            None,
        );
    }

    pub fn log_playback(&self, action: &str) {
        self.log_event(SessionEventType::Playback, action.to_string(), None);
    }

    pub fn log_export(&self, path: &str, rows: usize) {
        self.log_event(
            SessionEventType::Export,
            format!("Wrote {} rows to {}", rows, path),
            None,
        );
    }

    pub fn log_session_cleared(&self, dropped: usize) {
        self.log_event(
            SessionEventType::SessionCleared,
            format!("Cleared {} tracks", dropped),
            None,
        );
    }

    pub fn log_error(&self, context: &str, message: &str) {
        self.log_event(SessionEventType::Error, format!("{}: {}", context, message), None);
    }

    /// Most recent `count` events, oldest first
    pub fn get_recent_events(&self, count: usize) -> Vec<SessionEvent> {
        match self.events.lock() {
            Ok(events) => {
                let skip = events.len().saturating_sub(count);
                events.iter().skip(skip).cloned().collect()
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn clear_events(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    pub fn get_event_statistics(&self) -> EventStatistics {
        let mut stats = EventStatistics::default();
        if let Ok(events) = self.events.lock() {
            for event in events.iter() {
                match event.event_type {
                    SessionEventType::TracksImported => stats.imports += 1,
                    SessionEventType::SearchHit => stats.search_hits += 1,
                    SessionEventType::SearchMiss => stats.search_misses += 1,
                    SessionEventType::Export => stats.exports += 1,
                    SessionEventType::Error => stats.errors += 1,
                    _ => {}
                }
            }
            stats.total_events = events.len();
        }
        stats
    }
}

impl Default for SessionLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts over the retained event history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStatistics {
    pub total_events: usize,
    pub imports: usize,
    pub search_hits: usize,
    pub search_misses: usize,
    pub exports: usize,
    pub errors: usize,
}

/// Measures how long an operation took
pub struct OperationTimer {
    start_time: Instant,
    operation_name: &'static str,
}

impl OperationTimer {
    pub fn new(operation_name: &'static str) -> Self {
        trace!("Starting operation: {}", operation_name);
        Self {
            start_time: Instant::now(),
            operation_name,
        }
    }

    pub fn finish_with_threshold(self, threshold: Duration) -> Duration {
        let duration = self.start_time.elapsed();
        if duration > threshold {
            warn!(
                "Operation '{}' took {}ms (threshold: {}ms)",
                self.operation_name,
                duration.as_millis(),
                threshold.as_millis()
            );
        } else {
            trace!("Completed operation '{}' in {}ms", self.operation_name, duration.as_millis());
        }
        duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_starts_empty() {
        let logger = SessionLogger::new();
        assert_eq!(logger.max_events, 1000);
        assert!(logger.get_recent_events(10).is_empty());
    }

    #[test]
    fn test_event_history_limit() {
        let mut logger = SessionLogger::new();
        logger.max_events = 3;

        for i in 0..5 {
            logger.log_playback(&format!("Event {}", i));
        }

        let events = logger.get_recent_events(10);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].details, "Event 2");
        assert_eq!(events[2].details, "Event 4");
    }

    #[test]
    fn test_recent_events_are_oldest_first() {
        let logger = SessionLogger::new();
        logger.log_playback("one");
        logger.log_playback("two");
        logger.log_playback("three");

        let events = logger.get_recent_events(2);
        assert_eq!(events[0].details, "two");
        assert_eq!(events[1].details, "three");
    }

    #[test]
    fn test_event_statistics() {
        let logger = SessionLogger::new();
        logger.log_tracks_imported(3, 1, 0, Duration::from_millis(5));
        logger.log_search("apple", Some("Apple"));
        logger.log_search("kiwi", None);
        logger.log_search("plum", None);
        logger.log_export("trackList.csv", 3);
        logger.log_error("Playback", "No default output device");
        logger.log_navigation("next", 1, "Banana");

        let stats = logger.get_event_statistics();
        assert_eq!(stats.total_events, 7);
        assert_eq!(stats.imports, 1);
        assert_eq!(stats.search_hits, 1);
        assert_eq!(stats.search_misses, 2);
        assert_eq!(stats.exports, 1);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_event_details() {
        let logger = SessionLogger::new();
        logger.log_navigation("first", 0, "Apple");
        logger.log_session_cleared(4);

        let events = logger.get_recent_events(2);
        assert_eq!(events[0].event_type, SessionEventType::Navigation);
        assert_eq!(events[0].details, "first -> #1 'Apple'");
        assert_eq!(events[1].event_type.as_str(), "SESSION_CLEARED");
        assert_eq!(events[1].details, "Cleared 4 tracks");
    }

    #[test]
    fn test_clear_events() {
        let logger = SessionLogger::new();
        logger.log_playback("play");
        logger.clear_events();
        assert!(logger.get_recent_events(10).is_empty());
    }

    #[test]
    fn test_clones_share_history() {
        let logger = SessionLogger::new();
        let other = logger.clone();
        other.log_playback("pause");
        assert_eq!(logger.get_recent_events(1)[0].details, "pause");
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG", log::LevelFilter::Warn), log::LevelFilter::Debug);
        assert_eq!(parse_level(" info ", log::LevelFilter::Warn), log::LevelFilter::Info);
        assert_eq!(parse_level("loud", log::LevelFilter::Warn), log::LevelFilter::Warn);
    }

    #[test]
    fn test_operation_timer() {
        let timer = OperationTimer::new("import");
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.finish_with_threshold(Duration::from_secs(10)) >= Duration::from_millis(5));
    }
}
