use thiserror::Error;

/// Main player error type
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Track error: {0}")]
    Track(#[from] TrackError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("CLI parse error: {0}")]
    Parse(#[from] crate::cli::ParseError),
}

impl PlayerError {
    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PlayerError::Track(err) => err.user_message(),
            PlayerError::Session(err) => err.user_message(),
            PlayerError::Export(err) => err.user_message(),
            PlayerError::Playback(err) => err.user_message(),
            PlayerError::Config(err) => err.user_message(),
            PlayerError::File(err) => Self::format_file_error(err),
            PlayerError::Parse(err) => format!("Command error: {}", err),
        }
    }

    /// Get suggested recovery actions for the error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PlayerError::Track(err) => err.recovery_suggestions(),
            PlayerError::Session(err) => err.recovery_suggestions(),
            PlayerError::Export(err) => err.recovery_suggestions(),
            PlayerError::Playback(err) => err.recovery_suggestions(),
            PlayerError::Config(err) => err.recovery_suggestions(),
            PlayerError::File(_) => vec!["Check that the path is correct and readable".to_string()],
            PlayerError::Parse(_) => vec!["Type 'help' to see available commands".to_string()],
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PlayerError::Track(_) => ErrorSeverity::Warning,
            PlayerError::Session(SessionError::TrackNotFound { .. })
            | PlayerError::Session(SessionError::NoNextTrack)
            | PlayerError::Session(SessionError::NoPreviousTrack)
            | PlayerError::Session(SessionError::EmptySession)
            | PlayerError::Session(SessionError::EmptyQuery) => ErrorSeverity::Info,
            PlayerError::Session(_) => ErrorSeverity::Warning,
            PlayerError::Export(ExportError::NothingToExport) => ErrorSeverity::Warning,
            PlayerError::Export(_) => ErrorSeverity::Error,
            PlayerError::Playback(PlaybackError::NoTrackLoaded) => ErrorSeverity::Info,
            PlayerError::Playback(PlaybackError::DeviceUnavailable(_)) => ErrorSeverity::Critical,
            PlayerError::Playback(_) => ErrorSeverity::Error,
            PlayerError::Config(_) => ErrorSeverity::Warning,
            PlayerError::File(_) => ErrorSeverity::Error,
            PlayerError::Parse(_) => ErrorSeverity::Info,
        }
    }

    fn format_file_error(err: &std::io::Error) -> String {
        match err.kind() {
            std::io::ErrorKind::NotFound => "File or directory not found".to_string(),
            std::io::ErrorKind::PermissionDenied => "Permission denied - cannot access file".to_string(),
            _ => format!("File system error: {}", err),
        }
    }
}

/// Error severity levels for logging and user feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }

    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
            ErrorSeverity::Critical => log::Level::Error,
        }
    }
}

/// Malformed track values, rejected before they reach the index
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("Track title is empty")]
    EmptyTitle,

    #[error("Cannot derive a title from: {path}")]
    UnreadableName { path: String },
}

impl TrackError {
    pub fn user_message(&self) -> String {
        match self {
            TrackError::EmptyTitle => "A track needs a non-empty title".to_string(),
            TrackError::UnreadableName { path } => {
                format!("The file name of '{}' cannot be used as a title", path)
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        vec!["Rename the file so that it has a readable name before its extension".to_string()]
    }
}

/// Track-list session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported file format: {path}")]
    UnsupportedFormat { path: String },

    #[error("Cannot read directory {path}: {source}")]
    DirectoryUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid track: {0}")]
    InvalidTrack(#[from] TrackError),

    #[error("No songs added")]
    EmptySession,

    #[error("Search text is empty")]
    EmptyQuery,

    #[error("Song not found: {title}")]
    TrackNotFound { title: String },

    #[error("There is no next song")]
    NoNextTrack,

    #[error("There is no previous song")]
    NoPreviousTrack,

    #[error("Invalid index: {index}")]
    InvalidIndex { index: usize },
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            SessionError::FileNotFound { path } => format!("Cannot find audio file: {}", path),
            SessionError::UnsupportedFormat { path } => {
                format!("File '{}' is not a supported audio format", path)
            }
            SessionError::DirectoryUnreadable { path, .. } => {
                format!("Cannot read the contents of '{}'", path)
            }
            SessionError::InvalidTrack(err) => err.user_message(),
            SessionError::EmptySession => "No songs added - add some files first".to_string(),
            SessionError::EmptyQuery => "Search field is required".to_string(),
            SessionError::TrackNotFound { title } => format!("Song not found: '{}'", title),
            SessionError::NoNextTrack => "There is no next song to play".to_string(),
            SessionError::NoPreviousTrack => "There is no previous song to play".to_string(),
            SessionError::InvalidIndex { index } => {
                format!("Track number {} is not in the track list", index + 1)
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            SessionError::FileNotFound { .. } => vec![
                "Check that the file path is correct".to_string(),
                "Try using absolute paths instead of relative paths".to_string(),
            ],
            SessionError::UnsupportedFormat { .. } => vec![
                "Supported formats are listed under 'supported_extensions' in config.toml".to_string(),
            ],
            SessionError::DirectoryUnreadable { .. } => vec![
                "Check the directory permissions".to_string(),
            ],
            SessionError::InvalidTrack(err) => err.recovery_suggestions(),
            SessionError::EmptySession => vec![
                "Use 'add <file>' to add individual files".to_string(),
                "Use 'add <directory>' to add every audio file in a folder".to_string(),
            ],
            SessionError::EmptyQuery => vec!["Use 'search <title>'".to_string()],
            SessionError::TrackNotFound { .. } => vec![
                "Use 'list' to see the sorted track list".to_string(),
                "Titles are matched without regard to case".to_string(),
            ],
            SessionError::NoNextTrack | SessionError::NoPreviousTrack => vec![
                "Use 'first' or 'last' to jump to either end of the list".to_string(),
            ],
            SessionError::InvalidIndex { .. } => vec![
                "Use 'list' to see available tracks".to_string(),
                "Track numbers start from 1".to_string(),
            ],
        }
    }
}

/// Track-list export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("There are no songs to save")]
    NothingToExport,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ExportError {
    pub fn user_message(&self) -> String {
        match self {
            ExportError::NothingToExport => "There are no songs to save".to_string(),
            ExportError::Io(err) => format!("Error saving the file: {}", err),
            ExportError::Csv(err) => format!("Error writing the track list: {}", err),
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ExportError::NothingToExport => vec!["Add some songs before exporting".to_string()],
            ExportError::Io(_) | ExportError::Csv(_) => vec![
                "Check that the target directory exists and is writable".to_string(),
                "Close any program that holds the file open".to_string(),
            ],
        }
    }
}

/// Playback collaborator errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Audio device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Unsupported media: {location}")]
    UnsupportedMedia { location: String },

    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("No track loaded")]
    NoTrackLoaded,

    #[error("Invalid seek position: {fraction}")]
    InvalidSeek { fraction: f64 },
}

impl PlaybackError {
    pub fn user_message(&self) -> String {
        match self {
            PlaybackError::DeviceUnavailable(msg) => format!("No audio output available: {}", msg),
            PlaybackError::UnsupportedMedia { location } => {
                format!("'{}' cannot be played", location)
            }
            PlaybackError::DecodeFailed(msg) => format!("Failed to decode audio data: {}", msg),
            PlaybackError::StreamError(msg) => format!("Audio playback interrupted: {}", msg),
            PlaybackError::NoTrackLoaded => "Nothing is loaded - add and select a song first".to_string(),
            PlaybackError::InvalidSeek { fraction } => {
                format!("Cannot seek to {:.0}% of the track", fraction * 100.0)
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PlaybackError::DeviceUnavailable(_) => vec![
                "Check that an audio output device is connected".to_string(),
                "Restart the application".to_string(),
            ],
            PlaybackError::UnsupportedMedia { .. } | PlaybackError::DecodeFailed(_) => vec![
                "Check that the file is a complete, valid audio file".to_string(),
                "Convert the file to MP3 or FLAC".to_string(),
            ],
            PlaybackError::StreamError(_) => vec![
                "Restart the stream with 'stop' then 'play'".to_string(),
            ],
            PlaybackError::NoTrackLoaded => vec![
                "Use 'add <path>' and then 'first' or 'search <title>'".to_string(),
            ],
            PlaybackError::InvalidSeek { .. } => vec![
                "Use a percentage between 0 and 100".to_string(),
            ],
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    ConfigDirNotFound,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    DeserializationError(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::ConfigDirNotFound => {
                "Cannot find or create configuration directory".to_string()
            }
            ConfigError::IoError(err) => {
                format!("Cannot access configuration file: {}", err)
            }
            ConfigError::SerializationError(_) => {
                "Failed to save configuration settings".to_string()
            }
            ConfigError::DeserializationError(_) => {
                "Configuration file is corrupted or has invalid format".to_string()
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ConfigError::ConfigDirNotFound => vec![
                "Check that you have write permissions to your home directory".to_string(),
            ],
            ConfigError::IoError(_) => vec![
                "Check file permissions for the configuration directory".to_string(),
                "Ensure the disk is not full".to_string(),
            ],
            ConfigError::SerializationError(_) => vec![
                "Try resetting configuration to defaults".to_string(),
            ],
            ConfigError::DeserializationError(_) => vec![
                "Delete the configuration file to reset to defaults".to_string(),
                "Check the configuration file format manually".to_string(),
            ],
        }
    }
}
