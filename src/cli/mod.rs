use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod status;
pub use status::{StatusDisplay, RECENT_EVENT_COUNT};

/// Title-indexed music player
#[derive(Parser)]
#[command(name = "titletree")]
#[command(about = "Import audio files, browse them sorted by title, search, play and export")]
#[command(version = "0.1.0")]
pub struct CliApp {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Commands {
    /// Import audio files or directories (the configured music folder when empty)
    Add {
        /// Files or directories to import
        paths: Vec<PathBuf>,
    },
    /// List the imported tracks sorted by title
    List,
    /// Find a track by title and select it
    Search {
        /// Title to look for (case-insensitive)
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// Play or resume the selected track
    Play,
    /// Pause playback
    Pause,
    /// Stop playback and rewind
    Stop,
    /// Seek within the current track
    Seek {
        /// Position as a percentage of the track (0-100)
        #[arg(value_parser = parse_percent_arg)]
        percent: f64,
    },
    /// Select the first track
    First,
    /// Select the previous track
    #[command(alias = "previous")]
    Prev,
    /// Select the next track
    Next,
    /// Select the last track
    Last,
    /// Export the track list as CSV
    Export {
        /// Output file (defaults to the configured export path)
        path: Option<PathBuf>,
    },
    /// Show the player status
    Status,
    /// Forget all imported tracks
    Clear,
}

impl Commands {
    /// Joined search text for `Search`
    pub fn search_text(title: &[String]) -> String {
        title.join(" ")
    }
}

impl CliApp {
    /// Parse command line arguments
    pub fn parse() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Expand a leading tilde to the home directory
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            match dirs::home_dir() {
                Some(home_dir) => home_dir.join(rest),
                None => PathBuf::from(path),
            }
        } else if path == "~" {
            dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
        } else {
            PathBuf::from(path)
        }
    }

    /// `exit` or `quit`, in any case
    pub fn is_exit_command(input: &str) -> bool {
        let word = input.trim();
        word.eq_ignore_ascii_case("exit") || word.eq_ignore_ascii_case("quit")
    }

    /// Parse one line typed at the interactive prompt.
    ///
    /// Everything after `add`, `search` and `export` is taken verbatim, so
    /// titles and paths may contain spaces.
    pub fn parse_command(input: &str) -> Result<Commands, ParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyCommand);
        }

        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (trimmed, ""),
        };

        match word.to_lowercase().as_str() {
            "add" => {
                if rest.is_empty() {
                    Ok(Commands::Add { paths: Vec::new() })
                } else {
                    Ok(Commands::Add {
                        paths: vec![Self::expand_path(rest)],
                    })
                }
            }
            "list" | "ls" => Ok(Commands::List),
            "search" | "find" => {
                if rest.is_empty() {
                    Err(ParseError::MissingArgument {
                        command: "search".to_string(),
                        argument: "title".to_string(),
                    })
                } else {
                    Ok(Commands::Search {
                        title: vec![rest.to_string()],
                    })
                }
            }
            "play" => Ok(Commands::Play),
            "pause" => Ok(Commands::Pause),
            "stop" => Ok(Commands::Stop),
            "seek" => {
                if rest.is_empty() {
                    Err(ParseError::MissingArgument {
                        command: "seek".to_string(),
                        argument: "percent".to_string(),
                    })
                } else {
                    Ok(Commands::Seek {
                        percent: parse_percent(rest)?,
                    })
                }
            }
            "first" => Ok(Commands::First),
            "prev" | "previous" => Ok(Commands::Prev),
            "next" => Ok(Commands::Next),
            "last" => Ok(Commands::Last),
            "export" => {
                if rest.is_empty() {
                    Ok(Commands::Export { path: None })
                } else {
                    Ok(Commands::Export {
                        path: Some(Self::expand_path(rest)),
                    })
                }
            }
            "status" => Ok(Commands::Status),
            "clear" => Ok(Commands::Clear),
            "help" | "?" => Err(ParseError::HelpRequested),
            _ => Err(ParseError::UnknownCommand {
                command: word.to_string(),
            }),
        }
    }

    /// Display help information
    pub fn display_help() {
        println!("titletree - Available Commands:");
        println!();
        println!("Library:");
        println!("  add [path]        - Import a file or directory (default: music folder)");
        println!("  list              - List tracks sorted by title");
        println!("  search <title>    - Find a track by title and select it");
        println!("  clear             - Forget all imported tracks");
        println!("  export [path]     - Write the track list as CSV");
        println!();
        println!("Navigation:");
        println!("  first / last      - Select the first or last track");
        println!("  prev / next       - Select the neighbouring track");
        println!();
        println!("Playback:");
        println!("  play              - Play or resume the selected track");
        println!("  pause             - Pause playback");
        println!("  stop              - Stop and rewind");
        println!("  seek <0-100>      - Seek to a percentage of the track");
        println!("  status            - Show player status");
        println!();
        println!("General:");
        println!("  help              - Show this help message");
        println!("  exit, quit        - Exit the player");
    }
}

/// Parse a seek percentage: a number from 0 to 100, optionally followed by `%`
pub fn parse_percent(input: &str) -> Result<f64, ParseError> {
    let trimmed = input.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();

    match number.parse::<f64>() {
        Ok(value) if (0.0..=100.0).contains(&value) => Ok(value),
        Ok(_) => Err(ParseError::InvalidArgument {
            argument: "percent".to_string(),
            value: input.to_string(),
            expected: "0-100".to_string(),
        }),
        Err(_) => Err(ParseError::InvalidArgument {
            argument: "percent".to_string(),
            value: input.to_string(),
            expected: "number 0-100".to_string(),
        }),
    }
}

fn parse_percent_arg(input: &str) -> Result<f64, String> {
    parse_percent(input).map_err(|e| e.to_string())
}

/// Command parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Unknown command: {command}")]
    UnknownCommand { command: String },

    #[error("Missing argument for {command}: {argument}")]
    MissingArgument { command: String, argument: String },

    #[error("Invalid argument {argument}: got '{value}', expected {expected}")]
    InvalidArgument {
        argument: String,
        value: String,
        expected: String,
    },

    #[error("Help requested")]
    HelpRequested,
}
