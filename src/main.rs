mod cli;
mod config;
mod error;
mod export;
mod index;
mod logging;
mod models;
mod playback;
mod session;


use cli::{CliApp, Commands, ParseError, StatusDisplay, RECENT_EVENT_COUNT};
use config::ConfigManager;
use error::{PlayerError, SessionError};
use export::TrackListExporter;
use log::{info, warn};
use logging::{OperationTimer, SessionLogger};
use models::{PlaybackState, PlayerStatus};
use playback::{CpalPlayer, MediaPlayer};
use session::{Session, TrackImporter};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Main application controller: owns the session, the player and the settings
pub struct AppController {
    session: Session,
    player: Box<dyn MediaPlayer>,
    config_manager: ConfigManager,
    logger: SessionLogger,
    // Location handed to the player by the last successful load
    loaded: Option<String>,
}

impl AppController {
    /// Create a controller backed by the default audio output
    pub fn new() -> Result<Self, PlayerError> {
        if let Err(e) = SessionLogger::init() {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        let config_manager = ConfigManager::new()?;
        info!("Configuration file: {}", config_manager.config_path().display());
        let config = config_manager.get_config();
        let session = Session::new(TrackImporter::from_config(config));
        let player = Box::new(CpalPlayer::new(config.default_volume));

        info!("Application controller initialized");
        Ok(Self::with_parts(session, player, config_manager, SessionLogger::new()))
    }

    /// Assemble a controller from existing parts
    pub fn with_parts(
        session: Session,
        player: Box<dyn MediaPlayer>,
        config_manager: ConfigManager,
        logger: SessionLogger,
    ) -> Self {
        Self {
            session,
            player,
            config_manager,
            logger,
            loaded: None,
        }
    }

    /// Apply saved settings to the player
    pub fn initialize(&mut self) {
        let volume = self.config_manager.get_config().default_volume;
        self.player.set_volume(volume);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn logger(&self) -> &SessionLogger {
        &self.logger
    }

    pub fn is_playing(&self) -> bool {
        self.player.state() == PlaybackState::Playing
    }

    /// Execute a single command
    pub async fn execute_command(&mut self, command: Commands) -> Result<(), PlayerError> {
        match command {
            Commands::Add { paths } => {
                let paths = if paths.is_empty() {
                    let directory = self
                        .config_manager
                        .get_config()
                        .initial_directory
                        .clone()
                        .ok_or_else(|| ParseError::MissingArgument {
                            command: "add".to_string(),
                            argument: "path".to_string(),
                        })?;
                    vec![directory]
                } else {
                    paths
                };

                let timer = OperationTimer::new("import");
                let summary = self.session.add_paths(&paths)?;
                let took = timer.finish_with_threshold(Duration::from_secs(5));
                self.logger
                    .log_tracks_imported(summary.added, summary.duplicates, summary.skipped, took);

                println!(
                    "Added {} songs ({} duplicate titles, {} skipped). {} in total.",
                    summary.added,
                    summary.duplicates,
                    summary.skipped,
                    self.session.len()
                );
                StatusDisplay::display_track_list(self.session.tracks(), self.session.current_index());

                // The first import starts the selected song
                if self.loaded.is_none() && !self.session.is_empty() {
                    if let Err(e) = self.load_current() {
                        self.handle_error(&e);
                    }
                }
            }
            Commands::List => {
                StatusDisplay::display_track_list(self.session.tracks(), self.session.current_index());
            }
            Commands::Search { title } => {
                let query = Commands::search_text(&title);
                let found = match self.session.search_and_select(&query) {
                    Ok(track) => track.title().to_string(),
                    Err(e) => {
                        if matches!(e, SessionError::TrackNotFound { .. }) {
                            self.logger.log_search(&query, None);
                        }
                        return Err(e.into());
                    }
                };
                self.logger.log_search(&query, Some(&found));
                self.stop_loaded();
                self.load_current()?;
            }
            Commands::Play => {
                let location = self
                    .session
                    .current_track()
                    .map(|t| t.location().to_string())
                    .ok_or(SessionError::EmptySession)?;

                if self.loaded.as_deref() == Some(location.as_str()) {
                    self.player.play()?;
                    self.logger.log_playback("play");
                } else {
                    self.load_current()?;
                }
            }
            Commands::Pause => {
                self.player.pause()?;
                self.logger.log_playback("pause");
            }
            Commands::Stop => {
                self.player.stop()?;
                self.logger.log_playback("stop");
            }
            Commands::Seek { percent } => {
                self.player.seek_fraction(percent / 100.0)?;
                self.logger.log_playback(&format!("seek {:.0}%", percent));
            }
            Commands::First => {
                self.session.first()?;
                self.after_navigation("first")?;
            }
            Commands::Prev => {
                self.session.previous()?;
                self.after_navigation("previous")?;
            }
            Commands::Next => {
                self.session.next()?;
                self.after_navigation("next")?;
            }
            Commands::Last => {
                self.session.last()?;
                self.after_navigation("last")?;
            }
            Commands::Export { path } => {
                let path: PathBuf = path.unwrap_or_else(|| self.config_manager.get_config().export_path.clone());
                TrackListExporter::new().export(&path, self.session.tracks())?;
                self.logger
                    .log_export(&path.display().to_string(), self.session.len());
                println!("The track list has been saved to {}", path.display());
            }
            Commands::Status => {
                StatusDisplay::display_full_status(&self.get_current_status());
                StatusDisplay::display_activity(
                    &self.logger.get_event_statistics(),
                    &self.logger.get_recent_events(RECENT_EVENT_COUNT),
                );
            }
            Commands::Clear => {
                self.stop_loaded();
                let dropped = self.session.len();
                self.session.clear();
                self.loaded = None;
                self.logger.clear_events();
                self.logger.log_session_cleared(dropped);
                println!("Cleared {} songs", dropped);
            }
        }

        Ok(())
    }

    fn after_navigation(&mut self, action: &str) -> Result<(), PlayerError> {
        if let (Some(position), Some(track)) = (self.session.current_index(), self.session.current_track()) {
            self.logger.log_navigation(action, position, track.title());
        }
        self.stop_loaded();
        self.load_current()
    }

    /// Hand the selected track to the player, which starts it
    fn load_current(&mut self) -> Result<(), PlayerError> {
        let track = self
            .session
            .current_track()
            .cloned()
            .ok_or(SessionError::EmptySession)?;

        self.loaded = None;
        self.player.load(track.location())?;
        self.loaded = Some(track.location().to_string());
        self.logger.log_playback(&format!("load '{}'", track.title()));
        println!("Now playing: {}", track.title());
        Ok(())
    }

    fn stop_loaded(&mut self) {
        if self.loaded.is_some() {
            if let Err(e) = self.player.stop() {
                warn!("Failed to stop playback: {}", e);
            }
        }
    }

    /// Snapshot of session and player state
    pub fn get_current_status(&self) -> PlayerStatus {
        PlayerStatus {
            state: self.player.state(),
            current_track: self.session.current_track().cloned(),
            position: self.session.current_index(),
            track_count: self.session.len(),
            progress: self.player.progress(),
            volume: self.player.volume(),
        }
    }

    /// Run interactive mode
    pub async fn run_interactive_mode(&mut self) -> Result<(), PlayerError> {
        println!("titletree v0.1.0");
        println!("Type 'help' for available commands, 'exit' or 'quit' to quit.");
        println!();

        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let shutdown_flag_clone = shutdown_flag.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            println!("\nReceived interrupt signal. Shutting down...");
            shutdown_flag_clone.store(true, Ordering::Relaxed);
        }) {
            warn!("Could not install Ctrl-C handler: {}", e);
        }

        // stdin is read on its own thread so the prompt can also poll playback
        let mut interval = tokio::time::interval(Duration::from_millis(100));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            let mut line = String::new();
            loop {
                line.clear();
                match stdin.read_line(&mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        if tx.send(line.trim().to_string()).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        let mut awaiting_input = false;
        let mut was_playing = false;

        loop {
            if shutdown_flag.load(Ordering::Relaxed) {
                break;
            }

            if !awaiting_input {
                print!("> ");
                let _ = std::io::Write::flush(&mut std::io::stdout());
                awaiting_input = true;
            }

            tokio::select! {
                biased;

                line = rx.recv() => {
                    awaiting_input = false;
                    match line {
                        Some(line) => {
                            if line.is_empty() {
                                continue;
                            }
                            if CliApp::is_exit_command(&line) {
                                println!("Goodbye!");
                                break;
                            }
                            match CliApp::parse_command(&line) {
                                Ok(command) => {
                                    if let Err(e) = self.execute_command(command).await {
                                        self.handle_error(&e);
                                    }
                                }
                                Err(ParseError::HelpRequested) => CliApp::display_help(),
                                Err(e) => self.handle_error(&PlayerError::from(e)),
                            }
                        }
                        None => {
                            // EOF
                            println!();
                            break;
                        }
                    }
                }

                _ = interval.tick() => {
                    let playing = self.is_playing();
                    if was_playing && !playing && self.player.progress() >= 1.0 {
                        if let Some(track) = self.session.current_track() {
                            println!("\nFinished: {}", track.title());
                            awaiting_input = false;
                        }
                    }
                    was_playing = playing;
                }
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Block until the player leaves the playing state
    pub async fn wait_while_playing(&self) {
        while self.is_playing() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Stop playback and remember the volume
    pub fn shutdown(&mut self) {
        self.stop_loaded();

        let volume = self.player.volume();
        if let Err(e) = self.config_manager.set_volume(volume) {
            warn!("Error saving configuration: {}", e);
        }
        info!("Shutdown complete");
    }

    /// Log an error at its severity and show it to the user
    fn handle_error(&self, error: &PlayerError) {
        let severity = error.severity();
        log::log!(severity.log_level(), "{}", error);
        self.logger.log_error(severity.as_str(), &error.to_string());
        StatusDisplay::display_error(error);
    }
}

#[tokio::main]
async fn main() {
    let mut app = match AppController::new() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to initialize application: {}", e);
            StatusDisplay::display_simple_error(&e);
            std::process::exit(1);
        }
    };
    app.initialize();

    let cli = CliApp::parse();

    match cli.command {
        Some(command) => {
            if let Err(e) = app.execute_command(command).await {
                app.handle_error(&e);
                std::process::exit(1);
            }
            // A one-shot command that started a song keeps the process alive until it ends
            app.wait_while_playing().await;
        }
        None => {
            if let Err(e) = app.run_interactive_mode().await {
                app.handle_error(&e);
                std::process::exit(1);
            }
        }
    }
}
