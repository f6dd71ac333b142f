pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod index;
pub mod logging;
pub mod models;
pub mod playback;
pub mod session;

pub use error::*;
pub use index::TitleIndex;
pub use models::*;
pub use session::Session;
