/// Error type shared by the library.
///
/// The tick engine itself never fails; these errors come from the
/// collaborators around it (configuration, persistence, the background
/// executor) and are reported to whoever started the background work.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("no alien wave numbered {0}")]
    UnknownWave(u32),

    #[error("the wave table is empty")]
    EmptyWaveTable,

    #[error("invalid wave {wave}: {reason}")]
    InvalidWave { wave: u32, reason: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("background worker is no longer running")]
    WorkerGone,
}

pub type Result<T> = std::result::Result<T, GameError>;
