use crate::domain::ChannelId;

/// Core error type.
///
/// The adapter crate maps SDK-specific errors into this type so the bot
/// core can handle failures consistently (fatal at startup vs logged).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("cannot resolve forward target {channel}: {reason}")]
    ForwardResolution { channel: ChannelId, reason: String },

    #[error("command error: {0}")]
    Command(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
