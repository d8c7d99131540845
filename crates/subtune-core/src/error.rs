//! Error types for sequencing and sink operations.

use std::io;

/// Result type for sequencing operations.
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Errors surfaced by the sequencing core and the built-in sinks.
#[derive(thiserror::Error, Debug)]
pub enum PlayerError {
    /// The engine reported a collection without any subsongs.
    #[error("song collection contains no subsongs")]
    NoSubsongs,

    /// No sink is registered under the requested name.
    #[error("\"{0}\" is not a known output sink")]
    UnknownSink(String),

    /// The engine rejected the requested filter type.
    #[error("invalid filter type \"{0}\"")]
    UnknownFilter(String),

    /// The sink refused to open with the requested parameters.
    #[error("output sink rejected configuration: {0}")]
    SinkRejected(String),

    /// A sink failed while writing or finalizing output.
    #[error("output sink failed: {0}")]
    Sink(String),

    /// IO error from a sink or the underlying device.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Engine-side failure during reinitialization or stepping.
    #[error("sound engine error: {0}")]
    Engine(String),
}

impl From<String> for PlayerError {
    fn from(msg: String) -> Self {
        PlayerError::Engine(msg)
    }
}
