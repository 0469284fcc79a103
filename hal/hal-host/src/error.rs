//! Errors raised while describing or bringing up a host board

use std::io;
use std::path::PathBuf;

use hal::HalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid board description: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("board declares {count} channels, at most {max} are supported")]
    TooManyChannels { count: usize, max: usize },
    #[error("channel {channel}: reference voltage {volts} V must be finite and positive")]
    InvalidReference { channel: String, volts: f32 },
    #[error("channel {channel}: {reason}")]
    InvalidWaveform {
        channel: String,
        reason: &'static str,
    },
    #[error("registry error: {0}")]
    Hal(#[from] HalError),
}
