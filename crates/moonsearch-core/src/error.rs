use thiserror::Error;

use crate::assets::SoundKey;

/// Failures reported by an [`AudioBackend`](crate::audio::AudioBackend).
///
/// These never escape [`AudioEngine`](crate::audio::AudioEngine); the engine
/// logs them and carries on without the sound.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio context unavailable: {0}")]
    Unavailable(String),
    #[error("playback rejected: {0}")]
    Rejected(String),
    #[error("audio node error: {0}")]
    Node(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("decode failed for {key:?}: {reason}")]
    Decode { key: SoundKey, reason: String },
    #[error("{url} is not an audio resource")]
    NotAudio { url: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive (got {value})")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} range is empty: {min}..{max}")]
    EmptyRange {
        name: &'static str,
        min: f64,
        max: f64,
    },
    #[error("leniency must be at least 1.0 (got {0})")]
    Leniency(f32),
}
