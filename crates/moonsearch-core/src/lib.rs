//! Orientation-driven target acquisition and audio sequencing for the
//! moonsearch experience. Platform-free: the web and native front-ends
//! supply orientation samples, a clock and an [`AudioBackend`].

pub mod angular;
pub mod assets;
pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod guidance;
pub mod lock_on;
pub mod orientation;
pub mod sequencer;
pub mod targets;
pub mod timeline;

pub use angular::*;
pub use assets::*;
pub use audio::{load_all, AssetLoader, AudioBackend, AudioEngine, LoadSummary, Playback, VoiceId};
pub use config::*;
pub use constants::*;
pub use error::*;
pub use guidance::*;
pub use lock_on::*;
pub use orientation::*;
pub use sequencer::*;
pub use targets::*;
pub use timeline::*;
