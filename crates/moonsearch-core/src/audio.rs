//! Buffered sound playback with per-track gain, fades and chaining.

use std::cell::RefCell;

use fnv::FnvHashMap;
use smallvec::SmallVec;

use crate::assets::{is_audio_url, SoundKey};
use crate::error::AudioError;

/// Identifies one started playback instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u32);

/// Platform audio output. Times are in the backend's own clock.
pub trait AudioBackend {
    type Buffer: Clone;

    fn current_time(&self) -> f64;

    /// False while the platform still blocks output (autoplay policy).
    fn is_running(&self) -> bool;

    fn resume(&mut self) -> Result<(), AudioError>;

    /// Start `buffer` immediately on a fresh gain stage set to `volume`.
    fn start(
        &mut self,
        voice: VoiceId,
        buffer: &Self::Buffer,
        looping: bool,
        volume: f32,
    ) -> Result<(), AudioError>;

    /// Stop at `when`; a later call replaces an earlier scheduled stop.
    fn stop(&mut self, voice: VoiceId, when: f64);

    /// Drop every gain change scheduled at or after `from`.
    fn cancel_ramps(&mut self, voice: VoiceId, from: f64);

    /// Pin the gain at its current value at `from`, then ramp linearly to
    /// `target` by `until`.
    fn ramp_gain(&mut self, voice: VoiceId, target: f32, from: f64, until: f64);

    /// The engine no longer tracks `voice`; free any nodes held for it.
    fn release(&mut self, _voice: VoiceId) {}
}

/// Fetches and decodes one manifest entry.
#[allow(async_fn_in_trait)]
pub trait AssetLoader {
    type Buffer;

    async fn load(&self, key: SoundKey, url: &str) -> anyhow::Result<Self::Buffer>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playback {
    pub looping: bool,
    pub volume: f32,
}

impl Default for Playback {
    fn default() -> Self {
        Self::once()
    }
}

impl Playback {
    pub fn once() -> Self {
        Self {
            looping: false,
            volume: 1.0,
        }
    }

    pub fn looped() -> Self {
        Self {
            looping: true,
            volume: 1.0,
        }
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume.max(0.0);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
    pub failed: SmallVec<[SoundKey; 4]>,
}

/// Runs once when a non-looping track reaches its natural end.
pub type EndedHook<B> = Box<dyn FnOnce(&mut AudioEngine<B>)>;

struct Track<B: AudioBackend> {
    voice: VoiceId,
    volume: f32,
    looping: bool,
    fade_until: Option<f64>,
    on_ended: Option<EndedHook<B>>,
}

pub struct AudioEngine<B: AudioBackend> {
    backend: B,
    buffers: FnvHashMap<SoundKey, B::Buffer>,
    tracks: FnvHashMap<SoundKey, Track<B>>,
    load_state: LoadState,
    unlocked: bool,
    next_voice: u32,
}

impl<B: AudioBackend> AudioEngine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            buffers: FnvHashMap::default(),
            tracks: FnvHashMap::default(),
            load_state: LoadState::NotLoaded,
            unlocked: false,
            next_voice: 1,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn has_buffer(&self, key: SoundKey) -> bool {
        self.buffers.contains_key(&key)
    }

    /// Claim the one-time load. Returns false if a load already ran or is
    /// in flight.
    pub fn begin_load(&mut self) -> bool {
        if self.load_state != LoadState::NotLoaded {
            return false;
        }
        self.load_state = LoadState::Loading;
        true
    }

    pub fn insert_buffer(&mut self, key: SoundKey, buffer: B::Buffer) {
        self.buffers.insert(key, buffer);
    }

    pub fn finish_load(&mut self) {
        self.load_state = LoadState::Loaded;
        log::info!("[audio] assets loaded ({} buffers)", self.buffers.len());
    }

    /// Must be reached from a user-gesture handler; repeat calls are fine.
    pub fn unlock(&mut self) {
        if let Err(e) = self.backend.resume() {
            log::warn!("[audio] resume failed: {}", e);
            return;
        }
        if !self.unlocked {
            log::info!("[audio] unlocked");
        }
        self.unlocked = true;
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn play(&mut self, key: SoundKey, playback: Playback) {
        self.start_track(key, playback, None);
    }

    /// Like [`play`](Self::play), running `on_ended` when the track finishes
    /// by itself. Stops and fades do not count as finishing.
    pub fn play_then<F>(&mut self, key: SoundKey, playback: Playback, on_ended: F)
    where
        F: FnOnce(&mut AudioEngine<B>) + 'static,
    {
        self.start_track(key, playback, Some(Box::new(on_ended)));
    }

    pub fn stop(&mut self, key: SoundKey) {
        let Some(track) = self.tracks.remove(&key) else {
            return;
        };
        let now = self.backend.current_time();
        self.backend.cancel_ramps(track.voice, now);
        self.backend.stop(track.voice, now);
        self.backend.release(track.voice);
    }

    pub fn stop_all(&mut self) {
        let keys: SmallVec<[SoundKey; 8]> = self.tracks.keys().copied().collect();
        for key in keys {
            self.stop(key);
        }
    }

    /// Ramp `key` linearly from its current gain to silence, then stop it.
    /// Replaces any fade already running on the track.
    pub fn fade_out(&mut self, key: SoundKey, duration_sec: f64) {
        if duration_sec <= 0.0 {
            self.stop(key);
            return;
        }
        let now = self.backend.current_time();
        let Some(track) = self.tracks.get_mut(&key) else {
            log::debug!("[audio] fade_out({:?}) with nothing playing", key);
            return;
        };
        let until = now + duration_sec;
        self.backend.cancel_ramps(track.voice, now);
        self.backend.ramp_gain(track.voice, 0.0, now, until);
        self.backend.stop(track.voice, until);
        track.fade_until = Some(until);
        track.on_ended = None;
    }

    pub fn is_playing(&self, key: SoundKey) -> bool {
        self.tracks.contains_key(&key)
    }

    pub fn is_fading(&self, key: SoundKey) -> bool {
        self.tracks
            .get(&key)
            .map_or(false, |t| t.fade_until.is_some())
    }

    pub fn voice(&self, key: SoundKey) -> Option<VoiceId> {
        self.tracks.get(&key).map(|t| t.voice)
    }

    /// Volume the track was started at.
    pub fn track_volume(&self, key: SoundKey) -> Option<f32> {
        self.tracks.get(&key).map(|t| t.volume)
    }

    pub fn is_looping(&self, key: SoundKey) -> bool {
        self.tracks.get(&key).map_or(false, |t| t.looping)
    }

    /// Platform notification that `voice` stopped producing sound.
    pub fn handle_ended(&mut self, voice: VoiceId) {
        let key = self
            .tracks
            .iter()
            .find(|(_, t)| t.voice == voice)
            .map(|(k, _)| *k);
        self.backend.release(voice);
        let Some(key) = key else {
            return;
        };
        let Some(track) = self.tracks.remove(&key) else {
            return;
        };
        if track.looping || track.fade_until.is_some() {
            return;
        }
        if let Some(hook) = track.on_ended {
            log::debug!("[audio] {:?} ended, running chained hook", key);
            hook(self);
        }
    }

    /// Forget tracks whose fade has run out, in case the platform's ended
    /// notification is late or missing.
    pub fn reap(&mut self) {
        let now = self.backend.current_time();
        let done: SmallVec<[SoundKey; 4]> = self
            .tracks
            .iter()
            .filter(|(_, t)| t.fade_until.map_or(false, |until| until <= now))
            .map(|(k, _)| *k)
            .collect();
        for key in done {
            if let Some(track) = self.tracks.remove(&key) {
                self.backend.release(track.voice);
            }
        }
    }

    fn start_track(&mut self, key: SoundKey, playback: Playback, on_ended: Option<EndedHook<B>>) {
        let Some(buffer) = self.buffers.get(&key).cloned() else {
            log::warn!("[audio] no buffer for {:?}; skipping", key);
            return;
        };
        if !self.backend.is_running() {
            log::warn!(
                "[audio] {:?} requested while output is suspended; unlock() from a user gesture",
                key
            );
        }
        self.stop(key);

        let voice = VoiceId(self.next_voice);
        self.next_voice = self.next_voice.wrapping_add(1);
        match self
            .backend
            .start(voice, &buffer, playback.looping, playback.volume)
        {
            Ok(()) => {
                self.tracks.insert(
                    key,
                    Track {
                        voice,
                        volume: playback.volume,
                        looping: playback.looping,
                        fade_until: None,
                        on_ended,
                    },
                );
            }
            Err(e) => log::warn!("[audio] {:?} failed to start: {}", key, e),
        }
    }
}

/// Fetch and decode every audio entry of the manifest into `engine`, one at a
/// time in [`SoundKey::ALL`] order, so the prologue is playable first.
///
/// Only the first call does any work. A failing entry is logged and
/// skipped. The engine is borrowed only between awaits, so other handlers
/// can use it while the load is in flight.
pub async fn load_all<B, L>(engine: &RefCell<AudioEngine<B>>, loader: &L) -> LoadSummary
where
    B: AudioBackend,
    L: AssetLoader<Buffer = B::Buffer>,
{
    let mut summary = LoadSummary::default();
    if !engine.borrow_mut().begin_load() {
        return summary;
    }
    for key in SoundKey::ALL {
        let url = key.url();
        if !is_audio_url(url) {
            summary.skipped += 1;
            continue;
        }
        match loader.load(key, url).await {
            Ok(buffer) => {
                engine.borrow_mut().insert_buffer(key, buffer);
                summary.loaded += 1;
            }
            Err(e) => {
                log::error!("[audio] load failed: {:?} ({}): {:#}", key, url, e);
                summary.failed.push(key);
            }
        }
    }
    engine.borrow_mut().finish_load();
    summary
}
