// Recording audio backend shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

use moonsearch_core::{
    AssetLoader, AudioBackend, AudioEngine, AudioError, SoundKey, VoiceId,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Resume,
    Start {
        voice: VoiceId,
        sound: SoundKey,
        looping: bool,
        volume: f32,
    },
    Stop {
        voice: VoiceId,
        when: f64,
    },
    CancelRamps {
        voice: VoiceId,
        from: f64,
    },
    Ramp {
        voice: VoiceId,
        target: f32,
        from: f64,
        until: f64,
    },
    Release(VoiceId),
}

#[derive(Clone, Debug)]
pub struct FakeVoice {
    pub sound: SoundKey,
    pub looping: bool,
    pub start_gain: f32,
    pub ramp: Option<(f32, f64, f64)>,
    pub stop_at: Option<f64>,
    pub released: bool,
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub now: f64,
    pub running: bool,
    pub reject_starts: bool,
    pub calls: Vec<Call>,
    pub voices: BTreeMap<VoiceId, FakeVoice>,
}

impl FakeBackend {
    pub fn running() -> Self {
        Self {
            running: true,
            ..Self::default()
        }
    }

    /// Gain of `voice` at time `t`, following any scheduled linear ramp.
    pub fn gain_at(&self, voice: VoiceId, t: f64) -> f32 {
        let v = &self.voices[&voice];
        match v.ramp {
            Some((target, from, until)) if t >= from => {
                if t >= until || until <= from {
                    target
                } else {
                    let k = ((t - from) / (until - from)) as f32;
                    v.start_gain + (target - v.start_gain) * k
                }
            }
            _ => v.start_gain,
        }
    }

    /// Voices still producing sound at the current time.
    pub fn sounding(&self) -> Vec<(VoiceId, SoundKey)> {
        self.voices
            .iter()
            .filter(|(_, v)| !v.released && v.stop_at.map_or(true, |at| at > self.now))
            .map(|(id, v)| (*id, v.sound))
            .collect()
    }

    pub fn sounding_count(&self, sound: SoundKey) -> usize {
        self.sounding().iter().filter(|(_, s)| *s == sound).count()
    }

    pub fn starts_of(&self, sound: SoundKey) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Start { sound: s, .. } if *s == sound))
            .count()
    }
}

impl AudioBackend for FakeBackend {
    type Buffer = SoundKey;

    fn current_time(&self) -> f64 {
        self.now
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.calls.push(Call::Resume);
        self.running = true;
        Ok(())
    }

    fn start(
        &mut self,
        voice: VoiceId,
        buffer: &SoundKey,
        looping: bool,
        volume: f32,
    ) -> Result<(), AudioError> {
        if self.reject_starts {
            return Err(AudioError::Rejected("autoplay".into()));
        }
        self.calls.push(Call::Start {
            voice,
            sound: *buffer,
            looping,
            volume,
        });
        self.voices.insert(
            voice,
            FakeVoice {
                sound: *buffer,
                looping,
                start_gain: volume,
                ramp: None,
                stop_at: None,
                released: false,
            },
        );
        Ok(())
    }

    fn stop(&mut self, voice: VoiceId, when: f64) {
        self.calls.push(Call::Stop { voice, when });
        if let Some(v) = self.voices.get_mut(&voice) {
            v.stop_at = Some(when);
        }
    }

    fn cancel_ramps(&mut self, voice: VoiceId, from: f64) {
        self.calls.push(Call::CancelRamps { voice, from });
        let current = self.voices.contains_key(&voice).then(|| self.gain_at(voice, from));
        if let (Some(v), Some(g)) = (self.voices.get_mut(&voice), current) {
            v.start_gain = g;
            v.ramp = None;
        }
    }

    fn ramp_gain(&mut self, voice: VoiceId, target: f32, from: f64, until: f64) {
        self.calls.push(Call::Ramp {
            voice,
            target,
            from,
            until,
        });
        if let Some(v) = self.voices.get_mut(&voice) {
            v.ramp = Some((target, from, until));
        }
    }

    fn release(&mut self, voice: VoiceId) {
        self.calls.push(Call::Release(voice));
        if let Some(v) = self.voices.get_mut(&voice) {
            v.released = true;
        }
    }
}

/// Engine with every manifest sound already decoded.
pub fn loaded_engine() -> Rc<RefCell<AudioEngine<FakeBackend>>> {
    let mut engine = AudioEngine::new(FakeBackend::running());
    engine.begin_load();
    for key in SoundKey::ALL {
        engine.insert_buffer(key, key);
    }
    engine.finish_load();
    Rc::new(RefCell::new(engine))
}

pub struct FakeLoader {
    pub failing: HashSet<SoundKey>,
    pub requests: RefCell<Vec<SoundKey>>,
}

impl FakeLoader {
    pub fn new(failing: &[SoundKey]) -> Self {
        Self {
            failing: failing.iter().copied().collect(),
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl AssetLoader for FakeLoader {
    type Buffer = SoundKey;

    async fn load(&self, key: SoundKey, url: &str) -> anyhow::Result<SoundKey> {
        self.requests.borrow_mut().push(key);
        if self.failing.contains(&key) {
            anyhow::bail!("404 for {}", url);
        }
        Ok(key)
    }
}
