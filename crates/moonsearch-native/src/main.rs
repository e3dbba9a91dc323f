use std::cell::RefCell;
use std::rc::Rc;

use fnv::FnvHashMap;
use glam::Vec2;

use moonsearch_core::{
    load_all, AssetLoader, AudioBackend, AudioEngine, AudioError, Cue, ExperienceConfig,
    Permission, Phase, PhaseSequencer, RawOrientation, SoundKey, UserInput, VoiceId,
};

const FRAME_SEC: f64 = 1.0 / 60.0;
const MAX_SECONDS: f64 = 300.0;
// Raw compass heading the simulated device starts at
const START_HEADING: f64 = 123.0;
const START_PITCH: f64 = 70.0;
const SWEEP_DEG_PER_SEC: f32 = 30.0;
const POPUP_READ_SEC: f64 = 1.5;

/// Nominal length of each one-shot sound, used to fake `ended` events.
fn clip_length(key: SoundKey) -> f64 {
    match key {
        SoundKey::BgmPrologue => 40.0,
        SoundKey::ShipLaunch => 3.0,
        SoundKey::ShipLaunch2 => 4.0,
        SoundKey::LockAlarm => 0.3,
        _ => 1.0,
    }
}

struct Voice {
    key: SoundKey,
    ends_at: Option<f64>,
}

/// Audio backend that only logs and keeps virtual time.
#[derive(Default)]
struct LogBackend {
    now: f64,
    running: bool,
    voices: FnvHashMap<VoiceId, Voice>,
}

impl LogBackend {
    fn finished(&self) -> Vec<VoiceId> {
        self.voices
            .iter()
            .filter(|(_, v)| v.ends_at.map_or(false, |t| t <= self.now))
            .map(|(id, _)| *id)
            .collect()
    }
}

impl AudioBackend for LogBackend {
    type Buffer = SoundKey;

    fn current_time(&self) -> f64 {
        self.now
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn resume(&mut self) -> Result<(), AudioError> {
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
        log::info!(
            "[sound] t={:6.2} start {:?} {:?} loop={} vol={:.2}",
            self.now,
            voice,
            buffer,
            looping,
            volume
        );
        let ends_at = (!looping).then(|| self.now + clip_length(*buffer));
        self.voices.insert(
            voice,
            Voice {
                key: *buffer,
                ends_at,
            },
        );
        Ok(())
    }

    fn stop(&mut self, voice: VoiceId, when: f64) {
        if let Some(v) = self.voices.get_mut(&voice) {
            log::info!("[sound] t={:6.2} stop {:?} at {:.2}", self.now, v.key, when);
            v.ends_at = Some(when);
        }
    }

    fn cancel_ramps(&mut self, _voice: VoiceId, _from: f64) {}

    fn ramp_gain(&mut self, voice: VoiceId, target: f32, from: f64, until: f64) {
        if let Some(v) = self.voices.get(&voice) {
            log::info!(
                "[sound] t={:6.2} ramp {:?} -> {:.2} over {:.2}s",
                self.now,
                v.key,
                target,
                until - from
            );
        }
    }

    fn release(&mut self, voice: VoiceId) {
        self.voices.remove(&voice);
    }
}

/// Every manifest entry "decodes" to its own key.
struct ManifestLoader;

impl AssetLoader for ManifestLoader {
    type Buffer = SoundKey;

    async fn load(&self, key: SoundKey, url: &str) -> anyhow::Result<SoundKey> {
        log::debug!("[assets] {:?} <- {}", key, url);
        Ok(key)
    }
}

/// A user turning the device towards wherever the arrow points.
struct Pilot {
    yaw: f32,
    pitch: f32,
    popup_since: Option<f64>,
}

impl Pilot {
    fn sample(&self) -> RawOrientation {
        RawOrientation::new(START_HEADING + self.yaw as f64, self.pitch as f64, 0.0)
    }

    fn follow(&mut self, delta: Vec2, dt: f32) {
        let step = delta.clamp_length_max(SWEEP_DEG_PER_SEC * dt);
        self.yaw = (self.yaw + step.x).rem_euclid(360.0);
        self.pitch += step.y;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let seed = std::env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(42);

    let engine = Rc::new(RefCell::new(AudioEngine::new(LogBackend::default())));
    let summary = pollster::block_on(load_all(&*engine, &ManifestLoader));
    log::info!("[assets] {} sounds ready", summary.loaded);

    let mut seq = PhaseSequencer::new(ExperienceConfig::default(), engine.clone(), seed)?;
    let mut pilot = Pilot {
        yaw: 0.0,
        pitch: START_PITCH as f32,
        popup_since: None,
    };
    let mut listening = false;

    seq.handle(UserInput::Start, 0.0);
    let mut now = 0.0;
    while now < MAX_SECONDS && seq.phase() != Phase::Climax {
        now += FRAME_SEC;
        engine.borrow_mut().backend_mut().now = now;

        seq.tick(now);
        let ended = engine.borrow().backend().finished();
        for voice in ended {
            engine.borrow_mut().handle_ended(voice);
        }

        if seq.phase() == Phase::Launch && !seq.is_igniting() {
            seq.handle(UserInput::Ignition(Permission::NotRequired), now);
        }

        if listening {
            seq.on_orientation(pilot.sample(), now);
            let search = seq.search();
            match search.and_then(|s| s.popup()) {
                Some(_) => {
                    let since = *pilot.popup_since.get_or_insert(now);
                    if now - since >= POPUP_READ_SEC {
                        pilot.popup_since = None;
                        seq.handle(UserInput::DismissPopup, now);
                    }
                }
                None => {
                    if let Some(frame) = search.and_then(|s| s.last_guidance()) {
                        pilot.follow(frame.guidance.delta, FRAME_SEC as f32);
                    }
                }
            }
        }

        for cue in seq.drain_cues() {
            match cue {
                Cue::OrientationWanted(on) => listening = on,
                Cue::Guidance(_) => {}
                other => log::info!("[cue] t={:6.2} {:?}", now, other),
            }
        }
    }

    if seq.phase() == Phase::Climax {
        log::info!("moon found after {:.1}s", now);
        Ok(())
    } else {
        anyhow::bail!("no climax after {:.0}s (phase {:?})", now, seq.phase())
    }
}
