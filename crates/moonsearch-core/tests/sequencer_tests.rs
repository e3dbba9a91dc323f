mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{loaded_engine, FakeBackend};
use moonsearch_core::{
    AudioEngine, Cue, ExperienceConfig, Permission, Phase, PhaseSequencer, PlanetInfo,
    RawOrientation, SkyPosition, SoundKey, TargetId, TargetKind, UserInput,
};

/// Raw compass heading of the device when the session calibrates.
const OFFSET: f64 = 200.0;

const INTRO_END: f64 = 31.0;
const IGNITE_AT: f64 = 32.0;
const LIFTOFF_AT: f64 = IGNITE_AT + 2.0;
const SEARCH_AT: f64 = LIFTOFF_AT + 4.5;

struct Harness {
    seq: PhaseSequencer<FakeBackend>,
    engine: Rc<RefCell<AudioEngine<FakeBackend>>>,
    cues: Vec<Cue>,
}

impl Harness {
    fn new(config: ExperienceConfig) -> Self {
        let engine = loaded_engine();
        let seq = PhaseSequencer::new(config, engine.clone(), 42).unwrap();
        Self {
            seq,
            engine,
            cues: Vec::new(),
        }
    }

    fn clock(&self, now: f64) {
        self.engine.borrow_mut().backend_mut().now = now;
    }

    fn tick(&mut self, now: f64) -> Vec<Cue> {
        self.clock(now);
        self.seq.tick(now);
        self.collect()
    }

    fn input(&mut self, input: UserInput, now: f64) -> Vec<Cue> {
        self.clock(now);
        self.seq.handle(input, now);
        self.collect()
    }

    fn raw(&mut self, raw: RawOrientation, now: f64) -> Vec<Cue> {
        self.clock(now);
        self.seq.on_orientation(raw, now);
        self.collect()
    }

    /// Point the device at calibrated (yaw, pitch).
    fn aim(&mut self, yaw: f32, pitch: f32, now: f64) -> Vec<Cue> {
        self.raw(RawOrientation::new(OFFSET + yaw as f64, pitch as f64, 0.0), now)
    }

    fn collect(&mut self) -> Vec<Cue> {
        let fresh = self.seq.drain_cues();
        self.cues.extend(fresh.iter().cloned());
        fresh
    }

    fn starts_of(&self, sound: SoundKey) -> usize {
        self.engine.borrow().backend().starts_of(sound)
    }

    fn playing(&self, sound: SoundKey) -> bool {
        self.engine.borrow().is_playing(sound)
    }

    /// Run intro and launch with the given permission outcome.
    fn into_search(&mut self, permission: Permission) {
        self.input(UserInput::Start, 0.0);
        self.tick(INTRO_END);
        self.input(UserInput::Ignition(permission), IGNITE_AT);
        self.tick(LIFTOFF_AT);
        self.tick(SEARCH_AT);
        assert_eq!(self.seq.phase(), Phase::Search);
    }

    /// Enter search and calibrate facing (0, 70).
    fn calibrated(config: ExperienceConfig) -> Self {
        let mut h = Self::new(config);
        h.into_search(Permission::Granted);
        h.raw(RawOrientation::new(OFFSET, 70.0, 0.0), SEARCH_AT + 0.5);
        h
    }

    fn position_of(&self, id: TargetId) -> SkyPosition {
        self.seq
            .search()
            .and_then(|s| s.field())
            .and_then(|f| f.get(id))
            .map(|t| t.position)
            .unwrap()
    }

    fn win_position(&self) -> SkyPosition {
        self.seq
            .search()
            .and_then(|s| s.field())
            .and_then(|f| f.win())
            .map(|t| t.position)
            .unwrap()
    }
}

fn found_win(cues: &[Cue]) -> usize {
    cues.iter()
        .filter(|c| matches!(c, Cue::TargetFound { kind: TargetKind::Win, .. }))
        .count()
}

#[test]
fn intro_shows_lines_on_schedule() {
    let mut h = Harness::new(ExperienceConfig::default());
    assert_eq!(h.collect(), vec![Cue::PhaseEntered(Phase::Intro)]);

    let cues = h.input(UserInput::Start, 0.0);
    assert_eq!(cues, vec![Cue::IntroLine(0)]);
    assert!(h.engine.borrow().is_unlocked());
    assert!(h.playing(SoundKey::BgmPrologue));

    assert!(h.tick(1.9).is_empty());
    assert_eq!(h.tick(2.0), vec![Cue::IntroLine(1)]);

    // a second tap does not restart anything
    h.input(UserInput::Start, 2.5);
    assert_eq!(h.starts_of(SoundKey::BgmPrologue), 1);

    let rest = h.tick(30.9);
    assert_eq!(rest.last(), Some(&Cue::IntroLine(14)));
    assert_eq!(h.seq.phase(), Phase::Intro);

    let cues = h.tick(INTRO_END);
    assert_eq!(cues, vec![Cue::PhaseEntered(Phase::Launch)]);
    assert!(h.engine.borrow().is_fading(SoundKey::BgmPrologue));
    assert!(h.engine.borrow().is_looping(SoundKey::ShipIdle));
    assert_eq!(h.engine.borrow().track_volume(SoundKey::ShipIdle), Some(0.6));
}

#[test]
fn ignition_warps_then_launches_into_search() {
    let mut h = Harness::new(ExperienceConfig::default());
    h.input(UserInput::Start, 0.0);
    h.tick(INTRO_END);

    assert_eq!(
        h.input(UserInput::Ignition(Permission::Granted), IGNITE_AT),
        vec![Cue::Warp]
    );
    assert!(h.seq.is_igniting());
    assert!(h.input(UserInput::Ignition(Permission::Granted), IGNITE_AT + 0.1).is_empty());

    h.tick(LIFTOFF_AT);
    assert_eq!(h.starts_of(SoundKey::Touch), 1);
    assert!(h.playing(SoundKey::ShipLaunch));
    assert!(!h.playing(SoundKey::BgmPrologue));
    assert!(h.engine.borrow().is_fading(SoundKey::ShipIdle));

    // the first launch sound hands over to the second without a gap
    let voice = h.engine.borrow().voice(SoundKey::ShipLaunch).unwrap();
    h.engine.borrow_mut().handle_ended(voice);
    assert!(h.playing(SoundKey::ShipLaunch2));

    assert_eq!(h.seq.phase(), Phase::Launch);
    let cues = h.tick(SEARCH_AT);
    assert_eq!(
        cues,
        vec![Cue::PhaseEntered(Phase::Search), Cue::OrientationWanted(true)]
    );
    assert!(h.engine.borrow().is_looping(SoundKey::BgmSearch));
    assert!(h.seq.scope().wants_orientation());
}

#[test]
fn denied_permission_keeps_the_launch_phase() {
    let mut h = Harness::new(ExperienceConfig::default());
    h.input(UserInput::Start, 0.0);
    h.tick(INTRO_END);

    let cues = h.input(UserInput::Ignition(Permission::Denied), IGNITE_AT);
    assert_eq!(cues, vec![Cue::SensorDenied]);
    assert!(!h.seq.is_igniting());
    assert!(h.tick(IGNITE_AT + 10.0).is_empty());
    assert_eq!(h.seq.phase(), Phase::Launch);

    // a later tap can still succeed
    assert_eq!(
        h.input(UserInput::Ignition(Permission::NotRequired), 50.0),
        vec![Cue::Warp]
    );
}

#[test]
fn ignition_outside_launch_is_ignored() {
    let mut h = Harness::new(ExperienceConfig::default());
    h.collect();
    assert!(h.input(UserInput::Ignition(Permission::Granted), 0.0).is_empty());
    assert_eq!(h.seq.phase(), Phase::Intro);
}

#[test]
fn orientation_before_search_is_ignored() {
    let mut h = Harness::new(ExperienceConfig::default());
    h.input(UserInput::Start, 0.0);
    assert!(h.raw(RawOrientation::new(10.0, 80.0, 0.0), 1.0).is_empty());
    assert!(h.seq.search().is_none());
}

#[test]
fn first_sample_calibrates_and_spawns_targets() {
    let mut h = Harness::new(ExperienceConfig::default());
    h.into_search(Permission::Granted);

    assert!(h.raw(RawOrientation::default(), SEARCH_AT + 0.1).is_empty());

    let cues = h.raw(RawOrientation::new(OFFSET, 70.0, 0.0), SEARCH_AT + 0.2);
    let spawned = cues
        .iter()
        .find_map(|c| match c {
            Cue::TargetsSpawned(list) => Some(list.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(spawned.len(), 4);
    assert_eq!(spawned[0].0, TargetId(0));

    let tracker = h.seq.search().unwrap().tracker();
    assert_eq!(tracker.offset(), Some(OFFSET as f32));
    assert!(cues.iter().any(|c| matches!(c, Cue::Guidance(_))));

    // heading 210 raw is 10 calibrated
    h.raw(RawOrientation::new(OFFSET + 10.0, 70.0, 0.0), SEARCH_AT + 0.3);
    let yaw = h.seq.search().unwrap().tracker().latest().unwrap().yaw;
    assert!((yaw - 10.0).abs() < 1e-4);
}

#[test]
fn silent_sensor_raises_a_notice() {
    let mut h = Harness::new(ExperienceConfig::default());
    h.into_search(Permission::NotRequired);
    let cues = h.tick(SEARCH_AT + 5.0);
    assert!(cues.contains(&Cue::AwaitingSensor));
    assert_eq!(h.seq.phase(), Phase::Search);
}

#[test]
fn calibrated_sensor_suppresses_the_notice() {
    let mut h = Harness::calibrated(ExperienceConfig::moon_only());
    assert!(!h.tick(SEARCH_AT + 5.0).contains(&Cue::AwaitingSensor));
}

#[test]
fn holding_on_the_moon_reaches_climax_once() {
    let mut h = Harness::calibrated(ExperienceConfig::moon_only());
    let win = h.win_position();
    let t0 = SEARCH_AT + 1.0;

    // (win + 5°, win - 2°) is about 5.4° off
    let cues = h.aim(win.yaw + 5.0, win.pitch - 2.0, t0);
    let frame = cues
        .iter()
        .find_map(|c| match c {
            Cue::Guidance(f) => Some(*f),
            _ => None,
        })
        .unwrap();
    assert!((frame.guidance.distance - 29f32.sqrt()).abs() < 1e-3);
    assert!(frame.in_lock_range);
    assert!(!frame.guidance.arrow_visible);
    assert!(cues.contains(&Cue::LockStarted(TargetId(0))));
    assert_eq!(h.starts_of(SoundKey::LockAlarm), 1);

    // the alarm repeats while the countdown runs
    h.aim(win.yaw + 5.0, win.pitch - 2.0, t0 + 0.5);
    h.tick(t0 + 0.5);
    h.tick(t0 + 0.9);
    assert_eq!(h.starts_of(SoundKey::LockAlarm), 3);

    h.aim(win.yaw + 4.0, win.pitch - 1.0, t0 + 2.0);
    assert_eq!(found_win(&h.cues), 0);

    let cues = h.aim(win.yaw + 4.0, win.pitch - 1.0, t0 + 3.0);
    assert_eq!(found_win(&cues), 1);
    assert!(cues.contains(&Cue::PhaseEntered(Phase::Climax)));
    assert!(cues.contains(&Cue::OrientationWanted(false)));
    assert_eq!(h.seq.phase(), Phase::Climax);
    assert!(h.seq.search().is_none());
    assert_eq!(h.seq.scope().pending_timers(), 0);
    assert!(h.engine.borrow().is_fading(SoundKey::BgmSearch));
    assert_eq!(h.starts_of(SoundKey::Popup), 1);

    // nothing from the search phase fires afterwards
    let alarms = h.starts_of(SoundKey::LockAlarm);
    assert!(h.aim(win.yaw, win.pitch, t0 + 3.1).is_empty());
    for step in 1..100 {
        assert!(h.tick(t0 + 3.0 + step as f64 * 0.5).is_empty());
    }
    assert_eq!(h.starts_of(SoundKey::LockAlarm), alarms);
    assert_eq!(found_win(&h.cues), 1);
    assert!(!h.playing(SoundKey::BgmSearch));
}

#[test]
fn countdown_completes_between_samples() {
    let mut h = Harness::calibrated(ExperienceConfig::moon_only());
    let win = h.win_position();
    let t0 = SEARCH_AT + 1.0;
    h.aim(win.yaw, win.pitch, t0);
    assert!(h.tick(t0 + 2.9).iter().all(|c| !matches!(c, Cue::TargetFound { .. })));
    let cues = h.tick(t0 + 3.0);
    assert_eq!(found_win(&cues), 1);
    assert_eq!(h.seq.phase(), Phase::Climax);
}

#[test]
fn looking_away_resets_the_countdown() {
    let mut h = Harness::calibrated(ExperienceConfig::moon_only());
    let win = h.win_position();
    let t0 = SEARCH_AT + 1.0;

    h.aim(win.yaw, win.pitch, t0);
    let cues = h.aim(win.yaw + 30.0, win.pitch, t0 + 2.5);
    assert!(cues.contains(&Cue::LockCancelled(TargetId(0))));
    let alarms = h.starts_of(SoundKey::LockAlarm);
    h.tick(t0 + 2.9);
    assert_eq!(h.starts_of(SoundKey::LockAlarm), alarms);

    let cues = h.aim(win.yaw, win.pitch, t0 + 3.0);
    assert!(cues.contains(&Cue::LockStarted(TargetId(0))));
    h.tick(t0 + 5.9);
    assert_eq!(found_win(&h.cues), 0);
    assert_eq!(h.seq.phase(), Phase::Search);
    h.tick(t0 + 6.1);
    assert_eq!(found_win(&h.cues), 1);
}

#[test]
fn decoy_opens_a_popup_until_dismissed() {
    let config = ExperienceConfig {
        decoys: vec![TargetKind::Decoy(PlanetInfo::MARS)],
        ..ExperienceConfig::default()
    };
    let mut h = Harness::calibrated(config);
    let mars = h.position_of(TargetId(1));
    let t0 = SEARCH_AT + 1.0;

    h.aim(mars.yaw, mars.pitch, t0);
    let cues = h.tick(t0 + 3.0);
    assert!(cues.contains(&Cue::TargetFound {
        id: TargetId(1),
        kind: TargetKind::Decoy(PlanetInfo::MARS),
    }));
    assert_eq!(h.seq.search().unwrap().popup(), Some(TargetId(1)));
    assert_eq!(h.starts_of(SoundKey::Popup), 1);
    assert_eq!(h.starts_of(SoundKey::Scan), 1);
    assert_eq!(h.seq.phase(), Phase::Search);

    // samples are swallowed while the popup is open
    assert!(h.aim(mars.yaw, mars.pitch, t0 + 3.5).is_empty());

    let cues = h.input(UserInput::DismissPopup, t0 + 4.0);
    assert_eq!(cues.first(), Some(&Cue::PopupDismissed(TargetId(1))));
    let field = h.seq.search().unwrap().field().unwrap();
    assert!(field.get(TargetId(1)).unwrap().visited());

    // the decoy never locks again; guidance moves on to the moon
    let cues = h.aim(mars.yaw, mars.pitch, t0 + 5.0);
    let next = cues
        .iter()
        .find_map(|c| match c {
            Cue::Guidance(f) => Some(f.target),
            _ => None,
        })
        .unwrap();
    assert_eq!(next, TargetId(0));
    h.tick(t0 + 20.0);
    let found = h
        .cues
        .iter()
        .filter(|c| matches!(c, Cue::TargetFound { .. }))
        .count();
    assert_eq!(found, 1);

    // a stray dismiss does nothing
    assert!(h.input(UserInput::DismissPopup, t0 + 21.0).is_empty());
}

#[test]
fn shooting_stars_come_and_go() {
    let mut h = Harness::new(ExperienceConfig::moon_only());
    h.into_search(Permission::Granted);
    let cues = h.tick(SEARCH_AT + 25.0);
    let star = cues
        .iter()
        .find_map(|c| match c {
            Cue::ShootingStar(s) => Some(*s),
            _ => None,
        })
        .unwrap();
    assert!((0.0..60.0).contains(&star.top_percent));
    assert!((0.0..80.0).contains(&star.left_percent));
    assert!((0.8..1.3).contains(&star.scale));
    assert!(h.tick(SEARCH_AT + 28.0).contains(&Cue::ShootingStarFaded));
}
