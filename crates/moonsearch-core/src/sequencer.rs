//! Phase choreography: INTRO -> LAUNCH -> SEARCH -> CLIMAX.

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;

use crate::assets::{ImageKey, SoundKey};
use crate::audio::{AudioBackend, AudioEngine, Playback};
use crate::config::ExperienceConfig;
use crate::constants::IDLE_LOOP_VOLUME;
use crate::error::ConfigError;
use crate::guidance::{compute_guidance, Guidance};
use crate::lock_on::{ActiveTarget, LockEvent, LockEvents, LockOn};
use crate::orientation::{
    Orientation, OrientationTracker, OrientationUpdate, Permission, RawOrientation,
};
use crate::targets::{TargetField, TargetId, TargetKind};
use crate::timeline::{TimerId, Timeline};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Intro,
    Launch,
    Search,
    Climax,
}

/// Discrete taps from the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserInput {
    Start,
    /// Ignition tap, carrying the outcome of the orientation permission
    /// request issued inside the same gesture.
    Ignition(Permission),
    DismissPopup,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShootingStar {
    pub top_percent: f32,
    pub left_percent: f32,
    pub scale: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuidanceFrame {
    pub target: TargetId,
    pub image: ImageKey,
    pub guidance: Guidance,
    /// Inside the lock threshold; the target is drawn highlighted.
    pub in_lock_range: bool,
    pub lock_progress: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Cue {
    PhaseEntered(Phase),
    IntroLine(usize),
    Warp,
    /// Subscribe to (true) or release (false) platform orientation events.
    OrientationWanted(bool),
    SensorDenied,
    AwaitingSensor,
    TargetsSpawned(Vec<(TargetId, ImageKey)>),
    Guidance(GuidanceFrame),
    LockStarted(TargetId),
    LockCancelled(TargetId),
    TargetFound { id: TargetId, kind: TargetKind },
    PopupDismissed(TargetId),
    ShootingStar(ShootingStar),
    ShootingStarFaded,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum PhaseAction {
    IntroLine(usize),
    IntroDone,
    Liftoff,
    EnterSearch,
    LockAlarm,
    ShootingStar,
    ShootingStarFaded,
    SensorNotice,
}

/// Resources owned by the current phase and released together.
#[derive(Debug, Default)]
pub struct PhaseScope {
    timeline: Timeline<PhaseAction>,
    orientation: bool,
    generation: u64,
}

impl PhaseScope {
    pub fn pending_timers(&self) -> usize {
        self.timeline.len()
    }

    pub fn wants_orientation(&self) -> bool {
        self.orientation
    }

    fn dispose(&mut self, cues: &mut Vec<Cue>) {
        self.timeline.clear();
        if self.orientation {
            self.orientation = false;
            cues.push(Cue::OrientationWanted(false));
        }
        self.generation += 1;
    }
}

/// State that exists only while searching.
#[derive(Debug)]
pub struct SearchSession {
    tracker: OrientationTracker,
    field: Option<TargetField>,
    lock_on: LockOn,
    alarm: Option<TimerId>,
    popup: Option<TargetId>,
    last_guidance: Option<GuidanceFrame>,
}

impl SearchSession {
    pub fn tracker(&self) -> &OrientationTracker {
        &self.tracker
    }

    pub fn field(&self) -> Option<&TargetField> {
        self.field.as_ref()
    }

    pub fn lock_on(&self) -> &LockOn {
        &self.lock_on
    }

    /// Decoy whose discovery popup is open.
    pub fn popup(&self) -> Option<TargetId> {
        self.popup
    }

    pub fn last_guidance(&self) -> Option<&GuidanceFrame> {
        self.last_guidance.as_ref()
    }
}

pub struct PhaseSequencer<B: AudioBackend + 'static> {
    config: ExperienceConfig,
    audio: Rc<RefCell<AudioEngine<B>>>,
    rng: StdRng,
    phase: Phase,
    started: bool,
    igniting: bool,
    permission: Option<Permission>,
    scope: PhaseScope,
    search: Option<SearchSession>,
    cues: Vec<Cue>,
}

impl<B: AudioBackend + 'static> PhaseSequencer<B> {
    pub fn new(
        config: ExperienceConfig,
        audio: Rc<RefCell<AudioEngine<B>>>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            audio,
            rng: StdRng::seed_from_u64(seed),
            phase: Phase::Intro,
            started: false,
            igniting: false,
            permission: None,
            scope: PhaseScope::default(),
            search: None,
            cues: vec![Cue::PhaseEntered(Phase::Intro)],
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &ExperienceConfig {
        &self.config
    }

    pub fn audio(&self) -> &Rc<RefCell<AudioEngine<B>>> {
        &self.audio
    }

    pub fn scope(&self) -> &PhaseScope {
        &self.scope
    }

    pub fn search(&self) -> Option<&SearchSession> {
        self.search.as_ref()
    }

    pub fn is_igniting(&self) -> bool {
        self.igniting
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn handle(&mut self, input: UserInput, now: f64) {
        match input {
            UserInput::Start => self.start_intro(now),
            UserInput::Ignition(permission) => self.ignite(permission, now),
            UserInput::DismissPopup => self.dismiss_popup(now),
        }
    }

    /// One platform orientation sample. Selection, distance and lock-on are
    /// all evaluated against this one snapshot.
    pub fn on_orientation(&mut self, raw: RawOrientation, now: f64) {
        if self.phase != Phase::Search || !self.scope.orientation {
            return;
        }
        let Some(search) = self.search.as_mut() else {
            return;
        };
        let Some(update) = search.tracker.ingest(raw) else {
            return;
        };
        if let OrientationUpdate::Calibrated { origin, .. } = update {
            let field =
                TargetField::spawn(origin, &self.config.decoys, &self.config.spawn, &mut self.rng);
            self.cues.push(Cue::TargetsSpawned(
                field
                    .targets()
                    .iter()
                    .map(|t| (t.id, t.kind.image()))
                    .collect(),
            ));
            search.field = Some(field);
        }
        self.evaluate(update.orientation(), now);
    }

    pub fn tick(&mut self, now: f64) {
        let generation = self.scope.generation;
        for action in self.scope.timeline.due(now) {
            if self.scope.generation != generation {
                break;
            }
            self.run(action, now);
        }

        let completed = match self.search.as_mut() {
            Some(search) if search.popup.is_none() => search.lock_on.poll(now),
            _ => None,
        };
        if let Some(event) = completed {
            self.on_lock_event(event, now);
        }

        self.audio.borrow_mut().reap();
    }

    fn start_intro(&mut self, now: f64) {
        if self.phase != Phase::Intro || self.started {
            return;
        }
        self.started = true;
        {
            let mut audio = self.audio.borrow_mut();
            audio.unlock();
            audio.play(SoundKey::BgmPrologue, Playback::once());
        }
        let timing = &self.config.timing;
        let lines = timing.intro_lines;
        let mut steps: SmallVec<[(PhaseAction, f64); 16]> = (0..lines)
            .map(|i| {
                let delay = if i == 0 { 0.0 } else { timing.intro_line_sec };
                (PhaseAction::IntroLine(i), delay)
            })
            .collect();
        let tail = if lines == 0 {
            timing.intro_tail_sec
        } else {
            timing.intro_line_sec + timing.intro_tail_sec
        };
        steps.push((PhaseAction::IntroDone, tail));
        self.scope.timeline.sequence(now, steps);
        // the first line shows at once rather than on the next frame
        self.tick(now);
    }

    fn ignite(&mut self, permission: Permission, now: f64) {
        if self.phase != Phase::Launch || self.igniting {
            return;
        }
        self.audio.borrow_mut().unlock();
        if !permission.allows_tracking() {
            log::warn!("[sequencer] orientation permission denied");
            self.permission = Some(permission);
            self.cues.push(Cue::SensorDenied);
            return;
        }
        self.permission = Some(permission);
        self.igniting = true;
        self.cues.push(Cue::Warp);
        self.scope
            .timeline
            .after(now, self.config.timing.warp_delay_sec, PhaseAction::Liftoff);
    }

    fn dismiss_popup(&mut self, now: f64) {
        let Some(search) = self.search.as_mut() else {
            return;
        };
        let Some(id) = search.popup.take() else {
            return;
        };
        if let Some(field) = search.field.as_mut() {
            field.mark_visited(id);
        }
        search.lock_on.clear_acquired();
        self.cues.push(Cue::PopupDismissed(id));
        if let Some(orientation) = search.tracker.latest() {
            self.evaluate(orientation, now);
        }
    }

    fn evaluate(&mut self, orientation: Orientation, now: f64) {
        let Some(search) = self.search.as_mut() else {
            return;
        };
        if search.popup.is_some() {
            return;
        }
        let Some(field) = search.field.as_ref() else {
            return;
        };

        let active = field.active_target(&orientation);
        let frame = active.map(|t| {
            let guidance = compute_guidance(&orientation, t, &self.config.guidance);
            (
                t.id,
                t.kind.image(),
                guidance,
                guidance.distance < self.config.lock_on.threshold(),
            )
        });
        let events: LockEvents = search.lock_on.update(
            frame.map(|(id, _, g, _)| ActiveTarget {
                id,
                distance: g.distance,
            }),
            now,
        );

        if let Some((target, image, guidance, in_lock_range)) = frame {
            let frame = GuidanceFrame {
                target,
                image,
                guidance,
                in_lock_range,
                lock_progress: search.lock_on.progress(now),
            };
            search.last_guidance = Some(frame);
            self.cues.push(Cue::Guidance(frame));
        }

        for event in events {
            self.on_lock_event(event, now);
        }
    }

    fn on_lock_event(&mut self, event: LockEvent, now: f64) {
        match event {
            LockEvent::Started(id) => {
                self.cues.push(Cue::LockStarted(id));
                self.audio
                    .borrow_mut()
                    .play(SoundKey::LockAlarm, Playback::once());
                let alarm = self.scope.timeline.every(
                    now,
                    self.config.timing.lock_alarm_repeat_sec,
                    PhaseAction::LockAlarm,
                );
                if let Some(search) = self.search.as_mut() {
                    if let Some(previous) = search.alarm.replace(alarm) {
                        self.scope.timeline.cancel(previous);
                    }
                }
            }
            LockEvent::Cancelled(id) => {
                self.cues.push(Cue::LockCancelled(id));
                self.silence_alarm();
            }
            LockEvent::Acquired(id) => {
                self.silence_alarm();
                let kind = self
                    .search
                    .as_ref()
                    .and_then(|s| s.field.as_ref())
                    .and_then(|f| f.get(id))
                    .map(|t| t.kind.clone());
                match kind {
                    Some(TargetKind::Win) => self.finish(id, now),
                    Some(kind) => self.open_popup(id, kind),
                    None => log::error!("[sequencer] acquired unknown target {:?}", id),
                }
            }
        }
    }

    fn silence_alarm(&mut self) {
        if let Some(alarm) = self.search.as_mut().and_then(|s| s.alarm.take()) {
            self.scope.timeline.cancel(alarm);
        }
    }

    fn open_popup(&mut self, id: TargetId, kind: TargetKind) {
        {
            let mut audio = self.audio.borrow_mut();
            audio.play(SoundKey::Popup, Playback::once());
            audio.play(SoundKey::Scan, Playback::once());
        }
        if let Some(search) = self.search.as_mut() {
            search.popup = Some(id);
        }
        self.cues.push(Cue::TargetFound { id, kind });
    }

    fn finish(&mut self, id: TargetId, now: f64) {
        if let Some(field) = self.search.as_mut().and_then(|s| s.field.as_mut()) {
            field.mark_visited(id);
        }
        {
            let mut audio = self.audio.borrow_mut();
            audio.play(SoundKey::Popup, Playback::once());
            audio.fade_out(SoundKey::BgmSearch, self.config.timing.search_fade_sec);
        }
        self.cues.push(Cue::TargetFound {
            id,
            kind: TargetKind::Win,
        });
        self.transition(Phase::Climax, now);
    }

    fn run(&mut self, action: PhaseAction, now: f64) {
        match action {
            PhaseAction::IntroLine(i) => self.cues.push(Cue::IntroLine(i)),
            PhaseAction::IntroDone => self.transition(Phase::Launch, now),
            PhaseAction::Liftoff => self.liftoff(now),
            PhaseAction::EnterSearch => self.transition(Phase::Search, now),
            PhaseAction::LockAlarm => self
                .audio
                .borrow_mut()
                .play(SoundKey::LockAlarm, Playback::once()),
            PhaseAction::ShootingStar => {
                let star = ShootingStar {
                    top_percent: self.rng.gen_range(0.0..60.0),
                    left_percent: self.rng.gen_range(0.0..80.0),
                    scale: self.rng.gen_range(0.8..1.3),
                };
                self.cues.push(Cue::ShootingStar(star));
                let timing = &self.config.timing;
                self.scope.timeline.after(
                    now,
                    timing.shooting_star_lifetime_sec,
                    PhaseAction::ShootingStarFaded,
                );
                self.schedule_shooting_star(now);
            }
            PhaseAction::ShootingStarFaded => self.cues.push(Cue::ShootingStarFaded),
            PhaseAction::SensorNotice => {
                let waiting = self
                    .search
                    .as_ref()
                    .map_or(false, |s| !s.tracker.is_calibrated());
                if waiting {
                    log::warn!("[sequencer] no orientation samples yet");
                    self.cues.push(Cue::AwaitingSensor);
                }
            }
        }
    }

    fn liftoff(&mut self, now: f64) {
        {
            let mut audio = self.audio.borrow_mut();
            audio.play(SoundKey::Touch, Playback::once());
            audio.play_then(SoundKey::ShipLaunch, Playback::once(), |engine| {
                engine.stop(SoundKey::BgmPrologue);
                engine.play(SoundKey::ShipLaunch2, Playback::once());
            });
            audio.stop(SoundKey::BgmPrologue);
            audio.fade_out(SoundKey::ShipIdle, self.config.timing.idle_fade_sec);
        }
        self.scope.timeline.after(
            now,
            self.config.timing.launch_to_search_sec,
            PhaseAction::EnterSearch,
        );
    }

    fn schedule_shooting_star(&mut self, now: f64) {
        let timing = &self.config.timing;
        let delay = if timing.shooting_star_max_sec > timing.shooting_star_min_sec {
            self.rng
                .gen_range(timing.shooting_star_min_sec..timing.shooting_star_max_sec)
        } else {
            timing.shooting_star_min_sec
        };
        self.scope
            .timeline
            .after(now, delay, PhaseAction::ShootingStar);
    }

    fn transition(&mut self, next: Phase, now: f64) {
        if next <= self.phase {
            log::error!(
                "[sequencer] refusing backward transition {:?} -> {:?}",
                self.phase,
                next
            );
            return;
        }
        log::info!("[sequencer] {:?} -> {:?}", self.phase, next);
        self.scope.dispose(&mut self.cues);
        if let Some(mut search) = self.search.take() {
            search.lock_on.reset();
        }
        self.phase = next;
        self.cues.push(Cue::PhaseEntered(next));

        match next {
            Phase::Intro => {}
            Phase::Launch => {
                let mut audio = self.audio.borrow_mut();
                audio.fade_out(SoundKey::BgmPrologue, self.config.timing.prologue_fade_sec);
                audio.play(
                    SoundKey::ShipIdle,
                    Playback::looped().volume(IDLE_LOOP_VOLUME),
                );
            }
            Phase::Search => {
                self.audio
                    .borrow_mut()
                    .play(SoundKey::BgmSearch, Playback::looped());
                let mut tracker = OrientationTracker::new();
                if let Some(permission) = self.permission {
                    tracker.set_permission(permission);
                }
                self.search = Some(SearchSession {
                    tracker,
                    field: None,
                    lock_on: LockOn::new(self.config.lock_on.clone()),
                    alarm: None,
                    popup: None,
                    last_guidance: None,
                });
                self.scope.orientation = true;
                self.cues.push(Cue::OrientationWanted(true));
                self.schedule_shooting_star(now);
                self.scope.timeline.after(
                    now,
                    self.config.timing.sensor_notice_sec,
                    PhaseAction::SensorNotice,
                );
            }
            Phase::Climax => {}
        }
    }
}
