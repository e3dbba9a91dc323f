//! Runtime configuration assembled from the tuning constants.

use crate::constants::*;
use crate::error::ConfigError;
use crate::targets::{PlanetInfo, TargetKind};

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnConfig {
    pub min_separation: f32,
    pub max_attempts: u32,
    pub yaw_offset_min: f32,
    pub yaw_offset_max: f32,
    pub pitch_jitter: f32,
    pub pitch_min: f32,
    pub pitch_max: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            min_separation: MIN_SEPARATION_DEG,
            max_attempts: SPAWN_MAX_ATTEMPTS,
            yaw_offset_min: SPAWN_YAW_OFFSET_MIN_DEG,
            yaw_offset_max: SPAWN_YAW_OFFSET_MAX_DEG,
            pitch_jitter: SPAWN_PITCH_JITTER_DEG,
            pitch_min: SKY_PITCH_MIN_DEG,
            pitch_max: SKY_PITCH_MAX_DEG,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LockOnConfig {
    pub hit_tolerance: f32,
    pub leniency: f32,
    pub duration_sec: f64,
}

impl LockOnConfig {
    /// Radius inside which a countdown starts and keeps running.
    pub fn threshold(&self) -> f32 {
        self.hit_tolerance * self.leniency
    }
}

impl Default for LockOnConfig {
    fn default() -> Self {
        Self {
            hit_tolerance: HIT_TOLERANCE_DEG,
            leniency: LOCK_LENIENCY,
            duration_sec: LOCK_DURATION_SEC,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GuidanceConfig {
    pub px_per_degree: f32,
    pub arrow_min_distance: f32,
    pub arrow_fade_start: f32,
    pub arrow_fade_span: f32,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            px_per_degree: SCREEN_PX_PER_DEG,
            arrow_min_distance: ARROW_MIN_DISTANCE_DEG,
            arrow_fade_start: ARROW_FADE_START_DEG,
            arrow_fade_span: ARROW_FADE_SPAN_DEG,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub intro_line_sec: f64,
    pub intro_tail_sec: f64,
    pub intro_lines: usize,
    pub warp_delay_sec: f64,
    pub launch_to_search_sec: f64,
    pub prologue_fade_sec: f64,
    pub idle_fade_sec: f64,
    pub search_fade_sec: f64,
    pub lock_alarm_repeat_sec: f64,
    pub shooting_star_min_sec: f64,
    pub shooting_star_max_sec: f64,
    pub shooting_star_lifetime_sec: f64,
    pub sensor_notice_sec: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            intro_line_sec: INTRO_LINE_SEC,
            intro_tail_sec: INTRO_TAIL_SEC,
            intro_lines: INTRO_LINE_COUNT,
            warp_delay_sec: WARP_DELAY_SEC,
            launch_to_search_sec: LAUNCH_TO_SEARCH_SEC,
            prologue_fade_sec: PROLOGUE_FADE_SEC,
            idle_fade_sec: IDLE_FADE_SEC,
            search_fade_sec: SEARCH_FADE_SEC,
            lock_alarm_repeat_sec: LOCK_ALARM_REPEAT_SEC,
            shooting_star_min_sec: SHOOTING_STAR_MIN_SEC,
            shooting_star_max_sec: SHOOTING_STAR_MAX_SEC,
            shooting_star_lifetime_sec: SHOOTING_STAR_LIFETIME_SEC,
            sensor_notice_sec: SENSOR_NOTICE_SEC,
        }
    }
}

/// Everything the sequencer needs to run one session.
#[derive(Clone, Debug, PartialEq)]
pub struct ExperienceConfig {
    pub spawn: SpawnConfig,
    pub lock_on: LockOnConfig,
    pub guidance: GuidanceConfig,
    pub timing: TimingConfig,
    /// Extra targets placed alongside the moon.
    pub decoys: Vec<TargetKind>,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            spawn: SpawnConfig::default(),
            lock_on: LockOnConfig::default(),
            guidance: GuidanceConfig::default(),
            timing: TimingConfig::default(),
            decoys: vec![
                TargetKind::Decoy(PlanetInfo::MARS),
                TargetKind::Decoy(PlanetInfo::MERCURY),
                TargetKind::Decoy(PlanetInfo::SATURN),
            ],
        }
    }
}

impl ExperienceConfig {
    /// Moon only, no decoys.
    pub fn moon_only() -> Self {
        Self {
            decoys: Vec::new(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("hit_tolerance", self.lock_on.hit_tolerance as f64)?;
        positive("lock duration", self.lock_on.duration_sec)?;
        if self.lock_on.leniency < 1.0 {
            return Err(ConfigError::Leniency(self.lock_on.leniency));
        }
        positive("px_per_degree", self.guidance.px_per_degree as f64)?;
        positive("lock alarm repeat", self.timing.lock_alarm_repeat_sec)?;
        ordered(
            "yaw offset",
            self.spawn.yaw_offset_min as f64,
            self.spawn.yaw_offset_max as f64,
        )?;
        ordered(
            "sky pitch",
            self.spawn.pitch_min as f64,
            self.spawn.pitch_max as f64,
        )?;
        ordered(
            "shooting star interval",
            self.timing.shooting_star_min_sec,
            self.timing.shooting_star_max_sec,
        )?;
        if self.spawn.max_attempts == 0 {
            return Err(ConfigError::NotPositive {
                name: "max_attempts",
                value: 0.0,
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn ordered(name: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::EmptyRange { name, min, max })
    }
}
