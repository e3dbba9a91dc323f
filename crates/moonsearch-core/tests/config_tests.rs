mod common;

use moonsearch_core::{ConfigError, ExperienceConfig, PhaseSequencer};

#[test]
fn defaults_are_valid() {
    let config = ExperienceConfig::default();
    assert_eq!(config.validate(), Ok(()));
    assert_eq!(config.decoys.len(), 3);
    assert_eq!(config.lock_on.threshold(), 12.0);
    assert_eq!(config.timing.intro_lines, 15);
    assert!(ExperienceConfig::moon_only().decoys.is_empty());
}

#[test]
fn leniency_below_one_is_rejected() {
    let mut config = ExperienceConfig::default();
    config.lock_on.leniency = 0.9;
    assert_eq!(config.validate(), Err(ConfigError::Leniency(0.9)));
}

#[test]
fn non_positive_durations_are_rejected() {
    let mut config = ExperienceConfig::default();
    config.lock_on.duration_sec = 0.0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotPositive { .. })
    ));

    let mut config = ExperienceConfig::default();
    config.spawn.max_attempts = 0;
    assert!(config.validate().is_err());
}

#[test]
fn reversed_ranges_are_rejected() {
    let mut config = ExperienceConfig::default();
    config.spawn.yaw_offset_min = 200.0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::EmptyRange {
            name: "yaw offset",
            ..
        })
    ));
}

#[test]
fn sequencer_refuses_an_invalid_config() {
    let mut config = ExperienceConfig::default();
    config.timing.lock_alarm_repeat_sec = -1.0;
    let result = PhaseSequencer::new(config, common::loaded_engine(), 1);
    assert!(result.is_err());
}
