use glam::Vec2;
use moonsearch_core::{
    compute_guidance, is_audio_url, GuidanceConfig, Orientation, SkyPosition, SoundKey,
    TargetField, TargetKind,
};

fn guidance_at(target: SkyPosition, yaw: f32, pitch: f32) -> moonsearch_core::Guidance {
    let field = TargetField::from_positions(vec![(TargetKind::Win, target)]);
    let current = Orientation {
        yaw,
        pitch,
        roll: 0.0,
    };
    compute_guidance(&current, &field.targets()[0], &GuidanceConfig::default())
}

#[test]
fn close_targets_hide_the_arrow() {
    let g = guidance_at(SkyPosition::new(50.0, 60.0), 55.0, 58.0);
    assert!((g.distance - 29f32.sqrt()).abs() < 1e-4);
    assert!(!g.arrow_visible);
    assert_eq!(g.arrow_opacity, 0.0);
    assert!((g.signal_percent - (100.0 - 29f32.sqrt())).abs() < 1e-4);
    // target sits right of and above the view centre
    assert!(g.screen_offset.x > 0.0 && g.screen_offset.y < 0.0);
}

#[test]
fn arrow_fades_in_with_distance() {
    let g = guidance_at(SkyPosition::new(30.0, 60.0), 0.0, 60.0);
    assert!(g.arrow_visible);
    assert!((g.arrow_opacity - 0.5).abs() < 1e-5);
    assert!((g.arrow_angle - 270.0).abs() < 1e-4);

    let far = guidance_at(SkyPosition::new(0.0, 60.0), 180.0, 60.0);
    assert_eq!(far.arrow_opacity, 1.0);
    assert_eq!(far.signal_percent, 0.0);
}

#[test]
fn on_screen_check_uses_the_viewport() {
    let g = guidance_at(SkyPosition::new(10.0, 60.0), 0.0, 60.0);
    assert_eq!(g.screen_offset, Vec2::new(-150.0, 0.0));
    assert!(g.is_on_screen(Vec2::new(390.0, 844.0)));
    assert!(!g.is_on_screen(Vec2::new(100.0, 844.0)));
}

#[test]
fn manifest_sounds_are_audio() {
    for key in SoundKey::ALL {
        assert!(is_audio_url(key.url()), "{:?}", key);
    }
    assert!(!is_audio_url("/moon.png"));
}
