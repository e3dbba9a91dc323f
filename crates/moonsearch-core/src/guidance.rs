//! Per-sample guidance towards the active target.

use glam::Vec2;

use crate::angular::{angular_to_screen_offset, vector_to_arrow_angle};
use crate::config::GuidanceConfig;
use crate::constants::SIGNAL_FULL_SCALE_DEG;
use crate::orientation::Orientation;
use crate::targets::Target;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Guidance {
    /// Combined yaw/pitch distance in degrees.
    pub distance: f32,
    /// Raw (target - current) deltas, yaw taken the short way.
    pub delta: Vec2,
    /// Clockwise arrow rotation, 0° = up.
    pub arrow_angle: f32,
    /// Target placement relative to screen centre, CSS pixels.
    pub screen_offset: Vec2,
    pub arrow_visible: bool,
    pub arrow_opacity: f32,
    /// 0..=100
    pub signal_percent: f32,
}

impl Guidance {
    /// Whether the target lands inside a viewport of the given size centred
    /// on the crosshair (offsets up to one full width/height still count).
    pub fn is_on_screen(&self, viewport: Vec2) -> bool {
        self.screen_offset.x.abs() <= viewport.x && self.screen_offset.y.abs() <= viewport.y
    }
}

pub fn compute_guidance(
    orientation: &Orientation,
    target: &Target,
    config: &GuidanceConfig,
) -> Guidance {
    let delta = target.position.delta_from(orientation);
    let distance = delta.length();
    let arrow_opacity = if config.arrow_fade_span > 0.0 {
        ((distance - config.arrow_fade_start) / config.arrow_fade_span).clamp(0.0, 1.0)
    } else {
        1.0
    };
    Guidance {
        distance,
        delta,
        arrow_angle: vector_to_arrow_angle(delta.x, delta.y),
        screen_offset: angular_to_screen_offset(delta.x, delta.y, config.px_per_degree),
        arrow_visible: distance > config.arrow_min_distance,
        arrow_opacity,
        signal_percent: SIGNAL_FULL_SCALE_DEG - distance.min(SIGNAL_FULL_SCALE_DEG),
    }
}
