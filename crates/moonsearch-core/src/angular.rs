// Screen space: x right, y down, arrow angles clockwise from up.

use glam::Vec2;

/// Signed shortest rotation from `current` to `target`, in (-180, 180].
#[inline]
pub fn angular_distance(target: f32, current: f32) -> f32 {
    let mut diff = target - current;
    while diff <= -180.0 {
        diff += 360.0;
    }
    while diff > 180.0 {
        diff -= 360.0;
    }
    diff
}

/// Wrap any heading into [0, 360).
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Yaw/pitch delta from `current` towards `target`, yaw taken the short way.
#[inline]
pub fn sky_delta(target_yaw: f32, target_pitch: f32, current_yaw: f32, current_pitch: f32) -> Vec2 {
    Vec2::new(
        angular_distance(target_yaw, current_yaw),
        target_pitch - current_pitch,
    )
}

/// Compass-style rotation for a guidance arrow, in [0, 360), 0° = up.
pub fn vector_to_arrow_angle(d_yaw: f32, d_pitch: f32) -> f32 {
    let v = Vec2::new(-d_yaw, -d_pitch);
    if v.length_squared() == 0.0 {
        return 0.0;
    }
    wrap_degrees(v.y.atan2(v.x).to_degrees() + 90.0)
}

/// Linear (not perspective-correct) placement of a target relative to the
/// screen centre.
#[inline]
pub fn angular_to_screen_offset(d_yaw: f32, d_pitch: f32, px_per_degree: f32) -> Vec2 {
    Vec2::new(-d_yaw, -d_pitch) * px_per_degree
}
