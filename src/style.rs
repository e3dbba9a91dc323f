// Inline-style and label formatting for the HUD.
// Pure string helpers so host-side tests can `include!` this file.

/// Place an element centred on the crosshair, shifted by a CSS pixel offset.
pub fn centered_translate(x: f32, y: f32) -> String {
    format!(
        "translate(calc(-50% + {:.1}px), calc(-50% + {:.1}px))",
        x, y
    )
}

pub fn rotate_deg(angle: f32) -> String {
    format!("rotate({:.1}deg)", angle)
}

pub fn opacity(value: f32) -> String {
    format!("{:.2}", value.clamp(0.0, 1.0))
}

pub fn width_percent(fraction: f32) -> String {
    format!("{:.0}%", (fraction * 100.0).clamp(0.0, 100.0))
}

pub fn percent_pos(value: f32) -> String {
    format!("{:.1}%", value)
}

pub fn signal_label(percent: f32) -> String {
    format!("SIGNAL {:.0}%", percent.clamp(0.0, 100.0))
}

/// Distance readout shown under the target ring.
pub fn distance_label(distance: f32, locking: bool) -> String {
    if locking {
        format!("LOCKING... {:.1}°", distance)
    } else {
        format!("DIST {:.1}°", distance)
    }
}

pub fn shooting_star_style(top: f32, left: f32, scale: f32) -> String {
    format!(
        "top:{};left:{};transform:rotate(-35deg) scale({:.2})",
        percent_pos(top),
        percent_pos(left),
        scale
    )
}
