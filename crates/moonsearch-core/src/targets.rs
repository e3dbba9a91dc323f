//! Celestial targets: placement, selection and visited bookkeeping.

use glam::Vec2;
use rand::Rng;

use crate::angular::{sky_delta, wrap_degrees};
use crate::assets::ImageKey;
use crate::config::SpawnConfig;
use crate::orientation::Orientation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

/// Reference card shown when a decoy planet is found.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetInfo {
    pub name: &'static str,
    pub classification: &'static str,
    pub gravity: &'static str,
    pub temperature: &'static str,
    pub atmosphere: &'static str,
    pub description: &'static str,
    pub image: ImageKey,
}

impl PlanetInfo {
    pub const MARS: PlanetInfo = PlanetInfo {
        name: "MARS",
        classification: "TERRESTRIAL PLANET",
        gravity: "3.72 m/s² (0.379g)",
        temperature: "-140°C ~ 30°C",
        atmosphere: "CO2 (95%), N2 (3%), Ar (1.6%)",
        description: "The Red Planet. Dusty, cold, desert world with polar ice caps.",
        image: ImageKey::Mars,
    };

    pub const MERCURY: PlanetInfo = PlanetInfo {
        name: "MERCURY",
        classification: "TERRESTRIAL PLANET",
        gravity: "3.70 m/s² (0.38g)",
        temperature: "-173°C ~ 427°C",
        atmosphere: "EXOSPHERE (O2, Na, H2, He)",
        description: "Smallest planet. Tidally locked. Extreme temperature fluctuations.",
        image: ImageKey::Mercury,
    };

    pub const SATURN: PlanetInfo = PlanetInfo {
        name: "SATURN",
        classification: "GAS GIANT",
        gravity: "10.44 m/s² (1.065g)",
        temperature: "-178°C (1 bar)",
        atmosphere: "H2 (96%), He (3%), CH4 (0.4%)",
        description: "Massive ball of gas with a complex ring system and many moons.",
        image: ImageKey::Saturn,
    };
}

/// Reference card for a lifeform sighting.
#[derive(Clone, Debug, PartialEq)]
pub struct BioInfo {
    pub name: &'static str,
    pub classification: &'static str,
    pub habitat: &'static str,
    pub description: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TargetKind {
    /// The moon. Finding it ends the search.
    Win,
    Decoy(PlanetInfo),
    Lifeform(BioInfo),
}

impl TargetKind {
    pub fn is_win(&self) -> bool {
        matches!(self, TargetKind::Win)
    }

    pub fn image(&self) -> ImageKey {
        match self {
            TargetKind::Win => ImageKey::Moon,
            TargetKind::Decoy(info) => info.image,
            TargetKind::Lifeform(_) => ImageKey::Lifeform,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SkyPosition {
    pub yaw: f32,
    pub pitch: f32,
}

impl SkyPosition {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Offset from `from` towards this position, yaw taken the short way.
    pub fn delta_from(&self, from: &Orientation) -> Vec2 {
        sky_delta(self.yaw, self.pitch, from.yaw, from.pitch)
    }

    /// Combined yaw/pitch separation in degrees.
    pub fn separation(&self, other: &SkyPosition) -> f32 {
        sky_delta(self.yaw, self.pitch, other.yaw, other.pitch).length()
    }
}

#[derive(Clone, Debug)]
pub struct Target {
    pub id: TargetId,
    pub kind: TargetKind,
    pub position: SkyPosition,
    visited: bool,
    /// Placed after the retry budget ran out, closer than the minimum
    /// separation.
    relaxed: bool,
}

impl Target {
    pub fn visited(&self) -> bool {
        self.visited
    }

    pub fn relaxed(&self) -> bool {
        self.relaxed
    }

    pub fn distance_from(&self, orientation: &Orientation) -> f32 {
        self.position.delta_from(orientation).length()
    }
}

#[derive(Clone, Debug)]
pub struct TargetField {
    targets: Vec<Target>,
}

impl TargetField {
    /// Place the win target followed by `extras` around the calibrated
    /// origin. Placement is rejection-sampled against every target already
    /// placed; when the attempt budget runs out the candidate with the
    /// largest clearance is kept.
    ///
    /// Any `Win` entries in `extras` are ignored; the field always has
    /// exactly one.
    pub fn spawn<R: Rng + ?Sized>(
        origin: Orientation,
        extras: &[TargetKind],
        config: &SpawnConfig,
        rng: &mut R,
    ) -> Self {
        let kinds = std::iter::once(TargetKind::Win)
            .chain(extras.iter().filter(|k| !k.is_win()).cloned());
        let mut targets: Vec<Target> = Vec::with_capacity(extras.len() + 1);

        for (i, kind) in kinds.enumerate() {
            let mut best: Option<(SkyPosition, f32)> = None;
            let mut accepted = None;
            for _ in 0..config.max_attempts.max(1) {
                let candidate = sample_position(&origin, config, rng);
                let clearance = targets
                    .iter()
                    .map(|t| t.position.separation(&candidate))
                    .fold(f32::INFINITY, f32::min);
                if clearance >= config.min_separation {
                    accepted = Some(candidate);
                    break;
                }
                if best.map_or(true, |(_, c)| clearance > c) {
                    best = Some((candidate, clearance));
                }
            }

            let (position, relaxed) = match (accepted, best) {
                (Some(p), _) => (p, false),
                (None, Some((p, clearance))) => {
                    log::warn!(
                        "[targets] separation relaxed for target {} (clearance {:.1}°)",
                        i,
                        clearance
                    );
                    (p, true)
                }
                (None, None) => (sample_position(&origin, config, rng), true),
            };
            log::info!(
                "[targets] {} {:?} at yaw={:.1} pitch={:.1}",
                i,
                kind.image(),
                position.yaw,
                position.pitch
            );
            targets.push(Target {
                id: TargetId(i as u32),
                kind,
                position,
                visited: false,
                relaxed,
            });
        }

        Self { targets }
    }

    /// Build a field from explicit placements, ids assigned in order.
    pub fn from_positions(entries: Vec<(TargetKind, SkyPosition)>) -> Self {
        let targets = entries
            .into_iter()
            .enumerate()
            .map(|(i, (kind, position))| Target {
                id: TargetId(i as u32),
                kind,
                position,
                visited: false,
                relaxed: false,
            })
            .collect();
        Self { targets }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn win(&self) -> Option<&Target> {
        self.targets.iter().find(|t| t.kind.is_win())
    }

    pub fn separation_relaxed(&self) -> bool {
        self.targets.iter().any(|t| t.relaxed)
    }

    pub fn unvisited(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| !t.visited)
    }

    /// Nearest unvisited target. Equal distances resolve to the earlier
    /// target in spawn order (the win target first).
    pub fn active_target(&self, current: &Orientation) -> Option<&Target> {
        let mut best: Option<(&Target, f32)> = None;
        for t in self.unvisited() {
            let d = t.distance_from(current);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((t, d));
            }
        }
        best.map(|(t, _)| t)
    }

    /// Returns true the first time a target is marked.
    pub fn mark_visited(&mut self, id: TargetId) -> bool {
        match self.targets.iter_mut().find(|t| t.id == id) {
            Some(t) if !t.visited => {
                t.visited = true;
                true
            }
            _ => false,
        }
    }
}

fn sample_position<R: Rng + ?Sized>(
    origin: &Orientation,
    config: &SpawnConfig,
    rng: &mut R,
) -> SkyPosition {
    let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let magnitude = if config.yaw_offset_max > config.yaw_offset_min {
        rng.gen_range(config.yaw_offset_min..config.yaw_offset_max)
    } else {
        config.yaw_offset_min
    };
    let jitter = if config.pitch_jitter > 0.0 {
        rng.gen_range(-config.pitch_jitter..config.pitch_jitter)
    } else {
        0.0
    };
    SkyPosition {
        yaw: wrap_degrees(origin.yaw + direction * magnitude),
        pitch: (origin.pitch + jitter).clamp(config.pitch_min, config.pitch_max),
    }
}
