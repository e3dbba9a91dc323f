//! Device-orientation calibration.

use crate::angular::wrap_degrees;
use crate::constants::{DEFAULT_PITCH_DEG, DEFAULT_ROLL_DEG};

/// One reading as delivered by the platform. Any axis may be missing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawOrientation {
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
}

impl RawOrientation {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
            gamma: Some(gamma),
        }
    }

    fn usable_yaw(&self) -> Option<f32> {
        self.alpha.filter(|a| a.is_finite()).map(|a| a as f32)
    }
}

/// Calibrated orientation: yaw in [0, 360), pitch and roll as reported.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Outcome of the platform's orientation permission prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The platform delivers orientation without asking.
    NotRequired,
}

impl Permission {
    pub fn allows_tracking(self) -> bool {
        !matches!(self, Permission::Denied)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SensorStatus {
    AwaitingSensor,
    Calibrated,
    Denied,
}

/// What a single ingested sample produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrientationUpdate {
    /// First usable sample; `origin` is the calibrated orientation at that
    /// instant (yaw is always 0).
    Calibrated { offset: f32, origin: Orientation },
    Sample(Orientation),
}

impl OrientationUpdate {
    pub fn orientation(&self) -> Orientation {
        match *self {
            OrientationUpdate::Calibrated { origin, .. } => origin,
            OrientationUpdate::Sample(o) => o,
        }
    }
}

#[derive(Debug)]
pub struct OrientationTracker {
    offset: Option<f32>,
    latest: Option<Orientation>,
    denied: bool,
}

impl Default for OrientationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl OrientationTracker {
    pub fn new() -> Self {
        Self {
            offset: None,
            latest: None,
            denied: false,
        }
    }

    pub fn status(&self) -> SensorStatus {
        if self.offset.is_some() {
            SensorStatus::Calibrated
        } else if self.denied {
            SensorStatus::Denied
        } else {
            SensorStatus::AwaitingSensor
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.offset.is_some()
    }

    pub fn offset(&self) -> Option<f32> {
        self.offset
    }

    /// Latest calibrated orientation; `None` until calibration.
    pub fn latest(&self) -> Option<Orientation> {
        self.latest
    }

    /// Record the permission outcome. A denial only sticks while the tracker
    /// is still uncalibrated.
    pub fn set_permission(&mut self, permission: Permission) {
        self.denied = !permission.allows_tracking() && self.offset.is_none();
    }

    /// Feed one platform sample. Samples without a usable heading are
    /// ignored before calibration and keep the previous heading after it.
    pub fn ingest(&mut self, raw: RawOrientation) -> Option<OrientationUpdate> {
        let pitch = raw
            .beta
            .filter(|b| b.is_finite())
            .map(|b| b as f32)
            .unwrap_or(DEFAULT_PITCH_DEG);
        let roll = raw
            .gamma
            .filter(|g| g.is_finite())
            .map(|g| g as f32)
            .unwrap_or(DEFAULT_ROLL_DEG);

        match (self.offset, raw.usable_yaw()) {
            (None, None) => None,
            (None, Some(yaw)) => {
                self.offset = Some(yaw);
                self.denied = false;
                let origin = Orientation {
                    yaw: 0.0,
                    pitch,
                    roll,
                };
                self.latest = Some(origin);
                log::info!("[orientation] calibrated offset={:.1}", yaw);
                Some(OrientationUpdate::Calibrated {
                    offset: yaw,
                    origin,
                })
            }
            (Some(offset), yaw) => {
                let yaw = match yaw {
                    Some(y) => wrap_degrees(y - offset + 360.0),
                    None => self.latest.map(|o| o.yaw).unwrap_or(0.0),
                };
                let o = Orientation { yaw, pitch, roll };
                self.latest = Some(o);
                Some(OrientationUpdate::Sample(o))
            }
        }
    }
}
