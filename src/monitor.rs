//! Head displacement monitor.
//!
//! Tracks how far the head has dropped below the height recorded when
//! tracking started. Leaning forward over the walker lowers the head; once
//! the signed displacement falls below the (negative) threshold a warning is
//! raised, and it clears as soon as the displacement is back at or above
//! the threshold. Sampling happens on every Nth frame only.
//!
//! The monitor is pure: it returns what changed and the caller applies it
//! to the scene.

use crate::config::MonitorConfig;
use crate::host::Pose;
use nalgebra::Vector3;

/// Warning state change produced by a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    Raised,
    Cleared,
}

/// Outcome of one sampled frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Camera height minus baseline height
    pub displacement: f32,
    pub alert: Option<Alert>,
    /// Smoothed warning pose while the warning is active
    pub warning: Option<Pose>,
}

#[derive(Debug, Clone)]
struct Tracking {
    baseline: Vector3<f32>,
    frame: u64,
    displacement: Option<f32>,
    warning: Option<Pose>,
}

/// Lean-forward detector sampling the camera height every `stride` frames.
#[derive(Debug, Clone)]
pub struct HeadMonitor {
    config: MonitorConfig,
    tracking: Option<Tracking>,
}

impl HeadMonitor {
    /// Idle monitor; nothing is sampled until [`start`](Self::start).
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            tracking: None,
        }
    }

    /// Begin tracking from `baseline`. Restarting resets the frame count and
    /// clears any active warning.
    pub fn start(&mut self, baseline: Vector3<f32>) {
        tracing::info!(baseline_y = baseline.y, "head tracking started");
        self.tracking = Some(Tracking {
            baseline,
            frame: 0,
            displacement: None,
            warning: None,
        });
    }

    /// Stop sampling. Returns true if a warning was showing.
    pub fn stop(&mut self) -> bool {
        self.tracking
            .take()
            .is_some_and(|t| t.warning.is_some())
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    /// Camera position recorded by the last `start`.
    pub fn baseline(&self) -> Option<Vector3<f32>> {
        self.tracking.as_ref().map(|t| t.baseline)
    }

    /// Whether the lean warning is currently raised.
    pub fn is_warning_active(&self) -> bool {
        self.tracking.as_ref().is_some_and(|t| t.warning.is_some())
    }

    /// Last sampled displacement, if any sample was taken.
    pub fn displacement(&self) -> Option<f32> {
        self.tracking.as_ref().and_then(|t| t.displacement)
    }

    /// Feed one frame. Returns a sample on every `stride`-th frame while
    /// tracking, `None` otherwise.
    pub fn on_frame(&mut self, camera: &Pose) -> Option<Sample> {
        let config = &self.config;
        let tracking = self.tracking.as_mut()?;
        tracking.frame += 1;
        if tracking.frame % u64::from(config.stride.max(1)) != 0 {
            return None;
        }

        let displacement = camera.position.y - tracking.baseline.y;
        tracking.displacement = Some(displacement);
        let target = Pose::new(
            camera.ahead(config.warning_distance, 0.0),
            camera.rotation,
        );

        let alert = match tracking.warning {
            None if displacement < config.threshold => {
                tracking.warning = Some(target);
                Some(Alert::Raised)
            }
            Some(_) if displacement >= config.threshold => {
                tracking.warning = None;
                Some(Alert::Cleared)
            }
            Some(current) => {
                tracking.warning = Some(current.blend(&target, config.blend));
                None
            }
            None => None,
        };

        tracing::debug!(displacement, ?alert, "head sample");
        Some(Sample {
            displacement,
            alert,
            warning: tracking.warning,
        })
    }
}
